// ==========================================
// Foundry QC Tracker - reference data
// ==========================================
// Lookup tables: furnaces, machines, defect/decision vocabularies,
// element specifications, mechanical decision rules, shifts, engineers.
// Loaded once at startup, shared read-only.
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Furnace {
    pub id: i64,
    pub furnace_code: String,
    pub furnace_name: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    pub machine_code: String,
    pub machine_name: Option<String>,
    pub stage: Option<String>, // Melting, CCM, Annealing, ...
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectType {
    pub id: i64,
    pub defect_code: Option<String>,
    pub defect_name_ar: String,
    pub defect_name_en: Option<String>,
    pub applies_to_stages: Vec<String>, // ["all"] or stage names
    pub is_active: bool,
}

impl DefectType {
    /// Display name, English first
    pub fn display_name(&self) -> &str {
        self.defect_name_en.as_deref().unwrap_or(&self.defect_name_ar)
    }

    pub fn applies_to(&self, stage_name: &str) -> bool {
        self.applies_to_stages
            .iter()
            .any(|s| s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case(stage_name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionType {
    pub id: i64,
    pub decision_code: String,
    pub decision_name_ar: Option<String>,
    pub decision_name_en: Option<String>,
    pub color_code: Option<String>,
}

/// Specification range of one chemical element (or equivalent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpecification {
    pub id: i64,
    pub element_code: String, // C, Si, Mg, ..., CE, MnE, MgE
    pub element_name: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub unit: String,
}

/// One decision band of a mechanical property.
/// min is inclusive, max exclusive; None leaves that side open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicalRule {
    pub id: i64,
    pub property_code: String, // tensile_strength, elongation, ...
    pub property_name: Option<String>,
    pub property_name_ar: Option<String>,
    pub unit: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub decision_code: String,
}

impl MechanicalRule {
    pub fn contains(&self, value: f64) -> bool {
        self.min_value.map_or(true, |min| value >= min)
            && self.max_value.map_or(true, |max| value < max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: i64,
    pub shift_number: i32,
    pub shift_name: Option<String>,
    pub start_time: Option<String>, // HH:MM
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engineer {
    pub id: i64,
    pub name: String,
    pub name_ar: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
}

// ==========================================
// ReferenceData - immutable snapshot of all lookup tables
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    pub furnaces: Vec<Furnace>,
    pub machines: Vec<Machine>,
    pub defect_types: Vec<DefectType>,
    pub decision_types: Vec<DecisionType>,
    pub element_specifications: Vec<ElementSpecification>,
    pub mechanical_rules: Vec<MechanicalRule>,
    pub shifts: Vec<Shift>,
    pub engineers: Vec<Engineer>,
}

impl ReferenceData {
    pub fn furnace(&self, id: i64) -> Option<&Furnace> {
        self.furnaces.iter().find(|f| f.id == id)
    }

    pub fn machine(&self, id: i64) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == id)
    }

    pub fn defect_type(&self, id: i64) -> Option<&DefectType> {
        self.defect_types.iter().find(|d| d.id == id)
    }

    pub fn shift_by_number(&self, shift_number: i32) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.shift_number == shift_number)
    }

    pub fn specification(&self, element_code: &str) -> Option<&ElementSpecification> {
        self.element_specifications
            .iter()
            .find(|s| s.element_code == element_code)
    }

    /// element_code -> specification
    pub fn specification_map(&self) -> HashMap<&str, &ElementSpecification> {
        self.element_specifications
            .iter()
            .map(|s| (s.element_code.as_str(), s))
            .collect()
    }

    /// Bands of one property in evaluation order
    pub fn mechanical_rules_for<'a>(
        &'a self,
        property_code: &'a str,
    ) -> impl Iterator<Item = &'a MechanicalRule> + 'a {
        self.mechanical_rules
            .iter()
            .filter(move |r| r.property_code == property_code)
    }

    pub fn active_furnaces(&self) -> impl Iterator<Item = &Furnace> {
        self.furnaces.iter().filter(|f| f.is_active)
    }

    pub fn active_machines(&self) -> impl Iterator<Item = &Machine> {
        self.machines.iter().filter(|m| m.is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defect(applies: &[&str]) -> DefectType {
        DefectType {
            id: 1,
            defect_code: None,
            defect_name_ar: "رمال".to_string(),
            defect_name_en: Some("Sand".to_string()),
            applies_to_stages: applies.iter().map(|s| s.to_string()).collect(),
            is_active: true,
        }
    }

    #[test]
    fn test_defect_applies_to() {
        assert!(defect(&["all"]).applies_to("Zinc"));
        assert!(defect(&["CCM", "Annealing"]).applies_to("ccm"));
        assert!(!defect(&["CCM"]).applies_to("Finish"));
    }

    #[test]
    fn test_defect_display_name_prefers_english() {
        assert_eq!(defect(&["all"]).display_name(), "Sand");
        let mut d = defect(&["all"]);
        d.defect_name_en = None;
        assert_eq!(d.display_name(), "رمال");
    }

    #[test]
    fn test_specification_lookup() {
        let data = ReferenceData {
            element_specifications: vec![ElementSpecification {
                id: 1,
                element_code: "C".to_string(),
                element_name: Some("Carbon".to_string()),
                min_value: Some(3.0),
                max_value: Some(3.9),
                unit: "%".to_string(),
            }],
            ..Default::default()
        };
        assert_eq!(data.specification("C").unwrap().max_value, Some(3.9));
        assert!(data.specification("Si").is_none());
        assert_eq!(data.specification_map().len(), 1);
    }

    #[test]
    fn test_mechanical_rule_bounds() {
        let rule = MechanicalRule {
            id: 1,
            property_code: "hardness".to_string(),
            property_name: None,
            property_name_ar: None,
            unit: "HB".to_string(),
            min_value: Some(230.0),
            max_value: Some(250.0),
            decision_code: "INSPECT_FIRST_LAST".to_string(),
        };
        assert!(rule.contains(230.0));
        assert!(rule.contains(249.9));
        assert!(!rule.contains(250.0));
        assert!(!rule.contains(229.9));

        let open = MechanicalRule {
            min_value: None,
            max_value: None,
            ..rule
        };
        assert!(open.contains(-1.0));
        assert!(open.contains(1e9));
    }
}
