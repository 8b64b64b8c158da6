// ==========================================
// Foundry QC Tracker - mechanical test derived values
// ==========================================
// avg dimension     = (d1 + d2 + d3) / 3
// elongation %      = (Lf - Lo) / Lo x 100
// tensile strength  = F / A
// ==========================================
// Auto-decision: each property falls into a rule band, the worst
// band across all properties is the recommendation.
// ==========================================

use crate::domain::mechanical::{DerivedResults, MechanicalProperties, SampleMeasurements};
use crate::domain::reference::ReferenceData;
use crate::engine::element_validator::{DECISION_ACCEPT, DECISION_REJECT};
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub const DECISION_INSPECT_FIRST_LAST: &str = "INSPECT_FIRST_LAST";
pub const DECISION_INSPECT_100: &str = "INSPECT_100";

/// Mechanical decisions from best to worst; severity is position + 1
pub const DECISION_SEVERITY: [&str; 4] = [
    DECISION_ACCEPT,
    DECISION_INSPECT_FIRST_LAST,
    DECISION_INSPECT_100,
    DECISION_REJECT,
];

/// 1 (best) ..= 4 (worst), 0 for codes outside the mechanical scale
pub fn decision_priority(decision_code: &str) -> u8 {
    DECISION_SEVERITY
        .iter()
        .position(|d| *d == decision_code)
        .map_or(0, |i| i as u8 + 1)
}

pub fn average_dimension(d1: Option<f64>, d2: Option<f64>, d3: Option<f64>) -> Option<f64> {
    Some((d1? + d2? + d3?) / 3.0)
}

pub fn elongation(original_length: Option<f64>, final_length: Option<f64>) -> Option<f64> {
    let lo = original_length.filter(|lo| *lo > 0.0)?;
    Some((final_length? - lo) / lo * 100.0)
}

pub fn tensile_strength(force: Option<f64>, area: Option<f64>) -> Option<f64> {
    let area = area.filter(|a| *a > 0.0)?;
    Some(force? / area)
}

pub fn derive(m: &SampleMeasurements) -> DerivedResults {
    DerivedResults {
        avg_dimension: average_dimension(m.d1, m.d2, m.d3),
        elongation: elongation(m.original_length, m.final_length),
        tensile_strength: tensile_strength(m.force_kgf, m.area_d_squared),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecision {
    pub property_code: String,
    pub value: f64,
    pub decision: String,
    pub priority: u8,
    pub in_spec: bool,
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MechanicalDecision {
    /// None when no property could be judged
    pub recommended_decision: Option<String>,
    pub decision_priority: u8,
    pub property_decisions: Vec<PropertyDecision>,
    /// Properties sharing the worst priority
    pub worst_properties: Vec<String>,
}

/// Judge one value against the bands of its property
///
/// # Returns
/// - None when the property has no rules
/// - the first band containing the value, REJECT when no band does
pub fn property_decision(
    property_code: &str,
    value: f64,
    reference: &ReferenceData,
) -> Option<PropertyDecision> {
    let mut rules = reference.mechanical_rules_for(property_code).peekable();
    let first = rules.peek().copied()?;
    let decision = rules
        .find(|r| r.contains(value))
        .map_or(DECISION_REJECT, |r| r.decision_code.as_str());

    Some(PropertyDecision {
        property_code: property_code.to_string(),
        value,
        decision: decision.to_string(),
        priority: decision_priority(decision),
        in_spec: decision == DECISION_ACCEPT,
        name: first.property_name.clone(),
        name_ar: first.property_name_ar.clone(),
        unit: first.unit.clone(),
    })
}

/// Worst-case decision across all entered properties
#[instrument(skip_all)]
pub fn calculate_auto_decision(
    properties: &MechanicalProperties,
    reference: &ReferenceData,
) -> MechanicalDecision {
    let mut result = MechanicalDecision::default();

    for (code, value) in properties.by_code() {
        let Some(value) = value.filter(|v| v.is_finite()) else {
            continue;
        };
        let Some(judged) = property_decision(code, value, reference) else {
            continue;
        };

        if judged.priority > result.decision_priority {
            result.decision_priority = judged.priority;
            result.recommended_decision = Some(judged.decision.clone());
            result.worst_properties = vec![code.to_string()];
        } else if judged.priority == result.decision_priority {
            result.worst_properties.push(code.to_string());
        }
        result.property_decisions.push(judged);
    }

    tracing::debug!(
        decision = ?result.recommended_decision,
        judged = result.property_decisions.len(),
        "mechanical auto-decision"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reference::MechanicalRule;

    fn rule(code: &str, min: Option<f64>, max: Option<f64>, decision: &str) -> MechanicalRule {
        MechanicalRule {
            id: 0,
            property_code: code.to_string(),
            property_name: Some(code.to_string()),
            property_name_ar: None,
            unit: String::new(),
            min_value: min,
            max_value: max,
            decision_code: decision.to_string(),
        }
    }

    fn reference() -> ReferenceData {
        ReferenceData {
            mechanical_rules: vec![
                rule("tensile_strength", Some(42.0), None, DECISION_ACCEPT),
                rule("tensile_strength", Some(40.0), Some(42.0), DECISION_INSPECT_FIRST_LAST),
                rule("tensile_strength", Some(38.0), Some(40.0), DECISION_INSPECT_100),
                rule("elongation", Some(10.0), None, DECISION_ACCEPT),
                rule("elongation", Some(8.0), Some(10.0), DECISION_INSPECT_FIRST_LAST),
                rule("hardness", Some(0.0), Some(230.0), DECISION_ACCEPT),
                rule("hardness", Some(230.0), Some(250.0), DECISION_INSPECT_FIRST_LAST),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_average_dimension() {
        assert_eq!(average_dimension(Some(5.0), Some(6.0), Some(7.0)), Some(6.0));
        assert_eq!(average_dimension(Some(5.0), None, Some(7.0)), None);
    }

    #[test]
    fn test_elongation() {
        assert_eq!(elongation(Some(50.0), Some(55.0)), Some(10.0));
        assert_eq!(elongation(Some(0.0), Some(55.0)), None);
        assert_eq!(elongation(Some(50.0), None), None);
    }

    #[test]
    fn test_tensile_strength() {
        assert_eq!(tensile_strength(Some(1000.0), Some(20.0)), Some(50.0));
        assert_eq!(tensile_strength(Some(1000.0), Some(0.0)), None);
        assert_eq!(tensile_strength(None, Some(20.0)), None);
    }

    #[test]
    fn test_derive_all() {
        let m = SampleMeasurements {
            d1: Some(6.0),
            d2: Some(6.0),
            d3: Some(6.0),
            original_length: Some(25.0),
            final_length: Some(28.0),
            area_d_squared: Some(28.0),
            force_kgf: Some(1260.0),
            ..Default::default()
        };
        let d = derive(&m);
        assert_eq!(d.avg_dimension, Some(6.0));
        assert!((d.elongation.unwrap() - 12.0).abs() < 1e-9);
        assert_eq!(d.tensile_strength, Some(45.0));
    }

    #[test]
    fn test_decision_priority_order() {
        assert_eq!(decision_priority(DECISION_ACCEPT), 1);
        assert_eq!(decision_priority(DECISION_INSPECT_100), 3);
        assert_eq!(decision_priority(DECISION_REJECT), 4);
        assert_eq!(decision_priority("HOLD"), 0);
    }

    #[test]
    fn test_property_outside_every_band_is_rejected() {
        let data = reference();
        let low = property_decision("tensile_strength", 30.0, &data).unwrap();
        assert_eq!(low.decision, DECISION_REJECT);
        assert_eq!(low.priority, 4);
        assert!(!low.in_spec);

        let good = property_decision("tensile_strength", 42.0, &data).unwrap();
        assert_eq!(good.decision, DECISION_ACCEPT);
        assert!(good.in_spec);

        assert!(property_decision("carbides", 0.5, &data).is_none());
    }

    #[test]
    fn test_worst_property_wins() {
        let props = MechanicalProperties {
            tensile_strength: Some(45.0),
            elongation: Some(9.0),
            hardness: Some(240.0),
            ..Default::default()
        };
        let result = calculate_auto_decision(&props, &reference());
        assert_eq!(
            result.recommended_decision.as_deref(),
            Some(DECISION_INSPECT_FIRST_LAST)
        );
        assert_eq!(result.decision_priority, 2);
        assert_eq!(result.worst_properties, vec!["elongation", "hardness"]);
        assert_eq!(result.property_decisions.len(), 3);
    }

    #[test]
    fn test_worse_property_resets_worst_list() {
        let props = MechanicalProperties {
            tensile_strength: Some(39.0),
            elongation: Some(9.0),
            hardness: Some(240.0),
            ..Default::default()
        };
        let result = calculate_auto_decision(&props, &reference());
        assert_eq!(result.recommended_decision.as_deref(), Some(DECISION_INSPECT_100));
        assert_eq!(result.worst_properties, vec!["tensile_strength"]);
    }

    #[test]
    fn test_nothing_to_judge() {
        let result = calculate_auto_decision(&MechanicalProperties::default(), &reference());
        assert_eq!(result, MechanicalDecision::default());

        // values without rules or non-finite values are skipped
        let props = MechanicalProperties {
            carbides: Some(0.5),
            elongation: Some(f64::NAN),
            ..Default::default()
        };
        let result = calculate_auto_decision(&props, &reference());
        assert!(result.recommended_decision.is_none());
        assert!(result.worst_properties.is_empty());
    }
}
