// ==========================================
// Foundry QC Tracker - chemical analysis domain model
// ==========================================
// One row per melt ladle, keyed by ladle_id
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Element field name -> element code, in display order
pub const ELEMENT_FIELDS: [(&str, &str); 10] = [
    ("carbon", "C"),
    ("silicon", "Si"),
    ("magnesium", "Mg"),
    ("copper", "Cu"),
    ("chromium", "Cr"),
    ("sulfur", "S"),
    ("manganese", "Mn"),
    ("phosphorus", "P"),
    ("lead", "Pb"),
    ("aluminum", "Al"),
];

/// Equivalent field name -> element code
pub const EQUIVALENT_FIELDS: [(&str, &str); 3] = [
    ("carbon_equivalent", "CE"),
    ("manganese_equivalent", "MnE"),
    ("magnesium_equivalent", "MgE"),
];

// ==========================================
// ElementReadings - raw element readings (%)
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementReadings {
    pub carbon: Option<f64>,
    pub silicon: Option<f64>,
    pub magnesium: Option<f64>,
    pub copper: Option<f64>,
    pub chromium: Option<f64>,
    pub sulfur: Option<f64>,
    pub manganese: Option<f64>,
    pub phosphorus: Option<f64>,
    pub lead: Option<f64>,
    pub aluminum: Option<f64>,
}

impl ElementReadings {
    /// Reading by element code (C, Si, ...)
    pub fn get(&self, code: &str) -> Option<f64> {
        match code {
            "C" => self.carbon,
            "Si" => self.silicon,
            "Mg" => self.magnesium,
            "Cu" => self.copper,
            "Cr" => self.chromium,
            "S" => self.sulfur,
            "Mn" => self.manganese,
            "P" => self.phosphorus,
            "Pb" => self.lead,
            "Al" => self.aluminum,
            _ => None,
        }
    }

    /// Set a reading by element code or field name; false for unknown keys
    pub fn set(&mut self, key: &str, value: Option<f64>) -> bool {
        let code = ELEMENT_FIELDS
            .iter()
            .find(|(field, code)| *field == key || *code == key)
            .map(|(_, code)| *code);

        let slot = match code {
            Some("C") => &mut self.carbon,
            Some("Si") => &mut self.silicon,
            Some("Mg") => &mut self.magnesium,
            Some("Cu") => &mut self.copper,
            Some("Cr") => &mut self.chromium,
            Some("S") => &mut self.sulfur,
            Some("Mn") => &mut self.manganese,
            Some("P") => &mut self.phosphorus,
            Some("Pb") => &mut self.lead,
            Some("Al") => &mut self.aluminum,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// (code, reading) pairs in display order
    pub fn by_code(&self) -> Vec<(&'static str, Option<f64>)> {
        ELEMENT_FIELDS
            .iter()
            .map(|(_, code)| (*code, self.get(code)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code().iter().all(|(_, v)| v.is_none())
    }
}

// ==========================================
// Equivalents - derived CE / MnE / MgE
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Equivalents {
    pub carbon_equivalent: Option<f64>,
    pub manganese_equivalent: Option<f64>,
    pub magnesium_equivalent: Option<f64>,
}

impl Equivalents {
    pub fn by_code(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("CE", self.carbon_equivalent),
            ("MnE", self.manganese_equivalent),
            ("MgE", self.magnesium_equivalent),
        ]
    }
}

// ==========================================
// ChemicalAnalysis - persisted analysis row
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalAnalysis {
    pub id: i64,

    // ===== identification =====
    pub test_date: NaiveDate,
    pub furnace_id: Option<i64>,
    pub ladle_no: i32,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub ladle_id: String,

    // ===== readings =====
    #[serde(flatten)]
    pub readings: ElementReadings,
    #[serde(flatten)]
    pub equivalents: Equivalents,

    // ===== quality control =====
    pub engineer_notes: Option<String>,
    pub decision: Option<String>,
    pub reason: Option<String>,
    pub has_defect: bool,
    pub defect_reason: Option<String>,
    pub notes: Option<String>,

    // ===== metadata =====
    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
}

impl ChemicalAnalysis {
    /// Readings plus equivalents, keyed by element code
    pub fn values_by_code(&self) -> Vec<(&'static str, Option<f64>)> {
        let mut values = self.readings.by_code();
        values.extend(self.equivalents.by_code());
        values
    }
}

// ==========================================
// ChemicalAnalysisDraft - form input for create / edit
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemicalAnalysisDraft {
    pub test_date: Option<NaiveDate>, // required on create, ignored on edit
    pub furnace_id: Option<i64>,
    pub ladle_no: Option<i32>,        // next free number when absent, ignored on edit
    pub readings: ElementReadings,
    pub engineer_notes: Option<String>,
    pub decision: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

// ==========================================
// ChemicalFilter - list filter
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemicalFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub furnace_id: Option<i64>,
    pub decision: Option<String>,
    pub has_defect: Option<bool>,
}
