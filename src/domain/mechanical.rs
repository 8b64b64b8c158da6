// ==========================================
// Foundry QC Tracker - mechanical test domain model
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Sample measurements as entered on the test form
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleMeasurements {
    pub sample_thickness: Option<f64>,
    pub d1: Option<f64>,
    pub d2: Option<f64>,
    pub d3: Option<f64>,
    pub original_length: Option<f64>, // Lo, mm
    pub final_length: Option<f64>,    // Lf, mm
    pub area_d_squared: Option<f64>,  // A, mm2
    pub force_kgf: Option<f64>,       // F
}

/// Values computed from the sample measurements
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedResults {
    pub avg_dimension: Option<f64>,
    pub elongation: Option<f64>,       // %
    pub tensile_strength: Option<f64>, // kgf/mm2
}

/// Microstructure evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Microstructure {
    pub microstructure: Option<String>,
    pub percent_85: Option<f64>,
    pub percent_70: Option<f64>,
    pub percent_40: Option<f64>,
    pub percent_1: Option<f64>,
    pub nodularity_percent: Option<f64>,
    pub nodule_count: Option<i32>,
    pub hardness: Option<f64>,
    pub carbides: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicalTest {
    pub id: i64,
    pub test_date: NaiveDate,
    pub test_number: Option<String>,
    pub diameter: Option<i32>,
    pub code: Option<String>,
    pub pipe_no: Option<String>,
    pub ladle_id: Option<String>,
    #[serde(flatten)]
    pub measurements: SampleMeasurements,
    #[serde(flatten)]
    pub derived: DerivedResults,
    #[serde(flatten)]
    pub structure: Microstructure,
    pub shift: Option<i32>,
    pub tester_name: Option<String>,
    pub decision: Option<String>,
    pub reason: Option<String>,
    pub has_defect: bool,
    pub defect_reason: Option<String>,
    pub comments: Option<String>,
    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
}

/// Form input for create / edit; derived values are never taken from input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanicalTestDraft {
    pub test_date: Option<NaiveDate>,
    pub test_number: Option<String>,
    pub diameter: Option<i32>,
    pub code: Option<String>,
    pub pipe_no: Option<String>,
    pub ladle_id: Option<String>,
    pub measurements: SampleMeasurements,
    pub structure: Microstructure,
    pub shift: Option<i32>,
    pub tester_name: Option<String>,
    pub decision: Option<String>,
    pub reason: Option<String>,
    pub has_defect: bool,
    pub defect_reason: Option<String>,
    pub comments: Option<String>,
}

/// Property values judged by the mechanical decision rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanicalProperties {
    pub tensile_strength: Option<f64>,
    pub elongation: Option<f64>,
    pub nodularity_percent: Option<f64>,
    pub nodule_count: Option<f64>,
    pub hardness: Option<f64>,
    pub carbides: Option<f64>,
}

impl MechanicalProperties {
    /// Derived values plus the numeric microstructure readings.
    /// Carbides text that is not a number is left out.
    pub fn from_results(derived: &DerivedResults, structure: &Microstructure) -> Self {
        Self {
            tensile_strength: derived.tensile_strength,
            elongation: derived.elongation,
            nodularity_percent: structure.nodularity_percent,
            nodule_count: structure.nodule_count.map(f64::from),
            hardness: structure.hardness,
            carbides: structure
                .carbides
                .as_deref()
                .map(|c| c.trim().trim_end_matches('%').trim())
                .and_then(|c| c.parse().ok()),
        }
    }

    /// (property_code, value) in display order
    pub fn by_code(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("tensile_strength", self.tensile_strength),
            ("elongation", self.elongation),
            ("nodularity_percent", self.nodularity_percent),
            ("nodule_count", self.nodule_count),
            ("hardness", self.hardness),
            ("carbides", self.carbides),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MechanicalFilter {
    pub ladle_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub decision: Option<String>,
}
