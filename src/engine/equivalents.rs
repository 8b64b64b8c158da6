// ==========================================
// Foundry QC Tracker - derived equivalents
// ==========================================
// CE  = C + Si/3
// MnE = Mn - 1.7 x S
// MgE = Mg - 0.76 x S
// A missing S counts as 0; any other missing input yields None.
// ==========================================

use crate::domain::chemical::{ElementReadings, Equivalents};

pub fn carbon_equivalent(carbon: Option<f64>, silicon: Option<f64>) -> Option<f64> {
    Some(carbon? + silicon? / 3.0)
}

pub fn manganese_equivalent(manganese: Option<f64>, sulfur: Option<f64>) -> Option<f64> {
    Some(manganese? - 1.7 * sulfur.unwrap_or(0.0))
}

pub fn magnesium_equivalent(magnesium: Option<f64>, sulfur: Option<f64>) -> Option<f64> {
    Some(magnesium? - 0.76 * sulfur.unwrap_or(0.0))
}

/// Compute all three equivalents from raw readings
pub fn compute(readings: &ElementReadings) -> Equivalents {
    Equivalents {
        carbon_equivalent: carbon_equivalent(readings.carbon, readings.silicon),
        manganese_equivalent: manganese_equivalent(readings.manganese, readings.sulfur),
        magnesium_equivalent: magnesium_equivalent(readings.magnesium, readings.sulfur),
    }
}
