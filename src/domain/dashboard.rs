// ==========================================
// Foundry QC Tracker - dashboard read model
// ==========================================
// Window = as_of - window_days .. as_of, both ends inclusive
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::chemical::ChemicalAnalysis;
use crate::domain::pipe::Pipe;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnaceCount {
    pub furnace_code: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionCount {
    pub decision: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub as_of: NaiveDate,
    pub window_days: u32,

    // ===== chemical =====
    pub analyses_today: i64,
    pub analyses_in_window: i64,
    pub defective_analyses_in_window: i64,
    pub acceptance_rate: f64, // % of decided analyses in window with ACCEPT, 0 when none decided

    // ===== pipes / mechanical =====
    pub pipes_today: i64,
    pub pipes_in_window: i64,
    pub mechanical_tests_today: i64,
    pub mechanical_tests_in_window: i64,

    // ===== breakdowns =====
    pub by_furnace: Vec<FurnaceCount>,
    pub by_decision: Vec<DecisionCount>,

    pub recent_analyses: Vec<ChemicalAnalysis>,
    pub recent_pipes: Vec<Pipe>,
}

/// Percentage rounded to one decimal; 0 when nothing was decided
pub fn acceptance_rate(accepted: i64, decided: i64) -> f64 {
    if decided <= 0 {
        return 0.0;
    }
    (accepted as f64 / decided as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance_rate() {
        assert_eq!(acceptance_rate(0, 0), 0.0);
        assert_eq!(acceptance_rate(2, 3), 66.7);
        assert_eq!(acceptance_rate(5, 5), 100.0);
    }
}
