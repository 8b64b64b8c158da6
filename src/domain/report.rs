// ==========================================
// Foundry QC Tracker - report read models
// ==========================================
// Daily production, chemical summary, defect summary
// ==========================================

use crate::domain::chemical::ChemicalAnalysis;
use crate::domain::dashboard::acceptance_rate;
use crate::domain::pipe::Pipe;
use crate::domain::types::Stage;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Daily production
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftGroup {
    pub shift: i32,
    pub pipes: Vec<Pipe>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiameterCount {
    pub diameter: Option<i32>, // None = unknown
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProductionReport {
    pub report_date: NaiveDate,
    pub total: usize,
    pub by_shift: Vec<ShiftGroup>,
    pub by_diameter: Vec<DiameterCount>,
}

impl DailyProductionReport {
    /// Group pipes of one day; pipes without a shift count as shift 1
    pub fn build(report_date: NaiveDate, pipes: Vec<Pipe>) -> Self {
        let total = pipes.len();

        let mut by_diameter: Vec<DiameterCount> = Vec::new();
        for pipe in &pipes {
            match by_diameter.iter_mut().find(|c| c.diameter == pipe.diameter) {
                Some(c) => c.count += 1,
                None => by_diameter.push(DiameterCount {
                    diameter: pipe.diameter,
                    count: 1,
                }),
            }
        }
        by_diameter.sort_by_key(|c| c.diameter);

        let mut by_shift: Vec<ShiftGroup> = (1..=3)
            .map(|shift| ShiftGroup {
                shift,
                pipes: Vec::new(),
            })
            .collect();
        for pipe in pipes {
            let shift = pipe.shift.unwrap_or(1);
            if let Some(group) = by_shift.iter_mut().find(|g| g.shift == shift) {
                group.pipes.push(pipe);
            }
        }

        Self {
            report_date,
            total,
            by_shift,
            by_diameter,
        }
    }
}

// ==========================================
// Chemical summary
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemicalReportStats {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub defects: usize,
    pub rate: f64, // accepted / total, %
}

impl ChemicalReportStats {
    pub fn from_analyses(analyses: &[ChemicalAnalysis]) -> Self {
        let count = |code: &str| {
            analyses
                .iter()
                .filter(|a| a.decision.as_deref() == Some(code))
                .count()
        };
        let accepted = count("ACCEPT");
        Self {
            total: analyses.len(),
            accepted,
            rejected: count("REJECT"),
            defects: analyses.iter().filter(|a| a.has_defect).count(),
            rate: acceptance_rate(accepted as i64, analyses.len() as i64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalReport {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub furnace_id: Option<i64>,
    pub stats: ChemicalReportStats,
    pub analyses: Vec<ChemicalAnalysis>,
}

// ==========================================
// Defect summary
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefect {
    pub pipe_id: i64,
    pub no_code: String,
    pub production_date: NaiveDate,
    pub stage: Stage,
    pub defect_type: Option<String>,
    pub defect_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefectCount {
    pub stage: Stage,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectSummary {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub chemical_defects: Vec<ChemicalAnalysis>,
    pub stage_defects: Vec<StageDefect>,
    pub by_stage: Vec<StageDefectCount>,
}

impl DefectSummary {
    pub fn build(
        date_from: NaiveDate,
        date_to: NaiveDate,
        chemical_defects: Vec<ChemicalAnalysis>,
        stage_defects: Vec<StageDefect>,
    ) -> Self {
        let by_stage = Stage::ALL
            .iter()
            .filter_map(|stage| {
                let count = stage_defects.iter().filter(|d| d.stage == *stage).count() as i64;
                (count > 0).then_some(StageDefectCount {
                    stage: *stage,
                    count,
                })
            })
            .collect();
        Self {
            date_from,
            date_to,
            chemical_defects,
            stage_defects,
            by_stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pipe(no_code: &str, shift: Option<i32>, diameter: Option<i32>) -> Pipe {
        Pipe {
            id: 0,
            production_date: NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
            shift,
            shift_engineer: None,
            manufacturing_order: None,
            production_order_id: None,
            no_code: no_code.to_string(),
            pipe_code: None,
            arrange_pipe: None,
            ladle_id: None,
            diameter,
            pipe_type: None,
            machine_id: None,
            mold_number: None,
            iso_weight: None,
            actual_weight: None,
            thickness: None,
            created_at: Utc::now().naive_utc(),
            created_by: None,
        }
    }

    #[test]
    fn test_daily_production_grouping() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let report = DailyProductionReport::build(
            date,
            vec![
                pipe("N1", Some(1), Some(600)),
                pipe("N2", None, Some(600)),
                pipe("N3", Some(3), None),
                pipe("N4", Some(2), Some(300)),
            ],
        );
        assert_eq!(report.total, 4);
        assert_eq!(report.by_shift[0].pipes.len(), 2);
        assert_eq!(report.by_shift[1].pipes.len(), 1);
        assert_eq!(report.by_shift[2].pipes.len(), 1);
        assert_eq!(
            report.by_diameter,
            vec![
                DiameterCount { diameter: None, count: 1 },
                DiameterCount { diameter: Some(300), count: 1 },
                DiameterCount { diameter: Some(600), count: 2 },
            ]
        );
    }

    #[test]
    fn test_defect_summary_counts_by_stage() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let defect = |stage| StageDefect {
            pipe_id: 1,
            no_code: "N1".to_string(),
            production_date: date,
            stage,
            defect_type: Some("Sand".to_string()),
            defect_reason: None,
        };
        let summary = DefectSummary::build(
            date,
            date,
            Vec::new(),
            vec![defect(Stage::Ccm), defect(Stage::Coating), defect(Stage::Ccm)],
        );
        assert_eq!(
            summary.by_stage,
            vec![
                StageDefectCount { stage: Stage::Ccm, count: 2 },
                StageDefectCount { stage: Stage::Coating, count: 1 },
            ]
        );
    }
}
