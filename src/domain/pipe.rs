// ==========================================
// Foundry QC Tracker - pipe domain model
// ==========================================
// A pipe is cast from one ladle and passes through eight stages.
// Each stage holds at most one row per pipe.
// ==========================================

use crate::domain::types::Stage;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Pipe
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    pub id: i64,

    // ===== production =====
    pub production_date: NaiveDate,
    pub shift: Option<i32>,
    pub shift_engineer: Option<String>,
    pub manufacturing_order: Option<String>,
    pub production_order_id: Option<i64>, // FK -> production_orders.id

    // ===== identification =====
    pub no_code: String,           // unique sticker number, e.g. N8739
    pub pipe_code: Option<String>,
    pub arrange_pipe: Option<i32>, // position within the ladle
    pub ladle_id: Option<String>,  // FK -> chemical_analyses.ladle_id

    // ===== specification =====
    pub diameter: Option<i32>, // DN, mm
    pub pipe_type: Option<String>,
    pub machine_id: Option<i64>,
    pub mold_number: Option<String>,
    pub iso_weight: Option<f64>,
    pub actual_weight: Option<f64>,
    pub thickness: Option<f64>,

    // ===== metadata =====
    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
}

/// Form input for creating a pipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPipe {
    pub production_date: Option<NaiveDate>,
    pub shift: Option<i32>,
    pub shift_engineer: Option<String>,
    pub manufacturing_order: Option<String>,
    pub production_order_id: Option<i64>,
    pub no_code: String,
    pub pipe_code: Option<String>,
    pub arrange_pipe: Option<i32>,
    pub ladle_id: Option<String>,
    pub diameter: Option<i32>,
    pub pipe_type: Option<String>,
    pub machine_id: Option<i64>,
    pub mold_number: Option<String>,
    pub iso_weight: Option<f64>,
    pub actual_weight: Option<f64>,
    pub thickness: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipeFilter {
    pub ladle_id: Option<String>,
    pub no_code: Option<String>, // substring match
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub diameter: Option<i32>,
    pub production_order_id: Option<i64>,
}

// ==========================================
// PipeStage - one stage record of one pipe
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeStage {
    pub id: i64,
    pub pipe_id: i64,
    pub stage: Stage,
    pub stage_date: Option<NaiveDate>,
    pub decision: Option<String>,
    pub reason: Option<String>,
    pub has_defect: bool,
    pub defect_type_id: Option<i64>,    // FK -> defect_types
    pub defect_type: Option<String>,    // stage-specific defect label
    pub defect_reason: Option<String>,
    pub machine_id: Option<i64>,
    pub measurement_type: Option<String>,
    pub measurement_value: Option<f64>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub updated_by: Option<String>,
}

impl PipeStage {
    pub fn is_complete(&self) -> bool {
        self.decision
            .as_deref()
            .map(|d| !d.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Form input for upserting a stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageUpdate {
    pub stage_date: Option<NaiveDate>, // defaults to today
    pub decision: Option<String>,
    pub reason: Option<String>,
    pub has_defect: bool,
    pub defect_type_id: Option<i64>,
    pub defect_type: Option<String>,
    pub defect_reason: Option<String>,
    pub machine_id: Option<i64>,
    pub measurement_value: Option<f64>,
    pub notes: Option<String>,
}

// ==========================================
// StageHistoryEntry - snapshot of a stage change
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Create => "CREATE",
            HistoryAction::Update => "UPDATE",
            HistoryAction::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATE" => Some(HistoryAction::Create),
            "UPDATE" => Some(HistoryAction::Update),
            "DELETE" => Some(HistoryAction::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageHistoryEntry {
    pub id: i64,
    pub pipe_stage_id: i64,
    pub pipe_id: i64,
    pub stage: Stage,
    pub action: HistoryAction,

    // ===== snapshot =====
    pub stage_date: Option<NaiveDate>,
    pub decision: Option<String>,
    pub reason: Option<String>,
    pub has_defect: bool,
    pub defect_type: Option<String>,
    pub defect_reason: Option<String>,
    pub machine_id: Option<i64>,
    pub machine_code: Option<String>,
    pub measurement_type: Option<String>,
    pub measurement_value: Option<f64>,
    pub notes: Option<String>,

    pub changed_at: NaiveDateTime,
    pub changed_by: Option<String>,
}

// ==========================================
// PipeStatus - derived view over the stage rows
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStatus {
    pub stage: Stage,
    pub completed: bool,
    pub decision: Option<String>,
    pub has_defect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeStatus {
    pub stages: Vec<StageStatus>,
    pub current_stage: Stage,
    pub final_decision: Option<String>,
}

/// Pipe with its stage rows and derived status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeDetail {
    pub pipe: Pipe,
    pub stages: Vec<PipeStage>,
    pub status: PipeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_action_round_trip() {
        for action in [HistoryAction::Create, HistoryAction::Update, HistoryAction::Delete] {
            assert_eq!(HistoryAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(HistoryAction::parse("MERGE"), None);
    }
}
