// ==========================================
// Foundry QC Tracker - production order rules
// ==========================================
// Order numbers:  PO-YYYYMMDD-NNN, sequence restarts every day
// Progress:       completed = accepted at Finish
//                 rejected  = rejected at any stage
//                 percent   = completed / target, capped at 100
// ==========================================

use crate::domain::pipe::PipeStage;
use crate::domain::production_order::{OrderProgress, ProductionOrder, StageProgress, StageTally};
use crate::domain::types::Stage;
use chrono::NaiveDate;
use std::collections::HashMap;

pub const ORDER_NUMBER_PREFIX: &str = "PO";

/// "PO-20250113"
pub fn order_number_prefix(date: NaiveDate) -> String {
    format!("{}-{}", ORDER_NUMBER_PREFIX, date.format("%Y%m%d"))
}

/// Next number of the day after `last`, the latest number sharing the prefix.
/// A last number without a numeric tail restarts at 1.
pub fn next_order_number(date: NaiveDate, last: Option<&str>) -> String {
    let seq = last
        .and_then(|n| n.rsplit('-').next())
        .and_then(|tail| tail.parse::<u32>().ok())
        .map_or(1, |n| n.saturating_add(1));
    format!("{}-{:03}", order_number_prefix(date), seq)
}

fn is_decision(stage: &PipeStage, code: &str) -> bool {
    stage
        .decision
        .as_deref()
        .is_some_and(|d| d.trim().eq_ignore_ascii_case(code))
}

/// Progress of an order from the stage rows of its pipes
///
/// # Arguments
/// - order: the order itself (target quantity)
/// - pipe_ids: every pipe linked to the order
/// - stages: stage rows of those pipes, any order
pub fn compute_progress(
    order: &ProductionOrder,
    pipe_ids: &[i64],
    stages: &[PipeStage],
) -> OrderProgress {
    let mut by_pipe: HashMap<i64, Vec<&PipeStage>> = HashMap::new();
    for row in stages {
        by_pipe.entry(row.pipe_id).or_default().push(row);
    }

    let mut tallies: HashMap<Stage, StageTally> = HashMap::new();
    let mut completed = 0;
    let mut rejected = 0;

    for pipe_id in pipe_ids {
        let rows = by_pipe.get(pipe_id).map(Vec::as_slice).unwrap_or_default();
        for stage in Stage::ALL {
            let tally = tallies.entry(stage).or_default();
            match rows.iter().find(|r| r.stage == stage) {
                Some(row) if is_decision(row, "accept") => tally.accept += 1,
                Some(row) if is_decision(row, "reject") => tally.reject += 1,
                _ => tally.pending += 1,
            }
        }
        if rows
            .iter()
            .any(|r| r.stage == Stage::Finish && is_decision(r, "accept"))
        {
            completed += 1;
        }
        if rows.iter().any(|r| is_decision(r, "reject")) {
            rejected += 1;
        }
    }

    let progress_percentage = if order.target_quantity <= 0 {
        0
    } else {
        (completed * 100 / order.target_quantity).min(100) as u8
    };

    OrderProgress {
        order_id: order.id,
        order_number: order.order_number.clone(),
        target_quantity: order.target_quantity,
        produced_quantity: pipe_ids.len() as i64,
        completed_quantity: completed,
        rejected_quantity: rejected,
        progress_percentage,
        is_completed: completed >= order.target_quantity,
        stage_stats: Stage::ALL
            .iter()
            .map(|stage| StageProgress {
                stage: *stage,
                tally: tallies.get(stage).copied().unwrap_or_default(),
            })
            .collect(),
    }
}
