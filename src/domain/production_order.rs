// ==========================================
// Foundry QC Tracker - production order domain model
// ==========================================
// A production order is a customer batch of pipes.
// Pipes link to at most one order; progress is derived from
// the stage rows of the linked pipes.
// ==========================================

use crate::domain::pipe::Pipe;
use crate::domain::types::Stage;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl OrderPriority {
    pub const ALL: [OrderPriority; 4] = [
        OrderPriority::Low,
        OrderPriority::Normal,
        OrderPriority::High,
        OrderPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPriority::Low => "low",
            OrderPriority::Normal => "normal",
            OrderPriority::High => "high",
            OrderPriority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

// ==========================================
// ProductionOrder
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub id: i64,
    pub order_number: String, // PO-YYYYMMDD-NNN unless entered by hand

    // ===== customer =====
    pub customer_name: Option<String>,
    pub customer_code: Option<String>,
    pub sales_number: Option<String>,

    // ===== product =====
    pub target_quantity: i64,
    pub diameter: Option<i32>,
    pub pipe_class: Option<String>, // K9, C25, ...
    pub product_code: Option<String>,
    pub product_description: Option<String>,
    pub product_weight: Option<f64>, // kg
    pub product_length: Option<f64>, // m

    // ===== schedule =====
    pub order_date: NaiveDate,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,

    pub status: OrderStatus,
    pub priority: OrderPriority,
    pub notes: Option<String>,
    pub specifications: Option<String>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by: Option<String>,
}

/// Form input for create / edit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionOrderDraft {
    /// Blank generates the next PO-YYYYMMDD-NNN number
    pub order_number: Option<String>,
    pub customer_name: Option<String>,
    pub customer_code: Option<String>,
    pub sales_number: Option<String>,
    pub target_quantity: Option<i64>,
    pub diameter: Option<i32>,
    pub pipe_class: Option<String>,
    pub product_code: Option<String>,
    pub product_description: Option<String>,
    pub product_weight: Option<f64>,
    pub product_length: Option<f64>,
    pub order_date: Option<NaiveDate>, // defaults to today
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub status: Option<OrderStatus>,
    pub priority: Option<OrderPriority>,
    pub notes: Option<String>,
    pub specifications: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Substring of order_number or customer_name
    pub search: Option<String>,
}

/// Search hit with the produced count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: i64,
    pub order_number: String,
    pub customer_name: Option<String>,
    pub target_quantity: i64,
    pub produced_quantity: i64,
    pub status: OrderStatus,
}

// ==========================================
// OrderProgress - derived from the linked pipes
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTally {
    pub accept: i64,
    pub reject: i64,
    /// No row, no decision, or any other decision
    pub pending: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageProgress {
    pub stage: Stage,
    #[serde(flatten)]
    pub tally: StageTally,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProgress {
    pub order_id: i64,
    pub order_number: String,
    pub target_quantity: i64,
    /// Pipes linked to the order
    pub produced_quantity: i64,
    /// Pipes accepted at Finish
    pub completed_quantity: i64,
    /// Pipes rejected at any stage
    pub rejected_quantity: i64,
    /// completed / target, capped at 100; 0 when target is 0
    pub progress_percentage: u8,
    pub is_completed: bool,
    pub stage_stats: Vec<StageProgress>,
}

/// Order with its pipes and progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: ProductionOrder,
    pub pipes: Vec<Pipe>,
    pub progress: OrderProgress,
}
