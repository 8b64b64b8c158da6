// ==========================================
// Foundry QC Tracker - domain layer
// ==========================================
// Entities, value types and read models.
// No data access, no engine logic.
// ==========================================

pub mod chemical;
pub mod dashboard;
pub mod mechanical;
pub mod pipe;
pub mod production_order;
pub mod reference;
pub mod report;
pub mod types;

pub use chemical::{
    ChemicalAnalysis, ChemicalAnalysisDraft, ChemicalFilter, ElementReadings, Equivalents,
};
pub use dashboard::{acceptance_rate, DashboardStats, DecisionCount, FurnaceCount};
pub use mechanical::{
    DerivedResults, MechanicalFilter, MechanicalProperties, MechanicalTest, MechanicalTestDraft,
    Microstructure, SampleMeasurements,
};
pub use pipe::{
    HistoryAction, NewPipe, Pipe, PipeDetail, PipeFilter, PipeStage, PipeStatus,
    StageHistoryEntry, StageStatus, StageUpdate,
};
pub use production_order::{
    OrderDetail, OrderFilter, OrderPriority, OrderProgress, OrderStatus, OrderSummary,
    ProductionOrder, ProductionOrderDraft, StageProgress, StageTally,
};
pub use reference::{
    DecisionType, DefectType, ElementSpecification, Engineer, Furnace, Machine, MechanicalRule,
    ReferenceData, Shift,
};
pub use report::{
    ChemicalReport, ChemicalReportStats, DailyProductionReport, DefectSummary, DiameterCount,
    ShiftGroup, StageDefect, StageDefectCount,
};
pub use types::{Actor, Capability, Page, PageRequest, Role, Stage};
