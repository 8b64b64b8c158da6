// ==========================================
// Foundry QC Tracker - API layer
// ==========================================
// Business validation and orchestration between HTTP handlers,
// engines and repositories.
// ==========================================

pub mod access;
pub mod chemical_api;
pub mod config_api;
pub mod dashboard_api;
pub mod error;
pub mod mechanical_api;
pub mod pipe_api;
pub mod production_order_api;
pub mod reference_api;
pub mod report_api;
pub mod stage_api;
pub mod sticker_api;

pub use chemical_api::{AutoDecision, ChemicalApi, LadleLookup, SavedAnalysis, ValidationReport};
pub use config_api::ConfigApi;
pub use dashboard_api::DashboardApi;
pub use error::{ApiError, ApiResult};
pub use mechanical_api::MechanicalApi;
pub use pipe_api::PipeApi;
pub use production_order_api::ProductionOrderApi;
pub use reference_api::{ReferenceApi, ReferenceView};
pub use report_api::ReportApi;
pub use stage_api::{SavedStage, StageApi, StageVocabulary};
pub use sticker_api::{Sticker, StickerApi, StickerVerification};
