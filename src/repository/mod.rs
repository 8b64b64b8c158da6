// ==========================================
// Foundry QC Tracker - data access layer
// ==========================================
// Repositories hold no business rules.
// All queries are parameterised.
// ==========================================

pub mod chemical_repo;
pub mod dashboard_repo;
pub mod error;
pub mod mechanical_repo;
pub mod pipe_repo;
pub mod production_order_repo;
pub mod reference_repo;
pub mod sql_builder;

pub use chemical_repo::ChemicalAnalysisRepository;
pub use dashboard_repo::{DashboardCounts, DashboardRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use mechanical_repo::MechanicalTestRepository;
pub use pipe_repo::PipeRepository;
pub use production_order_repo::ProductionOrderRepository;
pub use reference_repo::ReferenceRepository;
