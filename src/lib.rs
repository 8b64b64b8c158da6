// ==========================================
// Foundry QC Tracker - core library
// ==========================================
// Ladle chemistry, pipe stage tracking, mechanical tests,
// sticker payloads and reports for a ductile iron pipe foundry.
// Storage: SQLite. Surface: JSON over HTTP (axum).
// ==========================================

// Translations (en, ar)
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// Modules
// ==========================================

// Entities and value types
pub mod domain;

// Pure rules: validation, equivalents, codecs, stage vocabularies
pub mod engine;

// Data access
pub mod repository;

// Startup and runtime settings
pub mod config;

// Connection setup, schema, seed data
pub mod db;

pub mod logging;

pub mod i18n;

// Business services
pub mod api;

// Service wiring and HTTP surface
pub mod app;

// ==========================================
// Re-exports
// ==========================================

pub use domain::types::{Actor, Capability, Role, Stage};

pub use domain::{ChemicalAnalysis, MechanicalTest, Pipe, PipeStage};

pub use api::{ApiError, ApiResult};

pub use app::{create_router, AppState};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Foundry QC Tracker";
