// ==========================================
// Foundry QC Tracker - application layer
// ==========================================
// Service wiring and the HTTP surface
// ==========================================

pub mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;
