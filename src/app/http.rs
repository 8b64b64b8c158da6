// ==========================================
// Foundry QC Tracker - HTTP surface
// ==========================================
// axum router over the API services, split by domain.
// Every request gets a tracing span with a generated request id.
// ==========================================

mod chemical;
mod common;
mod mechanical;
mod order;
mod pipe;
mod report;
mod sticker;
mod system;

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app::state::AppState;

pub use common::{Deleted, ErrorResponse, SharedState, ACTOR_HEADER, ROLE_HEADER};

/// Build the application router
///
/// # Arguments
/// - state: wired services, shared by every handler
///
/// # Returns
/// - router with tracing and permissive CORS layers
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/reference", get(system::reference))
        .route("/dashboard", get(system::dashboard))
        .route(
            "/config",
            get(system::list_settings).post(system::update_setting),
        )
        // chemical analyses
        .route(
            "/chemical",
            get(chemical::list_analyses).post(chemical::create_analysis),
        )
        .route("/chemical/next-ladle-no", get(chemical::next_ladle_no))
        .route("/chemical/validate", post(chemical::validate_readings))
        .route("/chemical/auto-decision", post(chemical::auto_decision))
        .route(
            "/chemical/:id",
            get(chemical::get_analysis)
                .post(chemical::update_analysis)
                .delete(chemical::delete_analysis),
        )
        .route("/ladles/:ladle_id", get(chemical::lookup_ladle))
        // pipes and stages
        .route("/pipes", get(pipe::list_pipes).post(pipe::create_pipe))
        .route("/pipes/search", get(pipe::search_pipes))
        .route(
            "/pipes/:id",
            get(pipe::pipe_detail).delete(pipe::delete_pipe),
        )
        .route(
            "/pipes/:id/stages/:stage",
            post(pipe::save_stage).delete(pipe::delete_stage),
        )
        .route("/pipes/:id/history", get(pipe::stage_history))
        // mechanical tests
        .route(
            "/mechanical",
            get(mechanical::list_tests).post(mechanical::create_test),
        )
        .route("/mechanical/auto-decision", post(mechanical::auto_decision))
        .route(
            "/mechanical/:id",
            get(mechanical::get_test)
                .post(mechanical::update_test)
                .delete(mechanical::delete_test),
        )
        // production orders
        .route(
            "/orders",
            get(order::list_orders).post(order::create_order),
        )
        .route("/orders/search", get(order::search_orders))
        .route(
            "/orders/:id",
            get(order::order_detail)
                .post(order::update_order)
                .delete(order::delete_order),
        )
        .route("/orders/:id/progress", get(order::order_progress))
        .route("/orders/:id/stickers", get(order::order_stickers))
        // stickers
        .route("/stickers/search", get(sticker::search))
        .route("/stickers/verify", post(sticker::verify))
        .route("/stickers/batch", post(sticker::batch))
        .route("/stickers/:pipe_id", get(sticker::sticker))
        // reports
        .route("/reports/daily-production", get(report::daily_production))
        .route("/reports/chemical", get(report::chemical_report))
        .route("/reports/defect-summary", get(report::defect_summary))
        .route("/reports/chemical.csv", get(report::chemical_csv))
        .route("/reports/mechanical.csv", get(report::mechanical_csv));

    Router::new()
        .route("/health", get(system::health))
        .nest("/api", api)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = uuid::Uuid::new_v4();
                tracing::info_span!(
                    "http",
                    %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
