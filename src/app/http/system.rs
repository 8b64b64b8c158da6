use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{blocking, HttpResult, RequestContext, SharedState};
use crate::api::ReferenceView;
use crate::domain::dashboard::DashboardStats;

// ==========================================
// Health, reference data, dashboard, runtime settings
// ==========================================

#[derive(Debug, Serialize)]
pub(super) struct Health {
    pub status: &'static str,
    pub app: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct DashboardQuery {
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SettingUpdate {
    pub key: String,
    pub value: String,
}

pub(super) async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        app: crate::APP_NAME,
        version: crate::VERSION,
    })
}

pub(super) async fn reference(
    State(state): State<SharedState>,
    ctx: RequestContext,
) -> HttpResult<ReferenceView> {
    ctx.json(Ok(state.reference_api.view()))
}

pub(super) async fn dashboard(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<DashboardQuery>,
) -> HttpResult<DashboardStats> {
    let api = state.dashboard_api.clone();
    ctx.json(blocking(move || api.stats(query.as_of)).await)
}

pub(super) async fn list_settings(
    State(state): State<SharedState>,
    ctx: RequestContext,
) -> HttpResult<BTreeMap<String, String>> {
    let api = state.config_api.clone();
    ctx.json(blocking(move || api.list()).await)
}

/// Returns the full settings map after the change
pub(super) async fn update_setting(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Json(update): Json<SettingUpdate>,
) -> HttpResult<BTreeMap<String, String>> {
    let api = state.config_api.clone();
    let actor = ctx.actor.clone();
    ctx.json(
        blocking(move || {
            api.set(&update.key, &update.value, &actor)?;
            api.list()
        })
        .await,
    )
}
