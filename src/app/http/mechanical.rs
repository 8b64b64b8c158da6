use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use super::common::{blocking, Deleted, HttpResult, RequestContext, SharedState};
use crate::domain::mechanical::{MechanicalFilter, MechanicalTest, MechanicalTestDraft};
use crate::domain::types::Page;
use crate::engine::mechanical::MechanicalDecision;

// ==========================================
// Mechanical test handlers
// ==========================================

#[derive(Debug, Default, Deserialize)]
pub(super) struct MechanicalListQuery {
    pub ladle_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub decision: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl MechanicalListQuery {
    pub(super) fn filter(&self) -> MechanicalFilter {
        let text = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        MechanicalFilter {
            ladle_id: text(&self.ladle_id),
            date_from: self.date_from,
            date_to: self.date_to,
            decision: text(&self.decision),
        }
    }
}

pub(super) async fn list_tests(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<MechanicalListQuery>,
) -> HttpResult<Page<MechanicalTest>> {
    let api = state.mechanical_api.clone();
    ctx.json(blocking(move || api.list(&query.filter(), query.page, query.per_page)).await)
}

pub(super) async fn create_test(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Json(draft): Json<MechanicalTestDraft>,
) -> HttpResult<MechanicalTest> {
    let api = state.mechanical_api.clone();
    let actor = ctx.actor.clone();
    ctx.json(blocking(move || api.create(&draft, &actor)).await)
}

/// Judge an unsaved form; nothing is stored
pub(super) async fn auto_decision(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Json(draft): Json<MechanicalTestDraft>,
) -> HttpResult<MechanicalDecision> {
    ctx.json(Ok(state.mechanical_api.auto_decision(&draft)))
}

pub(super) async fn get_test(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> HttpResult<MechanicalTest> {
    let api = state.mechanical_api.clone();
    ctx.json(blocking(move || api.get(id)).await)
}

pub(super) async fn update_test(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(draft): Json<MechanicalTestDraft>,
) -> HttpResult<MechanicalTest> {
    let api = state.mechanical_api.clone();
    let actor = ctx.actor.clone();
    ctx.json(blocking(move || api.update(id, &draft, &actor)).await)
}

pub(super) async fn delete_test(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> HttpResult<Deleted> {
    let api = state.mechanical_api.clone();
    let actor = ctx.actor.clone();
    let result = blocking(move || api.delete(id, &actor)).await;
    ctx.json(result.map(|_| Deleted::new(id, &ctx)))
}
