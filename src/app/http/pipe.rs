use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use super::common::{blocking, Deleted, HttpResult, RequestContext, SharedState};
use crate::api::SavedStage;
use crate::domain::pipe::{NewPipe, Pipe, PipeDetail, PipeFilter, PipeStage, StageHistoryEntry, StageUpdate};
use crate::domain::types::Page;

// ==========================================
// Pipe and stage handlers
// ==========================================

#[derive(Debug, Default, Deserialize)]
pub(super) struct PipeListQuery {
    pub ladle_id: Option<String>,
    pub no_code: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub diameter: Option<i32>,
    pub production_order_id: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PipeListQuery {
    fn filter(&self) -> PipeFilter {
        let text = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        PipeFilter {
            ladle_id: text(&self.ladle_id),
            no_code: text(&self.no_code),
            date_from: self.date_from,
            date_to: self.date_to,
            diameter: self.diameter,
            production_order_id: self.production_order_id,
        }
    }
}

pub(super) async fn list_pipes(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<PipeListQuery>,
) -> HttpResult<Page<Pipe>> {
    let api = state.pipe_api.clone();
    ctx.json(blocking(move || api.list(&query.filter(), query.page, query.per_page)).await)
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct PipeSearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Quick lookup by pipe number or ladle id
pub(super) async fn search_pipes(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<PipeSearchQuery>,
) -> HttpResult<Vec<Pipe>> {
    let api = state.pipe_api.clone();
    ctx.json(blocking(move || api.search(&query.q)).await)
}

pub(super) async fn create_pipe(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Json(input): Json<NewPipe>,
) -> HttpResult<Pipe> {
    let api = state.pipe_api.clone();
    let actor = ctx.actor.clone();
    ctx.json(blocking(move || api.create(&input, &actor)).await)
}

pub(super) async fn pipe_detail(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> HttpResult<PipeDetail> {
    let api = state.pipe_api.clone();
    ctx.json(blocking(move || api.detail(id)).await)
}

pub(super) async fn delete_pipe(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> HttpResult<Deleted> {
    let api = state.pipe_api.clone();
    let actor = ctx.actor.clone();
    let result = blocking(move || api.delete(id, &actor)).await;
    ctx.json(result.map(|_| Deleted::new(id, &ctx)))
}

pub(super) async fn save_stage(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path((pipe_id, stage)): Path<(i64, String)>,
    Json(update): Json<StageUpdate>,
) -> HttpResult<SavedStage> {
    let api = state.stage_api.clone();
    let actor = ctx.actor.clone();
    ctx.json(blocking(move || api.save(pipe_id, &stage, &update, &actor)).await)
}

pub(super) async fn delete_stage(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path((pipe_id, stage)): Path<(i64, String)>,
) -> HttpResult<PipeStage> {
    let api = state.stage_api.clone();
    let actor = ctx.actor.clone();
    ctx.json(blocking(move || api.delete(pipe_id, &stage, &actor)).await)
}

pub(super) async fn stage_history(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(pipe_id): Path<i64>,
) -> HttpResult<Vec<StageHistoryEntry>> {
    let api = state.stage_api.clone();
    ctx.json(blocking(move || api.history(pipe_id)).await)
}
