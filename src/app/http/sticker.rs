use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::common::{blocking, HttpResult, RequestContext, SharedState};
use crate::api::{Sticker, StickerVerification};

// ==========================================
// Sticker handlers
// ==========================================

#[derive(Debug, Default, Deserialize)]
pub(super) struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct BatchRequest {
    pub pipe_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct VerifyRequest {
    pub qr: String,
}

pub(super) async fn search(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<SearchQuery>,
) -> HttpResult<Vec<Sticker>> {
    let api = state.sticker_api.clone();
    ctx.json(blocking(move || api.search(&query.q)).await)
}

pub(super) async fn sticker(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(pipe_id): Path<i64>,
) -> HttpResult<Sticker> {
    let api = state.sticker_api.clone();
    ctx.json(blocking(move || api.sticker(pipe_id)).await)
}

pub(super) async fn batch(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Json(request): Json<BatchRequest>,
) -> HttpResult<Vec<Sticker>> {
    let api = state.sticker_api.clone();
    ctx.json(blocking(move || api.batch(&request.pipe_ids)).await)
}

pub(super) async fn verify(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Json(request): Json<VerifyRequest>,
) -> HttpResult<StickerVerification> {
    let api = state.sticker_api.clone();
    ctx.json(blocking(move || api.verify(&request.qr)).await)
}
