use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::common::{blocking, Deleted, HttpResult, RequestContext, SharedState};
use crate::api::Sticker;
use crate::domain::production_order::{
    OrderDetail, OrderFilter, OrderProgress, OrderStatus, OrderSummary, ProductionOrder,
    ProductionOrderDraft,
};
use crate::domain::types::Page;

// ==========================================
// Production order handlers
// ==========================================

#[derive(Debug, Default, Deserialize)]
pub(super) struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl OrderListQuery {
    fn filter(&self) -> OrderFilter {
        OrderFilter {
            status: self.status,
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct OrderSearchQuery {
    #[serde(default)]
    pub q: String,
}

pub(super) async fn list_orders(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<OrderListQuery>,
) -> HttpResult<Page<ProductionOrder>> {
    let api = state.production_order_api.clone();
    ctx.json(blocking(move || api.list(&query.filter(), query.page, query.per_page)).await)
}

pub(super) async fn create_order(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Json(draft): Json<ProductionOrderDraft>,
) -> HttpResult<ProductionOrder> {
    let api = state.production_order_api.clone();
    let actor = ctx.actor.clone();
    ctx.json(blocking(move || api.create(&draft, &actor)).await)
}

/// Order picker lookup by number or customer
pub(super) async fn search_orders(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<OrderSearchQuery>,
) -> HttpResult<Vec<OrderSummary>> {
    let api = state.production_order_api.clone();
    ctx.json(blocking(move || api.search(&query.q)).await)
}

pub(super) async fn order_detail(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> HttpResult<OrderDetail> {
    let api = state.production_order_api.clone();
    ctx.json(blocking(move || api.detail(id)).await)
}

pub(super) async fn update_order(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(draft): Json<ProductionOrderDraft>,
) -> HttpResult<ProductionOrder> {
    let api = state.production_order_api.clone();
    let actor = ctx.actor.clone();
    ctx.json(blocking(move || api.update(id, &draft, &actor)).await)
}

pub(super) async fn delete_order(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> HttpResult<Deleted> {
    let api = state.production_order_api.clone();
    let actor = ctx.actor.clone();
    let result = blocking(move || api.delete(id, &actor)).await;
    ctx.json(result.map(|_| Deleted::new(id, &ctx)))
}

pub(super) async fn order_progress(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> HttpResult<OrderProgress> {
    let api = state.production_order_api.clone();
    ctx.json(blocking(move || api.progress(id)).await)
}

/// Stickers for every pipe of the order
pub(super) async fn order_stickers(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> HttpResult<Vec<Sticker>> {
    let api = state.production_order_api.clone();
    ctx.json(blocking(move || api.stickers(id)).await)
}
