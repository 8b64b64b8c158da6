use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::common::{blocking, Deleted, HttpResult, RequestContext, SharedState};
use crate::api::{AutoDecision, LadleLookup, SavedAnalysis, ValidationReport};
use crate::domain::chemical::{
    ChemicalAnalysis, ChemicalAnalysisDraft, ChemicalFilter, ElementReadings,
};
use crate::domain::types::Page;

// ==========================================
// Chemical analysis handlers
// ==========================================

#[derive(Debug, Default, Deserialize)]
pub(super) struct ChemicalListQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub furnace_id: Option<i64>,
    pub decision: Option<String>,
    pub has_defect: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ChemicalListQuery {
    pub(super) fn filter(&self) -> ChemicalFilter {
        ChemicalFilter {
            date_from: self.date_from,
            date_to: self.date_to,
            furnace_id: self.furnace_id,
            decision: self.decision.clone().filter(|d| !d.trim().is_empty()),
            has_defect: self.has_defect,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(super) struct NextLadleNo {
    pub test_date: NaiveDate,
    pub ladle_no: i32,
}

pub(super) async fn list_analyses(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<ChemicalListQuery>,
) -> HttpResult<Page<ChemicalAnalysis>> {
    let api = state.chemical_api.clone();
    ctx.json(blocking(move || api.list(&query.filter(), query.page, query.per_page)).await)
}

pub(super) async fn create_analysis(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Json(draft): Json<ChemicalAnalysisDraft>,
) -> HttpResult<SavedAnalysis> {
    let api = state.chemical_api.clone();
    let (actor, locale) = (ctx.actor.clone(), ctx.locale);
    ctx.json(blocking(move || api.create(&draft, &actor, locale)).await)
}

pub(super) async fn get_analysis(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> HttpResult<ChemicalAnalysis> {
    let api = state.chemical_api.clone();
    ctx.json(blocking(move || api.get(id)).await)
}

pub(super) async fn update_analysis(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(draft): Json<ChemicalAnalysisDraft>,
) -> HttpResult<SavedAnalysis> {
    let api = state.chemical_api.clone();
    let (actor, locale) = (ctx.actor.clone(), ctx.locale);
    ctx.json(blocking(move || api.update(id, &draft, &actor, locale)).await)
}

pub(super) async fn delete_analysis(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> HttpResult<Deleted> {
    let api = state.chemical_api.clone();
    let actor = ctx.actor.clone();
    let result = blocking(move || api.delete(id, &actor)).await;
    ctx.json(result.map(|_| Deleted::new(id, &ctx)))
}

pub(super) async fn next_ladle_no(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<DateQuery>,
) -> HttpResult<NextLadleNo> {
    let api = state.chemical_api.clone();
    let test_date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let result = blocking(move || api.next_ladle_no(test_date)).await;
    ctx.json(result.map(|ladle_no| NextLadleNo {
        test_date,
        ladle_no,
    }))
}

pub(super) async fn validate_readings(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Json(readings): Json<ElementReadings>,
) -> HttpResult<ValidationReport> {
    ctx.json(Ok(state.chemical_api.validate(&readings, ctx.locale)))
}

pub(super) async fn auto_decision(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Json(readings): Json<ElementReadings>,
) -> HttpResult<AutoDecision> {
    ctx.json(Ok(state.chemical_api.auto_decision(&readings, ctx.locale)))
}

pub(super) async fn lookup_ladle(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(ladle_id): Path<String>,
) -> HttpResult<LadleLookup> {
    let api = state.chemical_api.clone();
    ctx.json(blocking(move || api.lookup_ladle(&ladle_id)).await)
}
