use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::Deserialize;

use super::chemical::{ChemicalListQuery, DateQuery};
use super::common::{blocking, HttpError, HttpResult, RequestContext, SharedState};
use super::mechanical::MechanicalListQuery;
use crate::domain::report::{ChemicalReport, DailyProductionReport, DefectSummary};

// ==========================================
// Report handlers (JSON read models and CSV downloads)
// ==========================================

#[derive(Debug, Default, Deserialize)]
pub(super) struct RangeQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub furnace_id: Option<i64>,
}

pub(super) async fn daily_production(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<DateQuery>,
) -> HttpResult<DailyProductionReport> {
    let api = state.report_api.clone();
    ctx.json(blocking(move || api.daily_production(query.date)).await)
}

pub(super) async fn chemical_report(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<RangeQuery>,
) -> HttpResult<ChemicalReport> {
    let api = state.report_api.clone();
    ctx.json(
        blocking(move || api.chemical_report(query.date_from, query.date_to, query.furnace_id))
            .await,
    )
}

pub(super) async fn defect_summary(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<RangeQuery>,
) -> HttpResult<DefectSummary> {
    let api = state.report_api.clone();
    ctx.json(blocking(move || api.defect_summary(query.date_from, query.date_to)).await)
}

pub(super) async fn chemical_csv(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<ChemicalListQuery>,
) -> Result<Response, HttpError> {
    let api = state.report_api.clone();
    let body = blocking(move || api.chemical_csv(&query.filter()))
        .await
        .map_err(|e| ctx.error(e))?;
    Ok(csv_download("chemical_analyses.csv", body))
}

pub(super) async fn mechanical_csv(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<MechanicalListQuery>,
) -> Result<Response, HttpError> {
    let api = state.report_api.clone();
    let body = blocking(move || api.mechanical_csv(&query.filter()))
        .await
        .map_err(|e| ctx.error(e))?;
    Ok(csv_download("mechanical_tests.csv", body))
}

fn csv_download(file_name: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}
