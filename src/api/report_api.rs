// ==========================================
// Foundry QC Tracker - report API
// ==========================================
// Report data as JSON read models and CSV exports.
// PDF / Excel rendering is left to clients.
// ==========================================

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::chemical::{ChemicalAnalysis, ChemicalFilter};
use crate::domain::mechanical::{MechanicalFilter, MechanicalTest};
use crate::domain::reference::ReferenceData;
use crate::domain::report::{
    ChemicalReport, ChemicalReportStats, DailyProductionReport, DefectSummary,
};
use crate::repository::{ChemicalAnalysisRepository, MechanicalTestRepository, PipeRepository};

/// Default look-back of the chemical report
pub const CHEMICAL_REPORT_DAYS: i64 = 7;
/// Default look-back of the defect summary
pub const DEFECT_SUMMARY_DAYS: i64 = 30;

const CHEMICAL_CSV_HEADER: [&str; 22] = [
    "test_date", "furnace", "ladle_no", "ladle_id",
    "C", "Si", "Mg", "Cu", "Cr", "S", "Mn", "P", "Pb", "Al",
    "CE", "MnE", "MgE",
    "decision", "reason", "has_defect", "defect_reason", "notes",
];

const MECHANICAL_CSV_HEADER: [&str; 20] = [
    "test_date", "test_number", "diameter", "pipe_no", "ladle_id",
    "d1", "d2", "d3", "avg_dimension", "original_length", "final_length",
    "elongation", "area_d_squared", "force_kgf", "tensile_strength",
    "nodularity_percent", "nodule_count", "hardness", "decision", "comments",
];

pub struct ReportApi {
    chemical_repo: Arc<ChemicalAnalysisRepository>,
    pipe_repo: Arc<PipeRepository>,
    mechanical_repo: Arc<MechanicalTestRepository>,
    reference: Arc<ReferenceData>,
}

impl ReportApi {
    pub fn new(
        chemical_repo: Arc<ChemicalAnalysisRepository>,
        pipe_repo: Arc<PipeRepository>,
        mechanical_repo: Arc<MechanicalTestRepository>,
        reference: Arc<ReferenceData>,
    ) -> Self {
        Self {
            chemical_repo,
            pipe_repo,
            mechanical_repo,
            reference,
        }
    }

    /// Pipes of one day grouped by shift and diameter
    pub fn daily_production(&self, date: Option<NaiveDate>) -> ApiResult<DailyProductionReport> {
        let date = date.unwrap_or_else(today);
        let pipes = self.pipe_repo.list_by_production_date(date)?;
        Ok(DailyProductionReport::build(date, pipes))
    }

    /// Analyses in a date range (default: the last week), newest first, with totals
    pub fn chemical_report(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        furnace_id: Option<i64>,
    ) -> ApiResult<ChemicalReport> {
        let (date_from, date_to) = resolve_range(date_from, date_to, CHEMICAL_REPORT_DAYS)?;
        let mut analyses = self.chemical_repo.list_all(&ChemicalFilter {
            date_from: Some(date_from),
            date_to: Some(date_to),
            furnace_id,
            ..Default::default()
        })?;
        analyses.reverse();

        Ok(ChemicalReport {
            date_from,
            date_to,
            furnace_id,
            stats: ChemicalReportStats::from_analyses(&analyses),
            analyses,
        })
    }

    /// Defective analyses and stage defects (default: the last 30 days)
    pub fn defect_summary(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> ApiResult<DefectSummary> {
        let (date_from, date_to) = resolve_range(date_from, date_to, DEFECT_SUMMARY_DAYS)?;
        let chemical_defects = self.chemical_repo.list_all(&ChemicalFilter {
            date_from: Some(date_from),
            date_to: Some(date_to),
            has_defect: Some(true),
            ..Default::default()
        })?;
        let stage_defects = self.pipe_repo.stage_defects(date_from, date_to)?;
        Ok(DefectSummary::build(
            date_from,
            date_to,
            chemical_defects,
            stage_defects,
        ))
    }

    /// Matching analyses as CSV, oldest first
    pub fn chemical_csv(&self, filter: &ChemicalFilter) -> ApiResult<String> {
        let analyses = self.chemical_repo.list_all(filter)?;
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CHEMICAL_CSV_HEADER).map_err(csv_error)?;
        for analysis in &analyses {
            writer
                .write_record(self.chemical_row(analysis))
                .map_err(csv_error)?;
        }
        tracing::info!(rows = analyses.len(), "chemical CSV exported");
        finish(writer)
    }

    /// Matching mechanical tests as CSV, oldest first
    pub fn mechanical_csv(&self, filter: &MechanicalFilter) -> ApiResult<String> {
        let tests = self.mechanical_repo.list_all(filter)?;
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(MECHANICAL_CSV_HEADER).map_err(csv_error)?;
        for test in &tests {
            writer.write_record(mechanical_row(test)).map_err(csv_error)?;
        }
        tracing::info!(rows = tests.len(), "mechanical CSV exported");
        finish(writer)
    }

    fn chemical_row(&self, a: &ChemicalAnalysis) -> Vec<String> {
        let furnace = a
            .furnace_id
            .and_then(|id| self.reference.furnace(id))
            .map(|f| f.furnace_code.clone())
            .unwrap_or_default();

        let mut row = vec![
            a.test_date.to_string(),
            furnace,
            a.ladle_no.to_string(),
            a.ladle_id.clone(),
        ];
        row.extend(a.values_by_code().into_iter().map(|(_, v)| num(v)));
        row.extend([
            text(&a.decision),
            text(&a.reason),
            a.has_defect.to_string(),
            text(&a.defect_reason),
            text(&a.notes),
        ]);
        row
    }
}

fn mechanical_row(t: &MechanicalTest) -> Vec<String> {
    let m = &t.measurements;
    let d = &t.derived;
    vec![
        t.test_date.to_string(),
        text(&t.test_number),
        num(t.diameter),
        text(&t.pipe_no),
        text(&t.ladle_id),
        num(m.d1),
        num(m.d2),
        num(m.d3),
        num(d.avg_dimension),
        num(m.original_length),
        num(m.final_length),
        num(d.elongation),
        num(m.area_d_squared),
        num(m.force_kgf),
        num(d.tensile_strength),
        num(t.structure.nodularity_percent),
        num(t.structure.nodule_count),
        num(t.structure.hardness),
        text(&t.decision),
        text(&t.comments),
    ]
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn resolve_range(
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    default_days: i64,
) -> ApiResult<(NaiveDate, NaiveDate)> {
    let date_to = date_to.unwrap_or_else(today);
    let date_from = date_from.unwrap_or(date_to - Duration::days(default_days));
    if date_from > date_to {
        return Err(ApiError::InvalidInput(format!(
            "date_from {} is after date_to {}",
            date_from, date_to
        )));
    }
    Ok((date_from, date_to))
}

fn num<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn csv_error(err: csv::Error) -> ApiError {
    ApiError::InternalError(format!("CSV write failed: {}", err))
}

fn finish(writer: csv::Writer<Vec<u8>>) -> ApiResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::InternalError(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::InternalError(e.to_string()))
}
