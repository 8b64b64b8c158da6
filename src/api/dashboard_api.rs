// ==========================================
// Foundry QC Tracker - dashboard API
// ==========================================
// Today / window counts, breakdowns, latest records.
// ==========================================

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};

use crate::api::error::ApiResult;
use crate::config::ConfigManager;
use crate::domain::dashboard::{acceptance_rate, DashboardStats};
use crate::repository::{ChemicalAnalysisRepository, DashboardRepository, PipeRepository};

/// Rows shown in the "recent" lists
pub const RECENT_LIMIT: usize = 5;

pub struct DashboardApi {
    dashboard_repo: Arc<DashboardRepository>,
    chemical_repo: Arc<ChemicalAnalysisRepository>,
    pipe_repo: Arc<PipeRepository>,
    config: Arc<ConfigManager>,
}

impl DashboardApi {
    pub fn new(
        dashboard_repo: Arc<DashboardRepository>,
        chemical_repo: Arc<ChemicalAnalysisRepository>,
        pipe_repo: Arc<PipeRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            dashboard_repo,
            chemical_repo,
            pipe_repo,
            config,
        }
    }

    /// Statistics as of a day (default today)
    pub fn stats(&self, as_of: Option<NaiveDate>) -> ApiResult<DashboardStats> {
        let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
        let window_days = self.config.get_dashboard_window_days()?;
        let window_start = as_of - Duration::days(i64::from(window_days));

        let counts = self.dashboard_repo.counts(as_of, window_start)?;
        let recent_analyses = self.chemical_repo.recent(RECENT_LIMIT)?;
        let recent_pipes = self.pipe_repo.recent(RECENT_LIMIT)?;

        tracing::debug!(%as_of, window_days, "dashboard computed");
        Ok(DashboardStats {
            as_of,
            window_days,
            analyses_today: counts.analyses_today,
            analyses_in_window: counts.analyses_in_window,
            defective_analyses_in_window: counts.defective_analyses_in_window,
            acceptance_rate: acceptance_rate(counts.accepted_in_window, counts.decided_in_window),
            pipes_today: counts.pipes_today,
            pipes_in_window: counts.pipes_in_window,
            mechanical_tests_today: counts.mechanical_tests_today,
            mechanical_tests_in_window: counts.mechanical_tests_in_window,
            by_furnace: counts.by_furnace,
            by_decision: counts.by_decision,
            recent_analyses,
            recent_pipes,
        })
    }
}
