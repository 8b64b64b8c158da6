// ==========================================
// Foundry QC Tracker - application state
// ==========================================
// One shared connection, repositories over it, API services over those.
// Reference data is loaded once and shared read-only.
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{
    ChemicalApi, ConfigApi, DashboardApi, MechanicalApi, PipeApi, ProductionOrderApi,
    ReferenceApi, ReportApi, StageApi, StickerApi,
};
use crate::config::ConfigManager;
use crate::db;
use crate::domain::reference::ReferenceData;
use crate::i18n;
use crate::repository::{
    ChemicalAnalysisRepository, DashboardRepository, MechanicalTestRepository, PipeRepository,
    ProductionOrderRepository, ReferenceRepository, RepositoryResult,
};

pub struct AppState {
    pub db_path: String,
    pub default_locale: &'static str,
    pub reference: Arc<ReferenceData>,

    pub chemical_api: Arc<ChemicalApi>,
    pub pipe_api: Arc<PipeApi>,
    pub stage_api: Arc<StageApi>,
    pub mechanical_api: Arc<MechanicalApi>,
    pub sticker_api: Arc<StickerApi>,
    pub production_order_api: Arc<ProductionOrderApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub report_api: Arc<ReportApi>,
    pub reference_api: Arc<ReferenceApi>,
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// Open (creating if needed) the database at `db_path` and wire every service
    ///
    /// # Arguments
    /// - db_path: SQLite file path
    /// - default_locale: locale used when a request names none
    pub fn new(db_path: &str, default_locale: &str) -> RepositoryResult<Self> {
        tracing::info!(db_path, "initialising application state");
        let conn = db::open_and_prepare(db_path)?;
        Self::from_connection(db_path, Arc::new(Mutex::new(conn)), default_locale)
    }

    /// Wire services over a connection that already has the schema
    pub fn from_connection(
        db_path: &str,
        conn: Arc<Mutex<Connection>>,
        default_locale: &str,
    ) -> RepositoryResult<Self> {
        let reference = Arc::new(ReferenceRepository::new(conn.clone()).load_all()?);
        let config = Arc::new(ConfigManager::from_connection(conn.clone()));

        let chemical_repo = Arc::new(ChemicalAnalysisRepository::new(conn.clone()));
        let pipe_repo = Arc::new(PipeRepository::new(conn.clone()));
        let mechanical_repo = Arc::new(MechanicalTestRepository::new(conn.clone()));
        let order_repo = Arc::new(ProductionOrderRepository::new(conn.clone()));
        let dashboard_repo = Arc::new(DashboardRepository::new(conn));

        let sticker_api = Arc::new(StickerApi::new(pipe_repo.clone(), chemical_repo.clone()));

        let state = Self {
            db_path: db_path.to_string(),
            default_locale: i18n::resolve_locale(default_locale),
            chemical_api: Arc::new(ChemicalApi::new(
                chemical_repo.clone(),
                reference.clone(),
                config.clone(),
            )),
            pipe_api: Arc::new(PipeApi::new(
                pipe_repo.clone(),
                chemical_repo.clone(),
                order_repo.clone(),
                reference.clone(),
                config.clone(),
            )),
            stage_api: Arc::new(StageApi::new(pipe_repo.clone(), reference.clone())),
            mechanical_api: Arc::new(MechanicalApi::new(
                mechanical_repo.clone(),
                chemical_repo.clone(),
                reference.clone(),
                config.clone(),
            )),
            production_order_api: Arc::new(ProductionOrderApi::new(
                order_repo,
                pipe_repo.clone(),
                sticker_api.clone(),
                config.clone(),
            )),
            sticker_api,
            dashboard_api: Arc::new(DashboardApi::new(
                dashboard_repo,
                chemical_repo.clone(),
                pipe_repo.clone(),
                config.clone(),
            )),
            report_api: Arc::new(ReportApi::new(
                chemical_repo,
                pipe_repo,
                mechanical_repo,
                reference.clone(),
            )),
            reference_api: Arc::new(ReferenceApi::new(reference.clone())),
            config_api: Arc::new(ConfigApi::new(config)),
            reference,
        };

        tracing::info!(
            furnaces = state.reference.furnaces.len(),
            specifications = state.reference.element_specifications.len(),
            locale = state.default_locale,
            "application state ready"
        );
        Ok(state)
    }
}
