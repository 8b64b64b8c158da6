// ==========================================
// API integration test environment
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use foundry_qc::app::AppState;
use foundry_qc::domain::chemical::ChemicalAnalysis;
use foundry_qc::domain::pipe::Pipe;
use foundry_qc::domain::types::{Actor, Role};

use super::test_data_builder::{good_readings, ChemicalDraftBuilder, PipeBuilder};

/// Fully wired services over a temporary database file
pub struct ApiTestEnv {
    pub db_path: String,
    pub state: Arc<AppState>,

    // keeps the database file alive
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, String> {
        foundry_qc::logging::init_test();
        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("failed to create test database: {}", e))?;
        let state = AppState::new(&db_path, "en")
            .map_err(|e| format!("failed to build AppState: {}", e))?;

        Ok(Self {
            db_path,
            state: Arc::new(state),
            _temp_file: temp_file,
        })
    }

    /// First seeded furnace
    pub fn furnace_id(&self) -> i64 {
        self.state.reference.furnaces[0].id
    }

    /// First seeded machine whose stage is `stage`
    pub fn machine_id(&self, stage: &str) -> i64 {
        self.state
            .reference
            .machines
            .iter()
            .find(|m| m.stage.as_deref() == Some(stage))
            .map(|m| m.id)
            .expect("seeded machine for stage")
    }

    /// Seeded defect type by English name
    pub fn defect_type_id(&self, name_en: &str) -> i64 {
        self.state
            .reference
            .defect_types
            .iter()
            .find(|d| d.defect_name_en.as_deref() == Some(name_en))
            .map(|d| d.id)
            .expect("seeded defect type")
    }

    /// In-spec analysis for a date and ladle number
    pub fn create_analysis(&self, test_date: NaiveDate, ladle_no: i32) -> ChemicalAnalysis {
        let draft = ChemicalDraftBuilder::new(test_date)
            .ladle_no(ladle_no)
            .furnace(self.furnace_id())
            .readings(good_readings())
            .build();
        self.state
            .chemical_api
            .create(&draft, &operator(), "en")
            .expect("create analysis")
            .analysis
    }

    pub fn create_pipe(&self, no_code: &str, ladle_id: &str, production_date: NaiveDate) -> Pipe {
        let input = PipeBuilder::new(no_code)
            .ladle(ladle_id)
            .date(production_date)
            .build();
        self.state
            .pipe_api
            .create(&input, &operator())
            .expect("create pipe")
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn viewer() -> Actor {
    Actor::new("visitor", Role::Viewer)
}

pub fn operator() -> Actor {
    Actor::new("lab.operator", Role::Operator)
}

pub fn supervisor() -> Actor {
    Actor::new("qc.supervisor", Role::Supervisor)
}

pub fn admin() -> Actor {
    Actor::new("admin", Role::Admin)
}
