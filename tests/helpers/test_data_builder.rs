// ==========================================
// Test data builders
// ==========================================

use chrono::NaiveDate;

use foundry_qc::domain::chemical::{ChemicalAnalysisDraft, ElementReadings};
use foundry_qc::domain::mechanical::{MechanicalTestDraft, SampleMeasurements};
use foundry_qc::domain::pipe::{NewPipe, StageUpdate};

/// Every reading and equivalent inside the seeded specification
pub fn good_readings() -> ElementReadings {
    ElementReadings {
        carbon: Some(3.5),
        silicon: Some(2.2),
        magnesium: Some(0.045),
        copper: Some(0.02),
        chromium: Some(0.03),
        sulfur: Some(0.01),
        manganese: Some(0.3),
        phosphorus: Some(0.03),
        lead: Some(0.001),
        aluminum: Some(0.01),
    }
}

/// Carbon below minimum, which also drags CE below its minimum
pub fn low_carbon_readings() -> ElementReadings {
    ElementReadings {
        carbon: Some(2.5),
        ..good_readings()
    }
}

// ==========================================
// ChemicalDraftBuilder
// ==========================================
pub struct ChemicalDraftBuilder {
    draft: ChemicalAnalysisDraft,
}

impl ChemicalDraftBuilder {
    pub fn new(test_date: NaiveDate) -> Self {
        Self {
            draft: ChemicalAnalysisDraft {
                test_date: Some(test_date),
                ..Default::default()
            },
        }
    }

    pub fn ladle_no(mut self, n: i32) -> Self {
        self.draft.ladle_no = Some(n);
        self
    }

    pub fn furnace(mut self, id: i64) -> Self {
        self.draft.furnace_id = Some(id);
        self
    }

    pub fn readings(mut self, readings: ElementReadings) -> Self {
        self.draft.readings = readings;
        self
    }

    pub fn decision(mut self, decision: &str) -> Self {
        self.draft.decision = Some(decision.to_string());
        self
    }

    pub fn build(self) -> ChemicalAnalysisDraft {
        self.draft
    }
}

// ==========================================
// PipeBuilder
// ==========================================
pub struct PipeBuilder {
    pipe: NewPipe,
}

impl PipeBuilder {
    pub fn new(no_code: &str) -> Self {
        Self {
            pipe: NewPipe {
                no_code: no_code.to_string(),
                shift: Some(1),
                diameter: Some(500),
                pipe_type: Some("K9".to_string()),
                iso_weight: Some(420.0),
                ..Default::default()
            },
        }
    }

    pub fn ladle(mut self, ladle_id: &str) -> Self {
        self.pipe.ladle_id = Some(ladle_id.to_string());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.pipe.production_date = Some(date);
        self
    }

    pub fn shift(mut self, shift: i32) -> Self {
        self.pipe.shift = Some(shift);
        self
    }

    pub fn diameter(mut self, diameter: i32) -> Self {
        self.pipe.diameter = Some(diameter);
        self
    }

    pub fn order(mut self, production_order_id: i64) -> Self {
        self.pipe.production_order_id = Some(production_order_id);
        self
    }

    pub fn build(self) -> NewPipe {
        self.pipe
    }
}

/// Stage input with only a decision
pub fn stage_decision(decision: &str) -> StageUpdate {
    StageUpdate {
        decision: Some(decision.to_string()),
        ..Default::default()
    }
}

// ==========================================
// Mechanical drafts
// ==========================================

/// Lo 50 -> Lf 55 (10 %), F 4200 over A 100 (42 kgf/mm2)
pub fn tensile_draft(test_date: NaiveDate, ladle_id: Option<&str>) -> MechanicalTestDraft {
    MechanicalTestDraft {
        test_date: Some(test_date),
        test_number: Some("T-1".to_string()),
        diameter: Some(500),
        ladle_id: ladle_id.map(str::to_string),
        measurements: SampleMeasurements {
            d1: Some(6.0),
            d2: Some(6.2),
            d3: Some(6.4),
            original_length: Some(50.0),
            final_length: Some(55.0),
            area_d_squared: Some(100.0),
            force_kgf: Some(4200.0),
            ..Default::default()
        },
        decision: Some("ACCEPT".to_string()),
        ..Default::default()
    }
}
