// ==========================================
// Foundry QC Tracker - reference data API
// ==========================================

use std::sync::Arc;

use serde::Serialize;

use crate::api::stage_api::{StageApi, StageVocabulary};
use crate::domain::reference::ReferenceData;

/// Lookup tables plus the per-stage vocabularies, for form dropdowns
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceView {
    #[serde(flatten)]
    pub data: ReferenceData,
    pub stages: Vec<StageVocabulary>,
}

pub struct ReferenceApi {
    reference: Arc<ReferenceData>,
}

impl ReferenceApi {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    pub fn view(&self) -> ReferenceView {
        ReferenceView {
            data: self.reference.as_ref().clone(),
            stages: StageApi::vocabularies(),
        }
    }
}
