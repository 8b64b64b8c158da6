// ==========================================
// Foundry QC Tracker - stage API
// ==========================================
// Upsert / delete of one stage row per pipe, with history.
// Decisions and defects must come from the stage vocabulary.
// ==========================================

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::api::access::require;
use crate::api::chemical_api::non_blank;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::pipe::{HistoryAction, PipeStage, StageHistoryEntry, StageUpdate};
use crate::domain::reference::ReferenceData;
use crate::domain::types::{Actor, Capability, Stage};
use crate::engine::stage_rules::{self, Term};
use crate::repository::PipeRepository;

/// Vocabulary of one stage, for form dropdowns
#[derive(Debug, Clone, Serialize)]
pub struct StageVocabulary {
    pub stage: Stage,
    pub decisions: &'static [Term],
    pub defects: &'static [Term],
    pub measurement_type: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedStage {
    pub stage: PipeStage,
    pub action: HistoryAction,
}

pub struct StageApi {
    pipe_repo: Arc<PipeRepository>,
    reference: Arc<ReferenceData>,
}

impl StageApi {
    pub fn new(pipe_repo: Arc<PipeRepository>, reference: Arc<ReferenceData>) -> Self {
        Self {
            pipe_repo,
            reference,
        }
    }

    pub fn parse_stage(name: &str) -> ApiResult<Stage> {
        Stage::parse(name.trim())
            .ok_or_else(|| ApiError::InvalidInput(format!("unknown stage '{}'", name)))
    }

    pub fn vocabularies() -> Vec<StageVocabulary> {
        Stage::ALL
            .iter()
            .map(|stage| StageVocabulary {
                stage: *stage,
                decisions: stage_rules::decisions(*stage),
                defects: stage_rules::defects(*stage),
                measurement_type: stage_rules::measurement_type(*stage),
            })
            .collect()
    }

    /// Create or overwrite the stage row of a pipe
    ///
    /// # Arguments
    /// - stage_name: one of the eight stage names (case-insensitive)
    /// - update: form input; decision / defect_type may be the English code or Arabic label
    /// - actor: needs Edit
    ///
    /// # Returns
    /// - stored row, decision and defect normalised to the English code
    pub fn save(
        &self,
        pipe_id: i64,
        stage_name: &str,
        update: &StageUpdate,
        actor: &Actor,
    ) -> ApiResult<SavedStage> {
        require(actor, Capability::Edit)?;
        let stage = Self::parse_stage(stage_name)?;

        if self.pipe_repo.find_by_id(pipe_id)?.is_none() {
            return Err(ApiError::NotFound(format!("pipe {}", pipe_id)));
        }

        let decision = match non_blank(&update.decision) {
            Some(raw) => Some(
                stage_rules::normalize_decision(stage, &raw)
                    .ok_or_else(|| {
                        ApiError::InvalidInput(format!(
                            "decision '{}' is not allowed at stage {}",
                            raw, stage
                        ))
                    })?
                    .to_string(),
            ),
            None => None,
        };
        let defect_type = match non_blank(&update.defect_type) {
            Some(raw) => Some(
                stage_rules::normalize_defect(stage, &raw)
                    .ok_or_else(|| {
                        ApiError::InvalidInput(format!(
                            "defect '{}' is not defined for stage {}",
                            raw, stage
                        ))
                    })?
                    .to_string(),
            ),
            None => None,
        };

        if let Some(id) = update.defect_type_id {
            let known = self
                .reference
                .defect_type(id)
                .map(|d| d.applies_to(stage.as_str()))
                .unwrap_or(false);
            if !known {
                return Err(ApiError::InvalidInput(format!(
                    "defect type {} does not apply to stage {}",
                    id, stage
                )));
            }
        }
        if let Some(id) = update.machine_id {
            if self.reference.machine(id).is_none() {
                return Err(ApiError::InvalidInput(format!("unknown machine {}", id)));
            }
        }

        let measurement_type = stage_rules::measurement_type(stage);
        let measurement_value = measurement_type.and(update.measurement_value);
        let has_defect =
            update.has_defect || defect_type.is_some() || update.defect_type_id.is_some();

        let now = Local::now().naive_local();
        let record = PipeStage {
            id: 0,
            pipe_id,
            stage,
            stage_date: Some(update.stage_date.unwrap_or_else(|| now.date())),
            decision,
            reason: non_blank(&update.reason),
            has_defect,
            defect_type_id: update.defect_type_id,
            defect_type,
            defect_reason: non_blank(&update.defect_reason),
            machine_id: update.machine_id,
            measurement_type: measurement_type.map(str::to_string),
            measurement_value,
            notes: non_blank(&update.notes),
            created_at: now,
            updated_at: now,
            updated_by: Some(actor.name.clone()),
        };

        let (stage_row, action) = self.pipe_repo.upsert_stage(&record)?;
        tracing::info!(
            pipe_id,
            stage = %stage,
            action = action.as_str(),
            actor = %actor.name,
            "stage saved"
        );
        Ok(SavedStage {
            stage: stage_row,
            action,
        })
    }

    /// Remove a stage row; the history keeps a DELETE snapshot
    pub fn delete(&self, pipe_id: i64, stage_name: &str, actor: &Actor) -> ApiResult<PipeStage> {
        require(actor, Capability::Approve)?;
        let stage = Self::parse_stage(stage_name)?;
        let removed = self.pipe_repo.delete_stage(
            pipe_id,
            stage,
            Local::now().naive_local(),
            Some(&actor.name),
        )?;
        tracing::info!(pipe_id, stage = %stage, actor = %actor.name, "stage deleted");
        Ok(removed)
    }

    /// Change history of a pipe, newest first
    pub fn history(&self, pipe_id: i64) -> ApiResult<Vec<StageHistoryEntry>> {
        if self.pipe_repo.find_by_id(pipe_id)?.is_none() {
            return Err(ApiError::NotFound(format!("pipe {}", pipe_id)));
        }
        Ok(self.pipe_repo.list_history(pipe_id)?)
    }
}
