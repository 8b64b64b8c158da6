// ==========================================
// Foundry QC Tracker - mechanical test API
// ==========================================
// Derived values (average dimension, elongation, tensile strength)
// are recomputed from the measurements on every save.
// Auto-decision judges unsaved input against the mechanical rules.
// ==========================================

use std::sync::Arc;

use chrono::Local;

use crate::api::access::require;
use crate::api::chemical_api::non_blank;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::mechanical::{
    MechanicalFilter, MechanicalProperties, MechanicalTest, MechanicalTestDraft,
};
use crate::domain::reference::ReferenceData;
use crate::domain::types::{Actor, Capability, Page, PageRequest};
use crate::engine::mechanical::{self, MechanicalDecision};
use crate::repository::{ChemicalAnalysisRepository, MechanicalTestRepository};

pub struct MechanicalApi {
    repo: Arc<MechanicalTestRepository>,
    chemical_repo: Arc<ChemicalAnalysisRepository>,
    reference: Arc<ReferenceData>,
    config: Arc<ConfigManager>,
}

impl MechanicalApi {
    pub fn new(
        repo: Arc<MechanicalTestRepository>,
        chemical_repo: Arc<ChemicalAnalysisRepository>,
        reference: Arc<ReferenceData>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            repo,
            chemical_repo,
            reference,
            config,
        }
    }

    /// Suggested decision for an unsaved test form
    ///
    /// # Returns
    /// - the worst decision across the judged properties and the properties causing it;
    ///   no recommendation when nothing could be judged
    pub fn auto_decision(&self, draft: &MechanicalTestDraft) -> MechanicalDecision {
        let derived = mechanical::derive(&draft.measurements);
        let properties = MechanicalProperties::from_results(&derived, &draft.structure);
        self.judge(&properties)
    }

    /// Suggested decision for property values entered directly
    pub fn judge(&self, properties: &MechanicalProperties) -> MechanicalDecision {
        mechanical::calculate_auto_decision(properties, &self.reference)
    }

    /// Record a test; test_date is required
    pub fn create(&self, draft: &MechanicalTestDraft, actor: &Actor) -> ApiResult<MechanicalTest> {
        require(actor, Capability::Edit)?;
        let test_date = draft
            .test_date
            .ok_or_else(|| ApiError::InvalidInput("test_date is required".to_string()))?;
        let ladle_id = self.checked_ladle(&draft.ladle_id)?;

        let mut test = MechanicalTest {
            id: 0,
            test_date,
            test_number: None,
            diameter: None,
            code: None,
            pipe_no: None,
            ladle_id,
            measurements: draft.measurements,
            derived: mechanical::derive(&draft.measurements),
            structure: draft.structure.clone(),
            shift: None,
            tester_name: None,
            decision: None,
            reason: None,
            has_defect: false,
            defect_reason: None,
            comments: None,
            created_at: Local::now().naive_local(),
            created_by: Some(actor.name.clone()),
        };
        apply_form_fields(&mut test, draft);

        test.id = self.repo.insert(&test)?;
        tracing::info!(
            id = test.id,
            ladle_id = ?test.ladle_id,
            actor = %actor.name,
            "mechanical test created"
        );
        Ok(test)
    }

    /// Overwrite a test; an absent test_date keeps the stored one
    pub fn update(
        &self,
        id: i64,
        draft: &MechanicalTestDraft,
        actor: &Actor,
    ) -> ApiResult<MechanicalTest> {
        require(actor, Capability::Edit)?;
        let mut test = self.get(id)?;

        test.ladle_id = self.checked_ladle(&draft.ladle_id)?;
        if let Some(date) = draft.test_date {
            test.test_date = date;
        }
        test.measurements = draft.measurements;
        test.derived = mechanical::derive(&draft.measurements);
        test.structure = draft.structure.clone();
        apply_form_fields(&mut test, draft);

        self.repo.update(&test)?;
        tracing::info!(id, actor = %actor.name, "mechanical test updated");
        Ok(test)
    }

    pub fn get(&self, id: i64) -> ApiResult<MechanicalTest> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("mechanical test {}", id)))
    }

    pub fn list(
        &self,
        filter: &MechanicalFilter,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> ApiResult<Page<MechanicalTest>> {
        let per_page = match per_page {
            Some(n) => n,
            None => self.config.get_page_size()?,
        };
        Ok(self
            .repo
            .list(filter, PageRequest::new(page.unwrap_or(1), per_page))?)
    }

    pub fn delete(&self, id: i64, actor: &Actor) -> ApiResult<()> {
        require(actor, Capability::Approve)?;
        self.repo.delete(id)?;
        tracing::info!(id, actor = %actor.name, "mechanical test deleted");
        Ok(())
    }

    fn checked_ladle(&self, ladle_id: &Option<String>) -> ApiResult<Option<String>> {
        let ladle_id = non_blank(ladle_id);
        if let Some(id) = &ladle_id {
            if !self.chemical_repo.exists_ladle_id(id)? {
                return Err(ApiError::InvalidInput(format!("unknown ladle {}", id)));
            }
        }
        Ok(ladle_id)
    }
}

fn apply_form_fields(test: &mut MechanicalTest, draft: &MechanicalTestDraft) {
    test.test_number = non_blank(&draft.test_number);
    test.diameter = draft.diameter;
    test.code = non_blank(&draft.code);
    test.pipe_no = non_blank(&draft.pipe_no);
    test.shift = draft.shift;
    test.tester_name = non_blank(&draft.tester_name);
    test.decision = non_blank(&draft.decision);
    test.reason = non_blank(&draft.reason);
    test.has_defect = draft.has_defect;
    test.defect_reason = non_blank(&draft.defect_reason);
    test.comments = non_blank(&draft.comments);
}
