// ==========================================
// Foundry QC Tracker - chemical analysis API
// ==========================================
// Create / edit / list analyses, live validation, ladle lookup.
// Out-of-spec readings are stored and flagged, never rejected.
// ==========================================

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::api::access::require;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::chemical::{
    ChemicalAnalysis, ChemicalAnalysisDraft, ChemicalFilter, ElementReadings, Equivalents,
};
use crate::domain::reference::ReferenceData;
use crate::domain::types::{Actor, Capability, Page, PageRequest};
use crate::engine::element_validator::{validate_analysis, AnalysisValidation, ValidationOutcome};
use crate::engine::{equivalents, next_ladle_number, DecodedLadleId, LadleCodecError};
use crate::i18n;
use crate::repository::ChemicalAnalysisRepository;

// ==========================================
// Response types
// ==========================================

/// Validation result with messages in the requested locale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub equivalents: Equivalents,
    pub validation: AnalysisValidation,
    pub failures: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoDecision {
    pub decision: String,
    pub reason: String,
    pub has_defect: bool,
    pub failed_elements: Vec<String>,
}

/// Stored analysis plus the inline warnings shown after saving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAnalysis {
    pub analysis: ChemicalAnalysis,
    pub failures: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadleLookup {
    pub ladle_id: String,
    pub decoded: Option<DecodedLadleId>,
    pub valid: bool,
    pub analysis: Option<ChemicalAnalysis>,
}

// ==========================================
// ChemicalApi
// ==========================================
pub struct ChemicalApi {
    repo: Arc<ChemicalAnalysisRepository>,
    reference: Arc<ReferenceData>,
    config: Arc<ConfigManager>,
}

impl ChemicalApi {
    pub fn new(
        repo: Arc<ChemicalAnalysisRepository>,
        reference: Arc<ReferenceData>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            repo,
            reference,
            config,
        }
    }

    /// Next ladle number for a test date (numbers restart every day)
    pub fn next_ladle_no(&self, test_date: NaiveDate) -> ApiResult<i32> {
        let max = self.repo.max_ladle_no_for_date(test_date)?;
        Ok(next_ladle_number(max))
    }

    /// Equivalents and range checks for unsaved readings
    pub fn validate(&self, readings: &ElementReadings, locale: &str) -> ValidationReport {
        let equivalents = equivalents::compute(readings);
        let mut values = readings.by_code();
        values.extend(equivalents.by_code());
        self.report(&values, equivalents, locale)
    }

    /// Suggested decision for unsaved readings
    pub fn auto_decision(&self, readings: &ElementReadings, locale: &str) -> AutoDecision {
        let report = self.validate(readings, locale);
        let reason = if report.validation.has_defect {
            report.failures.join("; ")
        } else {
            i18n::t_in(locale, "validation.all_within_spec")
        };
        AutoDecision {
            decision: report.validation.suggested_decision.clone(),
            reason,
            has_defect: report.validation.has_defect,
            failed_elements: report
                .validation
                .failed_codes()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Create an analysis
    ///
    /// # Arguments
    /// - draft: form input; test_date is required, ladle_no defaults to the next free number
    /// - actor: needs Edit
    /// - locale: language of the returned warnings
    ///
    /// # Returns
    /// - stored analysis with inline warnings
    /// - BusinessRuleViolation when the ladle_id already exists
    pub fn create(
        &self,
        draft: &ChemicalAnalysisDraft,
        actor: &Actor,
        locale: &str,
    ) -> ApiResult<SavedAnalysis> {
        require(actor, Capability::Edit)?;

        let test_date = draft
            .test_date
            .ok_or_else(|| ApiError::InvalidInput("test_date is required".to_string()))?;
        self.check_furnace(draft.furnace_id)?;

        let ladle_no = match draft.ladle_no {
            Some(n) if n < 1 => {
                return Err(ApiError::InvalidInput(format!(
                    "ladle_no must be at least 1, got {}",
                    n
                )))
            }
            Some(n) => n,
            None => self.next_ladle_no(test_date)?,
        };

        let codec = self.config.ladle_codec()?;
        let ladle_id = codec
            .encode(ladle_no as u32, test_date)
            .map_err(|e: LadleCodecError| ApiError::InvalidInput(e.to_string()))?;
        if self.repo.exists_ladle_id(&ladle_id)? {
            return Err(ApiError::BusinessRuleViolation(format!(
                "ladle {} already recorded",
                ladle_id
            )));
        }

        let mut analysis = ChemicalAnalysis {
            id: 0,
            test_date,
            furnace_id: draft.furnace_id,
            ladle_no,
            day: test_date.day(),
            month: test_date.month(),
            year: test_date.year(),
            ladle_id,
            readings: draft.readings,
            equivalents: Equivalents::default(),
            engineer_notes: non_blank(&draft.engineer_notes),
            decision: non_blank(&draft.decision),
            reason: non_blank(&draft.reason),
            has_defect: false,
            defect_reason: None,
            notes: non_blank(&draft.notes),
            created_at: Local::now().naive_local(),
            created_by: Some(actor.name.clone()),
        };
        let report = self.apply_validation(&mut analysis, locale);

        let id = self.repo.insert(&analysis)?;
        analysis.id = id;

        tracing::info!(
            id,
            ladle_id = %analysis.ladle_id,
            actor = %actor.name,
            has_defect = analysis.has_defect,
            "chemical analysis created"
        );
        Ok(SavedAnalysis {
            analysis,
            failures: report.failures,
            warnings: report.warnings,
        })
    }

    /// Edit readings and QC fields; the ladle identity is fixed after creation
    pub fn update(
        &self,
        id: i64,
        draft: &ChemicalAnalysisDraft,
        actor: &Actor,
        locale: &str,
    ) -> ApiResult<SavedAnalysis> {
        require(actor, Capability::Edit)?;
        self.check_furnace(draft.furnace_id)?;

        let mut analysis = self.get(id)?;
        analysis.furnace_id = draft.furnace_id;
        analysis.readings = draft.readings;
        analysis.engineer_notes = non_blank(&draft.engineer_notes);
        analysis.decision = non_blank(&draft.decision);
        analysis.reason = non_blank(&draft.reason);
        analysis.notes = non_blank(&draft.notes);
        let report = self.apply_validation(&mut analysis, locale);

        self.repo.update(&analysis)?;
        tracing::info!(id, actor = %actor.name, "chemical analysis updated");
        Ok(SavedAnalysis {
            analysis,
            failures: report.failures,
            warnings: report.warnings,
        })
    }

    pub fn get(&self, id: i64) -> ApiResult<ChemicalAnalysis> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("chemical analysis {}", id)))
    }

    pub fn list(
        &self,
        filter: &ChemicalFilter,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> ApiResult<Page<ChemicalAnalysis>> {
        let per_page = match per_page {
            Some(n) => n,
            None => self.config.get_page_size()?,
        };
        let request = PageRequest::new(page.unwrap_or(1), per_page);
        Ok(self.repo.list(filter, request)?)
    }

    /// Delete; refused while pipes or mechanical tests reference the ladle
    pub fn delete(&self, id: i64, actor: &Actor) -> ApiResult<()> {
        require(actor, Capability::Approve)?;
        self.repo.delete(id)?;
        tracing::info!(id, actor = %actor.name, "chemical analysis deleted");
        Ok(())
    }

    /// Decode a ladle identifier and find its analysis
    ///
    /// Malformed identifiers yield `decoded: None`, not an error.
    pub fn lookup_ladle(&self, ladle_id: &str) -> ApiResult<LadleLookup> {
        let ladle_id = ladle_id.trim();
        let codec = self.config.ladle_codec()?;
        let decoded = codec.decode(ladle_id);
        let valid = decoded.map(|d| d.is_plausible()).unwrap_or(false);
        let analysis = self.repo.find_by_ladle_id(ladle_id)?;
        Ok(LadleLookup {
            ladle_id: ladle_id.to_string(),
            decoded,
            valid,
            analysis,
        })
    }

    // ==========================================
    // internals
    // ==========================================

    fn check_furnace(&self, furnace_id: Option<i64>) -> ApiResult<()> {
        match furnace_id {
            Some(id) if self.reference.furnace(id).is_none() => {
                Err(ApiError::InvalidInput(format!("unknown furnace {}", id)))
            }
            _ => Ok(()),
        }
    }

    /// Recompute equivalents and defect flags on the analysis
    fn apply_validation(&self, analysis: &mut ChemicalAnalysis, locale: &str) -> ValidationReport {
        analysis.equivalents = equivalents::compute(&analysis.readings);
        let report = self.report(&analysis.values_by_code(), analysis.equivalents, locale);
        analysis.has_defect = report.validation.has_defect;
        analysis.defect_reason = if analysis.has_defect {
            Some(report.validation.failures.join("; "))
        } else {
            None
        };
        report
    }

    fn report(
        &self,
        values: &[(&str, Option<f64>)],
        equivalents: Equivalents,
        locale: &str,
    ) -> ValidationReport {
        let validation = validate_analysis(values, &self.reference.element_specifications);

        let failures = validation
            .checks
            .iter()
            .filter_map(|check| localized_failure(locale, &check.element_code, &check.outcome))
            .collect();
        let warnings = values
            .iter()
            .filter(|(code, value)| value.is_some() && validation.check(code).is_none())
            .map(|(code, _)| {
                i18n::t_with_args_in(locale, "validation.no_specification", &[("code", *code)])
            })
            .collect();

        ValidationReport {
            equivalents,
            validation,
            failures,
            warnings,
        }
    }
}

fn localized_failure(locale: &str, code: &str, outcome: &ValidationOutcome) -> Option<String> {
    let (key, value, bound_name, bound) = match outcome {
        ValidationOutcome::Below { value, min } => ("validation.below_minimum", value, "min", min),
        ValidationOutcome::Above { value, max } => ("validation.above_maximum", value, "max", max),
        _ => return None,
    };
    let value = value.to_string();
    let bound = bound.to_string();
    Some(i18n::t_with_args_in(
        locale,
        key,
        &[("code", code), ("value", value.as_str()), (bound_name, bound.as_str())],
    ))
}

/// Trimmed text, None when blank
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
