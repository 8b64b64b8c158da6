// ==========================================
// Foundry QC Tracker - element value validator
// ==========================================
// Checks chemical readings against specification ranges.
// Out-of-spec readings are flagged, never rejected.
// ==========================================
// Input: reading + optional min/max
// Output: ValidationOutcome per reading, AnalysisValidation per analysis
// ==========================================

use crate::domain::reference::ElementSpecification;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

pub const DECISION_ACCEPT: &str = "ACCEPT";
pub const DECISION_REJECT: &str = "REJECT";
pub const ACCEPT_REASON: &str = "All elements within specification";

// ==========================================
// ValidationOutcome - result for a single reading
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationOutcome {
    /// No reading entered
    Empty,
    /// Within bounds
    Ok,
    Below { value: f64, min: f64 },
    Above { value: f64, max: f64 },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Empty | ValidationOutcome::Ok)
    }

    /// Message naming the violated bound, None for valid outcomes
    pub fn message(&self) -> Option<String> {
        match self {
            ValidationOutcome::Below { value, min } => {
                Some(format!("{} < {} (below minimum)", value, min))
            }
            ValidationOutcome::Above { value, max } => {
                Some(format!("{} > {} (above maximum)", value, max))
            }
            _ => None,
        }
    }
}

/// Validate one reading; the minimum is checked before the maximum
///
/// # Arguments
/// - value: reading, None when not entered
/// - min / max: bounds, None means unconstrained on that side
pub fn validate(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> ValidationOutcome {
    let value = match value {
        Some(v) => v,
        None => return ValidationOutcome::Empty,
    };

    if let Some(min) = min {
        if value < min {
            return ValidationOutcome::Below { value, min };
        }
    }
    if let Some(max) = max {
        if value > max {
            return ValidationOutcome::Above { value, max };
        }
    }
    ValidationOutcome::Ok
}

// ==========================================
// ElementCheck / AnalysisValidation - whole-analysis result
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementCheck {
    pub element_code: String,
    pub value: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub outcome: ValidationOutcome,
}

impl ElementCheck {
    /// "C: 2.5 < 3 (below minimum)"
    pub fn failure_message(&self) -> Option<String> {
        self.outcome
            .message()
            .map(|m| format!("{}: {}", self.element_code, m))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisValidation {
    pub checks: Vec<ElementCheck>,
    pub failures: Vec<String>,
    pub warnings: Vec<String>,
    pub has_defect: bool,
    pub suggested_decision: String,
    pub suggested_reason: String,
}

impl AnalysisValidation {
    pub fn check(&self, element_code: &str) -> Option<&ElementCheck> {
        self.checks.iter().find(|c| c.element_code == element_code)
    }

    /// Codes of the out-of-spec readings
    pub fn failed_codes(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| !c.outcome.is_valid())
            .map(|c| c.element_code.as_str())
            .collect()
    }
}

/// Validate every reading of an analysis against the specification table
///
/// # Arguments
/// - values: (element_code, reading) pairs, equivalents included
/// - specifications: element specification rows
///
/// # Returns
/// - per-element checks, failures, warnings for readings without a specification,
///   and the suggested decision (ACCEPT / REJECT)
#[instrument(skip_all, fields(readings = values.len()))]
pub fn validate_analysis(
    values: &[(&str, Option<f64>)],
    specifications: &[ElementSpecification],
) -> AnalysisValidation {
    let spec_map: HashMap<&str, &ElementSpecification> = specifications
        .iter()
        .map(|s| (s.element_code.as_str(), s))
        .collect();

    let mut checks = Vec::with_capacity(values.len());
    let mut failures = Vec::new();
    let mut warnings = Vec::new();

    for (code, value) in values {
        let spec = match spec_map.get(code) {
            Some(spec) => spec,
            None => {
                if value.is_some() {
                    warnings.push(format!("{}: No specification defined", code));
                }
                continue;
            }
        };

        let check = ElementCheck {
            element_code: code.to_string(),
            value: *value,
            min: spec.min_value,
            max: spec.max_value,
            outcome: validate(*value, spec.min_value, spec.max_value),
        };
        if let Some(msg) = check.failure_message() {
            failures.push(msg);
        }
        checks.push(check);
    }

    let has_defect = !failures.is_empty();
    let (suggested_decision, suggested_reason) = if has_defect {
        (DECISION_REJECT.to_string(), failures.join("; "))
    } else {
        (DECISION_ACCEPT.to_string(), ACCEPT_REASON.to_string())
    };

    if has_defect {
        tracing::warn!(failures = failures.len(), "readings out of specification");
    }

    AnalysisValidation {
        checks,
        failures,
        warnings,
        has_defect,
        suggested_decision,
        suggested_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(code: &str, min: Option<f64>, max: Option<f64>) -> ElementSpecification {
        ElementSpecification {
            id: 0,
            element_code: code.to_string(),
            element_name: None,
            min_value: min,
            max_value: max,
            unit: "%".to_string(),
        }
    }

    #[test]
    fn test_validate_empty_is_valid() {
        assert_eq!(validate(None, Some(1.0), Some(2.0)), ValidationOutcome::Empty);
        assert!(ValidationOutcome::Empty.is_valid());
    }

    #[test]
    fn test_validate_bounds() {
        assert_eq!(validate(Some(1.5), Some(1.0), Some(2.0)), ValidationOutcome::Ok);
        assert_eq!(validate(Some(1.0), Some(1.0), Some(2.0)), ValidationOutcome::Ok);
        assert_eq!(validate(Some(2.0), Some(1.0), Some(2.0)), ValidationOutcome::Ok);
        assert_eq!(
            validate(Some(0.5), Some(1.0), Some(2.0)),
            ValidationOutcome::Below { value: 0.5, min: 1.0 }
        );
        assert_eq!(
            validate(Some(2.5), Some(1.0), Some(2.0)),
            ValidationOutcome::Above { value: 2.5, max: 2.0 }
        );
    }

    #[test]
    fn test_validate_missing_bounds_unconstrained() {
        assert_eq!(validate(Some(-100.0), None, Some(0.1)), ValidationOutcome::Ok);
        assert_eq!(validate(Some(100.0), Some(0.023), None), ValidationOutcome::Ok);
        assert_eq!(validate(Some(42.0), None, None), ValidationOutcome::Ok);
    }

    #[test]
    fn test_min_checked_before_max() {
        // inverted range: both bounds violated, minimum wins
        assert_eq!(
            validate(Some(1.5), Some(2.0), Some(1.0)),
            ValidationOutcome::Below { value: 1.5, min: 2.0 }
        );
    }

    #[test]
    fn test_outcome_messages() {
        let below = validate(Some(2.5), Some(3.0), None);
        assert_eq!(below.message().unwrap(), "2.5 < 3 (below minimum)");
        let above = validate(Some(0.2), None, Some(0.1));
        assert_eq!(above.message().unwrap(), "0.2 > 0.1 (above maximum)");
        assert!(ValidationOutcome::Ok.message().is_none());
    }

    #[test]
    fn test_validate_analysis_accept() {
        let specs = vec![spec("C", Some(3.0), Some(3.9)), spec("Si", Some(1.86), Some(2.7))];
        let result = validate_analysis(&[("C", Some(3.5)), ("Si", None)], &specs);
        assert!(!result.has_defect);
        assert!(result.failures.is_empty());
        assert_eq!(result.suggested_decision, "ACCEPT");
        assert_eq!(result.suggested_reason, "All elements within specification");
        assert_eq!(result.check("Si").unwrap().outcome, ValidationOutcome::Empty);
    }

    #[test]
    fn test_validate_analysis_reject_joins_failures() {
        let specs = vec![spec("C", Some(3.0), Some(3.9)), spec("S", None, Some(0.02))];
        let result = validate_analysis(&[("C", Some(2.5)), ("S", Some(0.05))], &specs);
        assert!(result.has_defect);
        assert_eq!(result.suggested_decision, "REJECT");
        assert_eq!(
            result.suggested_reason,
            "C: 2.5 < 3 (below minimum); S: 0.05 > 0.02 (above maximum)"
        );
        assert_eq!(result.failed_codes(), vec!["C", "S"]);
    }

    #[test]
    fn test_validate_analysis_warns_without_spec() {
        let result = validate_analysis(&[("Pb", Some(0.001)), ("Al", None)], &[]);
        assert_eq!(result.warnings, vec!["Pb: No specification defined".to_string()]);
        assert!(result.checks.is_empty());
        assert!(!result.has_defect);
    }
}
