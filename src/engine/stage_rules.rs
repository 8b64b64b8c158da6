// ==========================================
// Foundry QC Tracker - stage rules
// ==========================================
// Per-stage vocabularies (decisions, defects, measurement type)
// and the pipe status derived from its stage rows.
// ==========================================

use crate::domain::pipe::{PipeStage, PipeStatus, StageStatus};
use crate::domain::types::Stage;
use serde::Serialize;

/// English code + Arabic label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Term {
    pub en: &'static str,
    pub ar: &'static str,
}

const fn term(en: &'static str, ar: &'static str) -> Term {
    Term { en, ar }
}

const ACCEPT: Term = term("Accept", "قبول");
const REJECT: Term = term("Reject", "رفض");
const HOLD: Term = term("Hold", "حجز");
const ACCEPT_WITH_REMARK: Term = term("Accept with remark", "قبول مع ملاحظة");
const REWORK: Term = term("Rework", "إعادة عمل");
const OTHER: Term = term("Other", "أخرى");
const HANDLING: Term = term("Handling", "مناوله");

// ==========================================
// Decisions
// ==========================================
const CCM_DECISIONS: &[Term] = &[
    ACCEPT,
    REJECT,
    ACCEPT_WITH_REMARK,
    term("DownGrade", "تخفيض درجة"),
    HOLD,
];
const ANNEALING_DECISIONS: &[Term] = &[
    ACCEPT,
    REJECT,
    ACCEPT_WITH_REMARK,
    HOLD,
    term("Reheat treatment", "إعادة معالجة حرارية"),
    term("Resample", "إعادة عينة"),
];
const ZINC_DECISIONS: &[Term] = &[
    ACCEPT,
    REJECT,
    HOLD,
    REWORK,
    term("Micro-structure", "فحص البنية المجهرية"),
];
const CUTTING_DECISIONS: &[Term] = &[ACCEPT, REJECT, HOLD, term("Retest", "إعادة اختبار")];
const REWORKABLE_DECISIONS: &[Term] = &[ACCEPT, REJECT, HOLD, REWORK];
const FINISH_DECISIONS: &[Term] = &[ACCEPT, REJECT, HOLD];

pub fn decisions(stage: Stage) -> &'static [Term] {
    match stage {
        Stage::Ccm => CCM_DECISIONS,
        Stage::Annealing => ANNEALING_DECISIONS,
        Stage::Zinc => ZINC_DECISIONS,
        Stage::Cutting => CUTTING_DECISIONS,
        Stage::Hydrotest | Stage::Cement | Stage::Coating => REWORKABLE_DECISIONS,
        Stage::Finish => FINISH_DECISIONS,
    }
}

// ==========================================
// Defects
// ==========================================
const CCM_DEFECTS: &[Term] = &[
    term("Dalek", "دلاليـك"),
    term("Wrinkle", "رينـــكل"),
    term("Metal clustering/threshold", "تكتل معدن/عتبة"),
    term("Metal folding", "طى معدن"),
    term("Cracks", "شروخ"),
    term("Pits", "حفر"),
    term("LA Flaking", "توريق LA"),
    term("High thickness", "سمك عالى"),
    term("Low thickness", "سمك ضعيف"),
    term("Graphite", "جرافيت"),
    term("Grinding/slag", "جلخ/خبط SL"),
    term("Inoculation", "تطعيم"),
    term("Head break", "كسر فى الرأس"),
    term("Without socket", "بدون مصد"),
    term("D4", "D4"),
    term("Oval", "بيضاوى"),
    term("Curvature", "تقوس CU"),
    term("Handling defect", "عيب مناولة"),
    OTHER,
];
const ANNEALING_DEFECTS: &[Term] = &[HANDLING, term("Crack", "شرخ"), term("Oval", "بيضاوى"), OTHER];
const CUTTING_DEFECTS: &[Term] = &[
    HANDLING,
    term("Mechanical properties", "خواص ميكانيكيه"),
    term("Bulging", "انتفاخ"),
    term("Break on press", "كسر على المكبس"),
    term("Short length", "قصر طول"),
    term("Cracks", "شروخ"),
    OTHER,
];
const HYDROTEST_DEFECTS: &[Term] = &[HANDLING, term("Leakage", "تسريب"), OTHER];
const CEMENT_DEFECTS: &[Term] = &[
    term("Thickness", "سمك"),
    term("Paint damage", "تالف دهان"),
    term("Cement damage", "تالف اسمنت"),
    OTHER,
];
const COATING_DEFECTS: &[Term] = &[
    HANDLING,
    term("Paint damage", "تالف دهان"),
    term("Cement damage", "تالف اسمنت"),
    OTHER,
];
const FINISH_DEFECTS: &[Term] = &[HANDLING, OTHER];

pub fn defects(stage: Stage) -> &'static [Term] {
    match stage {
        Stage::Ccm => CCM_DEFECTS,
        Stage::Annealing => ANNEALING_DEFECTS,
        Stage::Zinc => &[],
        Stage::Cutting => CUTTING_DEFECTS,
        Stage::Hydrotest => HYDROTEST_DEFECTS,
        Stage::Cement => CEMENT_DEFECTS,
        Stage::Coating => COATING_DEFECTS,
        Stage::Finish => FINISH_DEFECTS,
    }
}

/// Measurement recorded at the stage, if any
pub fn measurement_type(stage: Stage) -> Option<&'static str> {
    match stage {
        Stage::Zinc => Some("Zinc Slide"),
        Stage::Cement => Some("Cement Thickness"),
        Stage::Coating => Some("Coating Thickness"),
        Stage::Finish => Some("Length"),
        _ => None,
    }
}

fn find_term(terms: &'static [Term], value: &str) -> Option<&'static Term> {
    let needle = value.trim();
    terms
        .iter()
        .find(|t| t.en.eq_ignore_ascii_case(needle) || t.ar == needle)
}

/// Canonical decision code, None when outside the stage vocabulary
pub fn normalize_decision(stage: Stage, decision: &str) -> Option<&'static str> {
    find_term(decisions(stage), decision).map(|t| t.en)
}

/// Canonical defect label, None when outside the stage vocabulary
pub fn normalize_defect(stage: Stage, defect: &str) -> Option<&'static str> {
    find_term(defects(stage), defect).map(|t| t.en)
}

// ==========================================
// Derived pipe status
// ==========================================

/// Latest stage (in production order) with a decision; first stage otherwise
pub fn current_stage(stages: &[PipeStage]) -> Stage {
    Stage::ALL
        .iter()
        .rev()
        .copied()
        .find(|stage| stages.iter().any(|s| s.stage == *stage && s.is_complete()))
        .unwrap_or(Stage::ALL[0])
}

/// Decision recorded at the Finish stage
pub fn final_decision(stages: &[PipeStage]) -> Option<String> {
    stages
        .iter()
        .find(|s| s.stage == Stage::Finish)
        .and_then(|s| s.decision.clone())
}

pub fn pipe_status(stages: &[PipeStage]) -> PipeStatus {
    let per_stage = Stage::ALL
        .iter()
        .map(|stage| match stages.iter().find(|s| s.stage == *stage) {
            Some(row) => StageStatus {
                stage: *stage,
                completed: true,
                decision: row.decision.clone(),
                has_defect: row.has_defect,
            },
            None => StageStatus {
                stage: *stage,
                completed: false,
                decision: None,
                has_defect: false,
            },
        })
        .collect();

    PipeStatus {
        stages: per_stage,
        current_stage: current_stage(stages),
        final_decision: final_decision(stages),
    }
}
