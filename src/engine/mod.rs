// ==========================================
// Foundry QC Tracker - engine layer
// ==========================================
// Pure rules: no SQL, no I/O.
// Called directly by the API services.
// ==========================================

pub mod element_validator;
pub mod equivalents;
pub mod ladle_codec;
pub mod mechanical;
pub mod order_progress;
pub mod stage_rules;
pub mod sticker;

pub use element_validator::{
    validate, validate_analysis, AnalysisValidation, ElementCheck, ValidationOutcome,
};
pub use ladle_codec::{next_ladle_number, DecodedLadleId, LadleCodec, LadleCodecError};
pub use mechanical::{calculate_auto_decision, MechanicalDecision, PropertyDecision};
pub use order_progress::{compute_progress, next_order_number};
pub use stage_rules::Term;
pub use sticker::StickerPayload;
