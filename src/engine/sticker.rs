// ==========================================
// Foundry QC Tracker - sticker QR payload
// ==========================================
// NC:<no_code>|L:<ladle_id>|DN:<diameter>|T:<type>|D:<date>|W:<weight>kg|DEC:<decision>
// Absent fields are written as empty values.
// ==========================================

use crate::domain::pipe::Pipe;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Separator between payload fields; never allowed inside a stored value
pub const FIELD_SEP: char = '|';
/// Decision shown when the pipe's ladle has no analysis
pub const NO_DECISION: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerPayload {
    pub no_code: String,
    pub ladle_id: Option<String>,
    pub diameter: Option<i32>,
    pub pipe_type: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub decision: String,
}

impl StickerPayload {
    /// Build from a pipe and its ladle's chemical decision
    pub fn for_pipe(pipe: &Pipe, chemical_decision: Option<&str>) -> Self {
        Self {
            no_code: pipe.no_code.clone(),
            ladle_id: pipe.ladle_id.clone(),
            diameter: pipe.diameter,
            pipe_type: pipe.pipe_type.clone(),
            production_date: Some(pipe.production_date),
            weight: pipe.actual_weight.or(pipe.iso_weight),
            decision: chemical_decision
                .filter(|d| !d.trim().is_empty())
                .unwrap_or(NO_DECISION)
                .to_string(),
        }
    }

    pub fn to_qr_string(&self) -> String {
        let fields = [
            format!("NC:{}", clean(&self.no_code)),
            format!("L:{}", clean(self.ladle_id.as_deref().unwrap_or(""))),
            format!("DN:{}", opt(self.diameter)),
            format!("T:{}", clean(self.pipe_type.as_deref().unwrap_or(""))),
            format!("D:{}", opt(self.production_date)),
            format!("W:{}kg", opt(self.weight)),
            format!("DEC:{}", clean(&self.decision)),
        ];
        fields.join("|")
    }

    /// Decode a scanned payload; None when there is no NC field.
    /// Unknown keys are ignored, unparseable numbers and dates read as absent.
    pub fn parse(qr: &str) -> Option<Self> {
        let mut no_code = None;
        let mut payload = StickerPayload {
            no_code: String::new(),
            ladle_id: None,
            diameter: None,
            pipe_type: None,
            production_date: None,
            weight: None,
            decision: NO_DECISION.to_string(),
        };

        for part in qr.trim().split(FIELD_SEP) {
            let Some((key, value)) = part.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "NC" => no_code = Some(value.to_string()),
                "L" => payload.ladle_id = non_empty(value),
                "DN" => payload.diameter = value.parse().ok(),
                "T" => payload.pipe_type = non_empty(value),
                "D" => payload.production_date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
                "W" => payload.weight = value.trim_end_matches("kg").trim().parse().ok(),
                "DEC" => {
                    if !value.is_empty() {
                        payload.decision = value.to_string();
                    }
                }
                _ => {}
            }
        }

        payload.no_code = no_code.filter(|c| !c.is_empty())?;
        Some(payload)
    }

    /// Form a payload takes after one encode/scan cycle
    pub fn canonical(&self) -> Option<Self> {
        Self::parse(&self.to_qr_string())
    }
}

fn clean(value: &str) -> String {
    value.replace(FIELD_SEP, "/")
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
