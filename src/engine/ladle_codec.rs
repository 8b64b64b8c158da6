// ==========================================
// Foundry QC Tracker - ladle identifier codec
// ==========================================
// ladle_id = {ladle_no}{DD}{MM}{YYYY}
// e.g. ladle 471 on 2025-01-13 -> "47113012025"
// ==========================================
// Decode slices from the right: the date suffix has fixed widths,
// the ladle number takes the remaining leading digits.
// With a configured number_width the ladle number is zero-padded
// and decode requires exactly that many leading digits.
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// DDMMYYYY suffix length
const DATE_SUFFIX_LEN: usize = 8;
/// One ladle digit + date suffix
pub const MIN_LADLE_ID_LEN: usize = DATE_SUFFIX_LEN + 1;

/// Digits of u32::MAX; wider ladle-number fields are never needed
pub const MAX_NUMBER_WIDTH: usize = 10;

pub const MIN_VALID_YEAR: i32 = 2020;
pub const MAX_VALID_YEAR: i32 = 2100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LadleCodecError {
    #[error("ladle number {ladle_no} does not fit in {width} digits")]
    NumberTooWide { ladle_no: u32, width: usize },
}

/// Components of a decoded ladle identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedLadleId {
    pub ladle_no: u32,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl DecodedLadleId {
    /// Calendar date, None for impossible dates such as 31/02
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Range check used for manual ladle_id entry
    pub fn is_plausible(&self) -> bool {
        (1..=31).contains(&self.day)
            && (1..=12).contains(&self.month)
            && (MIN_VALID_YEAR..=MAX_VALID_YEAR).contains(&self.year)
            && self.ladle_no >= 1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadleCodec {
    /// Fixed ladle-number width; None keeps the legacy unpadded format
    pub number_width: Option<usize>,
}

impl LadleCodec {
    pub fn new(number_width: Option<usize>) -> Self {
        Self {
            number_width: number_width.filter(|w| (1..=MAX_NUMBER_WIDTH).contains(w)),
        }
    }

    pub fn legacy() -> Self {
        Self::default()
    }

    pub fn encode(&self, ladle_no: u32, date: NaiveDate) -> Result<String, LadleCodecError> {
        let number = match self.number_width {
            Some(width) => {
                let padded = format!("{:0width$}", ladle_no, width = width);
                if padded.len() > width {
                    return Err(LadleCodecError::NumberTooWide { ladle_no, width });
                }
                padded
            }
            None => ladle_no.to_string(),
        };

        Ok(format!(
            "{}{:02}{:02}{:04}",
            number,
            date.day(),
            date.month(),
            date.year()
        ))
    }

    /// Split an identifier into its parts; no partial results
    pub fn decode(&self, ladle_id: &str) -> Option<DecodedLadleId> {
        let id = ladle_id.trim();
        if id.len() < MIN_LADLE_ID_LEN || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let split = id.len() - DATE_SUFFIX_LEN;
        if let Some(width) = self.number_width {
            if split != width {
                return None;
            }
        }

        let (number, date) = id.split_at(split);
        Some(DecodedLadleId {
            ladle_no: number.parse().ok()?,
            day: date[0..2].parse().ok()?,
            month: date[2..4].parse().ok()?,
            year: date[4..8].parse().ok()?,
        })
    }

    pub fn is_valid(&self, ladle_id: &str) -> bool {
        self.decode(ladle_id)
            .map(|d| d.is_plausible())
            .unwrap_or(false)
    }
}

/// Ladle numbers restart at 1 every day
pub fn next_ladle_number(max_for_date: Option<i32>) -> i32 {
    max_for_date.map(|n| n + 1).unwrap_or(1)
}
