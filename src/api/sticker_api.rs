// ==========================================
// Foundry QC Tracker - sticker API
// ==========================================
// QR payloads for pipe stickers and verification of scanned codes.
// Image layout is left to the printing client.
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::pipe_api::SEARCH_LIMIT;
use crate::domain::pipe::Pipe;
use crate::engine::StickerPayload;
use crate::repository::{ChemicalAnalysisRepository, PipeRepository};

/// Payload and its QR text for one pipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub pipe_id: i64,
    pub payload: StickerPayload,
    pub qr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerVerification {
    /// None when the scanned text is not a sticker payload
    pub scanned: Option<StickerPayload>,
    pub pipe_found: bool,
    /// Scanned payload equals the one built from current data
    pub matches: bool,
    pub current: Option<Sticker>,
}

pub struct StickerApi {
    pipe_repo: Arc<PipeRepository>,
    chemical_repo: Arc<ChemicalAnalysisRepository>,
}

impl StickerApi {
    pub fn new(
        pipe_repo: Arc<PipeRepository>,
        chemical_repo: Arc<ChemicalAnalysisRepository>,
    ) -> Self {
        Self {
            pipe_repo,
            chemical_repo,
        }
    }

    /// Pipes whose no_code or ladle_id contains `query`, with their payloads
    pub fn search(&self, query: &str) -> ApiResult<Vec<Sticker>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.pipe_repo
            .search(query, SEARCH_LIMIT)?
            .iter()
            .map(|pipe| self.sticker_for(pipe))
            .collect()
    }

    pub fn sticker(&self, pipe_id: i64) -> ApiResult<Sticker> {
        let pipe = self
            .pipe_repo
            .find_by_id(pipe_id)?
            .ok_or_else(|| ApiError::NotFound(format!("pipe {}", pipe_id)))?;
        self.sticker_for(&pipe)
    }

    /// Stickers for a print batch; unknown ids are skipped
    pub fn batch(&self, pipe_ids: &[i64]) -> ApiResult<Vec<Sticker>> {
        if pipe_ids.is_empty() {
            return Err(ApiError::InvalidInput("no pipes selected".to_string()));
        }
        let mut stickers = Vec::with_capacity(pipe_ids.len());
        for id in pipe_ids {
            if let Some(pipe) = self.pipe_repo.find_by_id(*id)? {
                stickers.push(self.sticker_for(&pipe)?);
            }
        }
        Ok(stickers)
    }

    /// Stickers for already loaded pipes, in the given order
    pub fn for_pipes(&self, pipes: &[Pipe]) -> ApiResult<Vec<Sticker>> {
        pipes.iter().map(|pipe| self.sticker_for(pipe)).collect()
    }

    /// Check a scanned QR text against the database
    pub fn verify(&self, qr: &str) -> ApiResult<StickerVerification> {
        let Some(scanned) = StickerPayload::parse(qr) else {
            return Ok(StickerVerification {
                scanned: None,
                pipe_found: false,
                matches: false,
                current: None,
            });
        };

        let current = match self.pipe_repo.find_by_no_code(&scanned.no_code)? {
            Some(pipe) => Some(self.sticker_for(&pipe)?),
            None => None,
        };
        let matches = current
            .as_ref()
            .map(|c| c.payload.canonical().as_ref() == Some(&scanned))
            .unwrap_or(false);
        if current.is_some() && !matches {
            tracing::warn!(no_code = %scanned.no_code, "scanned sticker differs from current data");
        }

        Ok(StickerVerification {
            pipe_found: current.is_some(),
            matches,
            current,
            scanned: Some(scanned),
        })
    }

    fn sticker_for(&self, pipe: &Pipe) -> ApiResult<Sticker> {
        let decision = match &pipe.ladle_id {
            Some(ladle_id) => self.chemical_repo.find_decision_by_ladle_id(ladle_id)?,
            None => None,
        };
        let payload = StickerPayload::for_pipe(pipe, decision.as_deref());
        let qr = payload.to_qr_string();
        Ok(Sticker {
            pipe_id: pipe.id,
            payload,
            qr,
        })
    }
}
