// ==========================================
// Foundry QC Tracker - pipe API
// ==========================================
// Pipe registration, lookup and deletion.
// Stage writes live in stage_api.
// ==========================================

use std::sync::Arc;

use chrono::Local;

use crate::api::access::require;
use crate::api::chemical_api::non_blank;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::pipe::{NewPipe, Pipe, PipeDetail, PipeFilter};
use crate::domain::reference::ReferenceData;
use crate::domain::types::{Actor, Capability, Page, PageRequest};
use crate::engine::stage_rules;
use crate::engine::sticker::FIELD_SEP;
use crate::repository::{ChemicalAnalysisRepository, PipeRepository, ProductionOrderRepository};

/// Sticker search result cap
pub const SEARCH_LIMIT: usize = 20;

pub struct PipeApi {
    pipe_repo: Arc<PipeRepository>,
    chemical_repo: Arc<ChemicalAnalysisRepository>,
    order_repo: Arc<ProductionOrderRepository>,
    reference: Arc<ReferenceData>,
    config: Arc<ConfigManager>,
}

impl PipeApi {
    pub fn new(
        pipe_repo: Arc<PipeRepository>,
        chemical_repo: Arc<ChemicalAnalysisRepository>,
        order_repo: Arc<ProductionOrderRepository>,
        reference: Arc<ReferenceData>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            pipe_repo,
            chemical_repo,
            order_repo,
            reference,
            config,
        }
    }

    /// Register a pipe
    ///
    /// # Arguments
    /// - input: no_code is required; production_date defaults to today
    /// - actor: needs Edit
    ///
    /// # Returns
    /// - stored pipe
    /// - InvalidInput: blank no_code, unknown ladle / shift / machine / production order,
    ///   non-positive diameter,
    ///   sticker field separator in no_code / pipe_type
    /// - BusinessRuleViolation: no_code already used
    pub fn create(&self, input: &NewPipe, actor: &Actor) -> ApiResult<Pipe> {
        require(actor, Capability::Edit)?;

        let no_code = input.no_code.trim();
        if no_code.is_empty() {
            return Err(ApiError::InvalidInput("no_code is required".to_string()));
        }

        let mut pipe = input.clone();
        pipe.no_code = no_code.to_string();
        pipe.production_date = Some(
            input
                .production_date
                .unwrap_or_else(|| Local::now().date_naive()),
        );
        pipe.ladle_id = non_blank(&input.ladle_id);
        pipe.shift_engineer = non_blank(&input.shift_engineer);
        pipe.manufacturing_order = non_blank(&input.manufacturing_order);
        pipe.pipe_code = non_blank(&input.pipe_code);
        pipe.pipe_type = non_blank(&input.pipe_type);
        pipe.mold_number = non_blank(&input.mold_number);

        for (field, value) in [
            ("no_code", Some(pipe.no_code.as_str())),
            ("pipe_type", pipe.pipe_type.as_deref()),
        ] {
            if value.is_some_and(|v| v.contains(FIELD_SEP)) {
                return Err(ApiError::InvalidInput(format!(
                    "{} must not contain '{}'",
                    field, FIELD_SEP
                )));
            }
        }
        if let Some(ladle_id) = &pipe.ladle_id {
            if !self.chemical_repo.exists_ladle_id(ladle_id)? {
                return Err(ApiError::InvalidInput(format!("unknown ladle {}", ladle_id)));
            }
        }
        if let Some(order_id) = pipe.production_order_id {
            if !self.order_repo.exists(order_id)? {
                return Err(ApiError::InvalidInput(format!(
                    "unknown production order {}",
                    order_id
                )));
            }
        }
        if let Some(shift) = pipe.shift {
            if self.reference.shift_by_number(shift).is_none() {
                return Err(ApiError::InvalidInput(format!("unknown shift {}", shift)));
            }
        }
        if let Some(machine_id) = pipe.machine_id {
            if self.reference.machine(machine_id).is_none() {
                return Err(ApiError::InvalidInput(format!("unknown machine {}", machine_id)));
            }
        }
        if let Some(diameter) = pipe.diameter {
            if diameter <= 0 {
                return Err(ApiError::InvalidInput(format!(
                    "diameter must be positive, got {}",
                    diameter
                )));
            }
        }
        if self.pipe_repo.find_by_no_code(&pipe.no_code)?.is_some() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "pipe {} already registered",
                pipe.no_code
            )));
        }

        let id = self
            .pipe_repo
            .insert(&pipe, Local::now().naive_local(), Some(&actor.name))?;
        tracing::info!(id, no_code = %pipe.no_code, actor = %actor.name, "pipe created");
        self.get(id)
    }

    pub fn get(&self, id: i64) -> ApiResult<Pipe> {
        self.pipe_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("pipe {}", id)))
    }

    /// Pipe with its stage rows and derived status
    pub fn detail(&self, id: i64) -> ApiResult<PipeDetail> {
        let pipe = self.get(id)?;
        let stages = self.pipe_repo.list_stages(id)?;
        let status = stage_rules::pipe_status(&stages);
        Ok(PipeDetail {
            pipe,
            stages,
            status,
        })
    }

    pub fn list(
        &self,
        filter: &PipeFilter,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> ApiResult<Page<Pipe>> {
        let per_page = match per_page {
            Some(n) => n,
            None => self.config.get_page_size()?,
        };
        let request = PageRequest::new(page.unwrap_or(1), per_page);
        Ok(self.pipe_repo.list(filter, request)?)
    }

    /// Substring search over no_code and ladle_id; blank queries match nothing
    pub fn search(&self, query: &str) -> ApiResult<Vec<Pipe>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.pipe_repo.search(query, SEARCH_LIMIT)?)
    }

    /// Delete a pipe with its stages and history
    pub fn delete(&self, id: i64, actor: &Actor) -> ApiResult<()> {
        require(actor, Capability::Approve)?;
        self.pipe_repo.delete(id)?;
        tracing::info!(id, actor = %actor.name, "pipe deleted");
        Ok(())
    }
}
