// ==========================================
// Foundry QC Tracker - production order API
// ==========================================
// Orders group pipes for a customer. Progress and stickers are
// built from the linked pipes on every call.
// ==========================================

use std::sync::Arc;

use chrono::Local;

use crate::api::access::require;
use crate::api::chemical_api::non_blank;
use crate::api::error::{ApiError, ApiResult};
use crate::api::sticker_api::{Sticker, StickerApi};
use crate::config::ConfigManager;
use crate::domain::production_order::{
    OrderDetail, OrderFilter, OrderProgress, OrderSummary, ProductionOrder, ProductionOrderDraft,
};
use crate::domain::types::{Actor, Capability, Page, PageRequest};
use crate::engine::order_progress;
use crate::repository::{PipeRepository, ProductionOrderRepository};

/// Order search result cap
pub const ORDER_SEARCH_LIMIT: usize = 10;

pub struct ProductionOrderApi {
    order_repo: Arc<ProductionOrderRepository>,
    pipe_repo: Arc<PipeRepository>,
    sticker_api: Arc<StickerApi>,
    config: Arc<ConfigManager>,
}

impl ProductionOrderApi {
    pub fn new(
        order_repo: Arc<ProductionOrderRepository>,
        pipe_repo: Arc<PipeRepository>,
        sticker_api: Arc<StickerApi>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            order_repo,
            pipe_repo,
            sticker_api,
            config,
        }
    }

    /// Open an order
    ///
    /// # Arguments
    /// - draft: target_quantity is required; a blank order_number is generated
    ///   as PO-YYYYMMDD-NNN from order_date (default today)
    /// - actor: needs Edit
    ///
    /// # Returns
    /// - stored order
    /// - InvalidInput: missing or negative target_quantity, non-positive diameter
    /// - BusinessRuleViolation: order_number already used
    pub fn create(&self, draft: &ProductionOrderDraft, actor: &Actor) -> ApiResult<ProductionOrder> {
        require(actor, Capability::Edit)?;

        let target_quantity = draft
            .target_quantity
            .ok_or_else(|| ApiError::InvalidInput("target_quantity is required".to_string()))?;
        let order_date = draft
            .order_date
            .unwrap_or_else(|| Local::now().date_naive());
        let order_number = match non_blank(&draft.order_number) {
            Some(number) => number,
            None => {
                let prefix = order_progress::order_number_prefix(order_date);
                let last = self.order_repo.last_number_with_prefix(&prefix)?;
                order_progress::next_order_number(order_date, last.as_deref())
            }
        };

        let now = Local::now().naive_local();
        let mut order = ProductionOrder {
            id: 0,
            order_number,
            customer_name: None,
            customer_code: None,
            sales_number: None,
            target_quantity,
            diameter: None,
            pipe_class: None,
            product_code: None,
            product_description: None,
            product_weight: None,
            product_length: None,
            order_date,
            start_date: None,
            expected_end_date: None,
            actual_end_date: None,
            status: draft.status.unwrap_or_default(),
            priority: draft.priority.unwrap_or_default(),
            notes: None,
            specifications: None,
            created_at: now,
            updated_at: now,
            created_by: Some(actor.name.clone()),
        };
        apply_form_fields(&mut order, draft);
        validate(&order)?;

        order.id = self.order_repo.insert(&order)?;
        tracing::info!(
            id = order.id,
            order_number = %order.order_number,
            target = order.target_quantity,
            actor = %actor.name,
            "production order created"
        );
        Ok(order)
    }

    /// Edit an order; absent number, quantity, date, status and priority keep their stored values
    pub fn update(
        &self,
        id: i64,
        draft: &ProductionOrderDraft,
        actor: &Actor,
    ) -> ApiResult<ProductionOrder> {
        require(actor, Capability::Edit)?;
        let mut order = self.get(id)?;

        if let Some(number) = non_blank(&draft.order_number) {
            order.order_number = number;
        }
        if let Some(quantity) = draft.target_quantity {
            order.target_quantity = quantity;
        }
        if let Some(date) = draft.order_date {
            order.order_date = date;
        }
        if let Some(status) = draft.status {
            order.status = status;
        }
        if let Some(priority) = draft.priority {
            order.priority = priority;
        }
        apply_form_fields(&mut order, draft);
        validate(&order)?;
        order.updated_at = Local::now().naive_local();

        self.order_repo.update(&order)?;
        tracing::info!(id, status = %order.status, actor = %actor.name, "production order updated");
        Ok(order)
    }

    pub fn get(&self, id: i64) -> ApiResult<ProductionOrder> {
        self.order_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("production order {}", id)))
    }

    /// Order with its pipes (by no_code) and progress
    pub fn detail(&self, id: i64) -> ApiResult<OrderDetail> {
        let order = self.get(id)?;
        let pipes = self.pipe_repo.list_by_order(id)?;
        let stages = self.pipe_repo.list_stages_for_order(id)?;
        let pipe_ids: Vec<i64> = pipes.iter().map(|p| p.id).collect();
        let progress = order_progress::compute_progress(&order, &pipe_ids, &stages);
        Ok(OrderDetail {
            order,
            pipes,
            progress,
        })
    }

    pub fn list(
        &self,
        filter: &OrderFilter,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> ApiResult<Page<ProductionOrder>> {
        let per_page = match per_page {
            Some(n) => n,
            None => self.config.get_page_size()?,
        };
        Ok(self
            .order_repo
            .list(filter, PageRequest::new(page.unwrap_or(1), per_page))?)
    }

    /// Orders whose number or customer contains `query`; blank queries match nothing
    pub fn search(&self, query: &str) -> ApiResult<Vec<OrderSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.order_repo.search(query, ORDER_SEARCH_LIMIT)?)
    }

    /// Produced / completed / rejected counts and per-stage tallies
    pub fn progress(&self, id: i64) -> ApiResult<OrderProgress> {
        Ok(self.detail(id)?.progress)
    }

    /// Stickers for every pipe of the order, by no_code; empty when none are linked
    pub fn stickers(&self, id: i64) -> ApiResult<Vec<Sticker>> {
        self.get(id)?;
        let pipes = self.pipe_repo.list_by_order(id)?;
        self.sticker_api.for_pipes(&pipes)
    }

    /// Delete an order that has no pipes
    pub fn delete(&self, id: i64, actor: &Actor) -> ApiResult<()> {
        require(actor, Capability::Approve)?;
        self.get(id)?;
        let linked = self.pipe_repo.count_by_order(id)?;
        if linked > 0 {
            return Err(ApiError::BusinessRuleViolation(format!(
                "production order {} still has {} pipes",
                id, linked
            )));
        }
        self.order_repo.delete(id)?;
        tracing::info!(id, actor = %actor.name, "production order deleted");
        Ok(())
    }
}

fn validate(order: &ProductionOrder) -> ApiResult<()> {
    if order.target_quantity < 0 {
        return Err(ApiError::InvalidInput(format!(
            "target_quantity must not be negative, got {}",
            order.target_quantity
        )));
    }
    if let Some(diameter) = order.diameter {
        if diameter <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "diameter must be positive, got {}",
                diameter
            )));
        }
    }
    Ok(())
}

fn apply_form_fields(order: &mut ProductionOrder, draft: &ProductionOrderDraft) {
    order.customer_name = non_blank(&draft.customer_name);
    order.customer_code = non_blank(&draft.customer_code);
    order.sales_number = non_blank(&draft.sales_number);
    order.diameter = draft.diameter;
    order.pipe_class = non_blank(&draft.pipe_class);
    order.product_code = non_blank(&draft.product_code);
    order.product_description = non_blank(&draft.product_description);
    order.product_weight = draft.product_weight;
    order.product_length = draft.product_length;
    order.start_date = draft.start_date;
    order.expected_end_date = draft.expected_end_date;
    order.actual_end_date = draft.actual_end_date;
    order.notes = non_blank(&draft.notes);
    order.specifications = non_blank(&draft.specifications);
}
