// ==========================================
// Foundry QC Tracker - production order repository
// ==========================================
// Table: production_orders
// Pipes reference orders through pipes.production_order_id
// ==========================================

use crate::domain::production_order::{
    OrderFilter, OrderPriority, OrderStatus, OrderSummary, ProductionOrder,
};
use crate::domain::types::{Page, PageRequest};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{escape_like, FilterBuilder};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const ORDER_COLUMNS: &str = r#"
    SELECT
        id, order_number, customer_name, customer_code, sales_number,
        target_quantity, diameter, pipe_class, product_code, product_description,
        product_weight, product_length,
        order_date, start_date, expected_end_date, actual_end_date,
        status, priority, notes, specifications,
        created_at, updated_at, created_by
    FROM production_orders
"#;

/// order_number or customer name
const SEARCH_CLAUSE: &str =
    "(order_number LIKE ? ESCAPE '\\' OR IFNULL(customer_name, '') LIKE ? ESCAPE '\\')";

pub struct ProductionOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionOrderRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert an order; `order.id` is ignored
    ///
    /// # Returns
    /// - new row id
    /// - UniqueConstraintViolation: duplicate order_number
    pub fn insert(&self, order: &ProductionOrder) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO production_orders (
                order_number, customer_name, customer_code, sales_number,
                target_quantity, diameter, pipe_class, product_code, product_description,
                product_weight, product_length,
                order_date, start_date, expected_end_date, actual_end_date,
                status, priority, notes, specifications,
                created_at, updated_at, created_by
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8, ?9,
                ?10, ?11,
                ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19,
                ?20, ?21, ?22
            )
            "#,
            params![
                order.order_number,
                order.customer_name,
                order.customer_code,
                order.sales_number,
                order.target_quantity,
                order.diameter,
                order.pipe_class,
                order.product_code,
                order.product_description,
                order.product_weight,
                order.product_length,
                order.order_date,
                order.start_date,
                order.expected_end_date,
                order.actual_end_date,
                order.status.as_str(),
                order.priority.as_str(),
                order.notes,
                order.specifications,
                order.created_at,
                order.updated_at,
                order.created_by,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Overwrite every editable column; created_at / created_by are kept
    pub fn update(&self, order: &ProductionOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE production_orders SET
                order_number = ?1, customer_name = ?2, customer_code = ?3, sales_number = ?4,
                target_quantity = ?5, diameter = ?6, pipe_class = ?7,
                product_code = ?8, product_description = ?9,
                product_weight = ?10, product_length = ?11,
                order_date = ?12, start_date = ?13, expected_end_date = ?14, actual_end_date = ?15,
                status = ?16, priority = ?17, notes = ?18, specifications = ?19,
                updated_at = ?20
            WHERE id = ?21
            "#,
            params![
                order.order_number,
                order.customer_name,
                order.customer_code,
                order.sales_number,
                order.target_quantity,
                order.diameter,
                order.pipe_class,
                order.product_code,
                order.product_description,
                order.product_weight,
                order.product_length,
                order.order_date,
                order.start_date,
                order.expected_end_date,
                order.actual_end_date,
                order.status.as_str(),
                order.priority.as_str(),
                order.notes,
                order.specifications,
                order.updated_at,
                order.id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("ProductionOrder", order.id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ProductionOrder>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", ORDER_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_order).optional()?)
    }

    pub fn exists(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM production_orders WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Highest order number starting with `prefix-`
    pub fn last_number_with_prefix(&self, prefix: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let pattern = format!("{}-%", escape_like(prefix));
        Ok(conn
            .query_row(
                "SELECT order_number FROM production_orders
                 WHERE order_number LIKE ?1 ESCAPE '\\'
                 ORDER BY id DESC LIMIT 1",
                params![pattern],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Newest order_date first
    pub fn list(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<ProductionOrder>> {
        let conn = self.get_conn()?;

        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", escape_like(q)));
        let mut b = FilterBuilder::new();
        b.and_opt("status = ?", filter.status.map(|s| s.as_str()));
        if let Some(pattern) = pattern {
            b.and_pair(SEARCH_CLAUSE, pattern.clone(), pattern);
        }
        let where_sql = b.where_sql();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM production_orders{}", where_sql),
            b.params().as_slice(),
            |row| row.get(0),
        )?;

        let sql = format!(
            "{}{} ORDER BY order_date DESC, id DESC LIMIT ? OFFSET ?",
            ORDER_COLUMNS, where_sql
        );
        let limit = page.per_page as i64;
        let offset = page.offset();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(b.params_with(&[&limit, &offset]).as_slice(), map_order)?;
        let items = rows.collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    /// Substring search with the produced count per order
    pub fn search(&self, query: &str, limit: usize) -> RepositoryResult<Vec<OrderSummary>> {
        let conn = self.get_conn()?;
        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            r#"
            SELECT o.id, o.order_number, o.customer_name, o.target_quantity, o.status,
                   (SELECT COUNT(*) FROM pipes p WHERE p.production_order_id = o.id)
            FROM production_orders o
            WHERE {}
            ORDER BY o.order_date DESC, o.id DESC
            LIMIT ?
            "#,
            SEARCH_CLAUSE
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern, pattern, limit as i64], |row| {
            Ok(OrderSummary {
                id: row.get(0)?,
                order_number: row.get(1)?,
                customer_name: row.get(2)?,
                target_quantity: row.get(3)?,
                status: status_column(row, 4)?,
                produced_quantity: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete an order
    ///
    /// # Returns
    /// - NotFound: no such order
    /// - ForeignKeyViolation: pipes still reference it
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM production_orders WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("ProductionOrder", id));
        }
        Ok(())
    }
}

fn status_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<OrderStatus> {
    let raw: String = row.get(idx)?;
    OrderStatus::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown order status: {}", raw).into(),
        )
    })
}

fn priority_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<OrderPriority> {
    let raw: String = row.get(idx)?;
    OrderPriority::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown order priority: {}", raw).into(),
        )
    })
}

fn map_order(row: &Row<'_>) -> rusqlite::Result<ProductionOrder> {
    Ok(ProductionOrder {
        id: row.get(0)?,
        order_number: row.get(1)?,
        customer_name: row.get(2)?,
        customer_code: row.get(3)?,
        sales_number: row.get(4)?,
        target_quantity: row.get(5)?,
        diameter: row.get(6)?,
        pipe_class: row.get(7)?,
        product_code: row.get(8)?,
        product_description: row.get(9)?,
        product_weight: row.get(10)?,
        product_length: row.get(11)?,
        order_date: row.get(12)?,
        start_date: row.get(13)?,
        expected_end_date: row.get(14)?,
        actual_end_date: row.get(15)?,
        status: status_column(row, 16)?,
        priority: priority_column(row, 17)?,
        notes: row.get(18)?,
        specifications: row.get(19)?,
        created_at: row.get(20)?,
        updated_at: row.get(21)?,
        created_by: row.get(22)?,
    })
}
