use crate::domain::pipe::{NewPipe, Pipe, PipeFilter};
use crate::domain::types::{Page, PageRequest};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::{escape_like, FilterBuilder};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub(super) const PIPE_COLUMNS: &str = r#"
    SELECT
        id, production_date, shift, shift_engineer, manufacturing_order,
        no_code, pipe_code, arrange_pipe, ladle_id,
        diameter, pipe_type, machine_id, mold_number,
        iso_weight, actual_weight, thickness,
        created_at, created_by, production_order_id
    FROM pipes
"#;

// ==========================================
// PipeRepository
// ==========================================
pub struct PipeRepository {
    pub(super) conn: Arc<Mutex<Connection>>,
}

impl PipeRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub(super) fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert a pipe; production_date must already be resolved
    ///
    /// # Returns
    /// - new row id
    /// - UniqueConstraintViolation: duplicate no_code
    /// - ForeignKeyViolation: ladle_id without an analysis, unknown production order
    pub fn insert(
        &self,
        pipe: &NewPipe,
        created_at: NaiveDateTime,
        created_by: Option<&str>,
    ) -> RepositoryResult<i64> {
        let production_date = pipe.production_date.ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "production_date".to_string(),
                message: "missing".to_string(),
            }
        })?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO pipes (
                production_date, shift, shift_engineer, manufacturing_order,
                no_code, pipe_code, arrange_pipe, ladle_id,
                diameter, pipe_type, machine_id, mold_number,
                iso_weight, actual_weight, thickness,
                created_at, created_by, production_order_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
            params![
                production_date,
                pipe.shift,
                pipe.shift_engineer,
                pipe.manufacturing_order,
                pipe.no_code,
                pipe.pipe_code,
                pipe.arrange_pipe,
                pipe.ladle_id,
                pipe.diameter,
                pipe.pipe_type,
                pipe.machine_id,
                pipe.mold_number,
                pipe.iso_weight,
                pipe.actual_weight,
                pipe.thickness,
                created_at,
                created_by,
                pipe.production_order_id,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Pipe>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", PIPE_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_pipe).optional()?)
    }

    pub fn find_by_no_code(&self, no_code: &str) -> RepositoryResult<Option<Pipe>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE no_code = ?1", PIPE_COLUMNS);
        Ok(conn.query_row(&sql, params![no_code], map_pipe).optional()?)
    }

    /// Substring search over no_code and ladle_id (case-insensitive)
    pub fn search(&self, query: &str, limit: usize) -> RepositoryResult<Vec<Pipe>> {
        let conn = self.get_conn()?;
        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            "{} WHERE no_code LIKE ?1 ESCAPE '\\' OR ladle_id LIKE ?1 ESCAPE '\\' ORDER BY created_at DESC, id DESC LIMIT ?2",
            PIPE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern, limit as i64], map_pipe)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list(&self, filter: &PipeFilter, page: PageRequest) -> RepositoryResult<Page<Pipe>> {
        let conn = self.get_conn()?;

        let mut b = FilterBuilder::new();
        b.and_opt("ladle_id = ?", filter.ladle_id.clone())
            .and_opt(
                "no_code LIKE ? ESCAPE '\\'",
                filter.no_code.as_deref().map(|q| format!("%{}%", escape_like(q))),
            )
            .and_opt("production_date >= ?", filter.date_from)
            .and_opt("production_date <= ?", filter.date_to)
            .and_opt("diameter = ?", filter.diameter)
            .and_opt("production_order_id = ?", filter.production_order_id);
        let where_sql = b.where_sql();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM pipes{}", where_sql),
            b.params().as_slice(),
            |row| row.get(0),
        )?;

        let sql = format!(
            "{}{} ORDER BY production_date DESC, id DESC LIMIT ? OFFSET ?",
            PIPE_COLUMNS, where_sql
        );
        let limit = page.per_page as i64;
        let offset = page.offset();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(b.params_with(&[&limit, &offset]).as_slice(), map_pipe)?;
        let items = rows.collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    /// Pipes produced on one day, by shift then no_code
    pub fn list_by_production_date(&self, date: NaiveDate) -> RepositoryResult<Vec<Pipe>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE production_date = ?1 ORDER BY shift ASC, no_code ASC",
            PIPE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![date], map_pipe)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Pipes of one production order by no_code
    pub fn list_by_order(&self, order_id: i64) -> RepositoryResult<Vec<Pipe>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE production_order_id = ?1 ORDER BY no_code ASC",
            PIPE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![order_id], map_pipe)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_by_order(&self, order_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM pipes WHERE production_order_id = ?1",
            params![order_id],
            |row| row.get(0),
        )?)
    }

    pub fn recent(&self, limit: usize) -> RepositoryResult<Vec<Pipe>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY created_at DESC, id DESC LIMIT ?1", PIPE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], map_pipe)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete a pipe; stages and history cascade
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM pipes WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Pipe", id));
        }
        Ok(())
    }
}

pub(super) fn map_pipe(row: &Row<'_>) -> rusqlite::Result<Pipe> {
    Ok(Pipe {
        id: row.get(0)?,
        production_date: row.get(1)?,
        shift: row.get(2)?,
        shift_engineer: row.get(3)?,
        manufacturing_order: row.get(4)?,
        no_code: row.get(5)?,
        pipe_code: row.get(6)?,
        arrange_pipe: row.get(7)?,
        ladle_id: row.get(8)?,
        diameter: row.get(9)?,
        pipe_type: row.get(10)?,
        machine_id: row.get(11)?,
        mold_number: row.get(12)?,
        iso_weight: row.get(13)?,
        actual_weight: row.get(14)?,
        thickness: row.get(15)?,
        created_at: row.get(16)?,
        created_by: row.get(17)?,
        production_order_id: row.get(18)?,
    })
}
