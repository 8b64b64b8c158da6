// ==========================================
// Foundry QC Tracker - chemical analysis repository
// ==========================================
// Table: chemical_analyses (ladle_id UNIQUE)
// No business rules here: validation and derived values come from the API layer
// ==========================================

use crate::domain::chemical::{ChemicalAnalysis, ChemicalFilter, ElementReadings, Equivalents};
use crate::domain::types::{Page, PageRequest};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::FilterBuilder;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(test)]
mod tests;

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, test_date, furnace_id, ladle_no, day, month, year, ladle_id,
        carbon, silicon, magnesium, copper, chromium,
        sulfur, manganese, phosphorus, lead, aluminum,
        carbon_equivalent, manganese_equivalent, magnesium_equivalent,
        engineer_notes, decision, reason, has_defect, defect_reason, notes,
        created_at, created_by
    FROM chemical_analyses
"#;

pub struct ChemicalAnalysisRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ChemicalAnalysisRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert an analysis; `analysis.id` is ignored
    ///
    /// # Returns
    /// - new row id
    /// - UniqueConstraintViolation when the ladle_id already exists
    pub fn insert(&self, analysis: &ChemicalAnalysis) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let r = &analysis.readings;
        let e = &analysis.equivalents;
        conn.execute(
            r#"
            INSERT INTO chemical_analyses (
                test_date, furnace_id, ladle_no, day, month, year, ladle_id,
                carbon, silicon, magnesium, copper, chromium,
                sulfur, manganese, phosphorus, lead, aluminum,
                carbon_equivalent, manganese_equivalent, magnesium_equivalent,
                engineer_notes, decision, reason, has_defect, defect_reason, notes,
                created_at, created_by
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17,
                ?18, ?19, ?20,
                ?21, ?22, ?23, ?24, ?25, ?26,
                ?27, ?28
            )
            "#,
            params![
                analysis.test_date,
                analysis.furnace_id,
                analysis.ladle_no,
                analysis.day,
                analysis.month,
                analysis.year,
                analysis.ladle_id,
                r.carbon,
                r.silicon,
                r.magnesium,
                r.copper,
                r.chromium,
                r.sulfur,
                r.manganese,
                r.phosphorus,
                r.lead,
                r.aluminum,
                e.carbon_equivalent,
                e.manganese_equivalent,
                e.magnesium_equivalent,
                analysis.engineer_notes,
                analysis.decision,
                analysis.reason,
                analysis.has_defect,
                analysis.defect_reason,
                analysis.notes,
                analysis.created_at,
                analysis.created_by,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Update readings, derived values and QC fields; identification is fixed
    pub fn update(&self, analysis: &ChemicalAnalysis) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let r = &analysis.readings;
        let e = &analysis.equivalents;
        let affected = conn.execute(
            r#"
            UPDATE chemical_analyses SET
                furnace_id = ?2,
                carbon = ?3, silicon = ?4, magnesium = ?5, copper = ?6, chromium = ?7,
                sulfur = ?8, manganese = ?9, phosphorus = ?10, lead = ?11, aluminum = ?12,
                carbon_equivalent = ?13, manganese_equivalent = ?14, magnesium_equivalent = ?15,
                engineer_notes = ?16, decision = ?17, reason = ?18,
                has_defect = ?19, defect_reason = ?20, notes = ?21
            WHERE id = ?1
            "#,
            params![
                analysis.id,
                analysis.furnace_id,
                r.carbon,
                r.silicon,
                r.magnesium,
                r.copper,
                r.chromium,
                r.sulfur,
                r.manganese,
                r.phosphorus,
                r.lead,
                r.aluminum,
                e.carbon_equivalent,
                e.manganese_equivalent,
                e.magnesium_equivalent,
                analysis.engineer_notes,
                analysis.decision,
                analysis.reason,
                analysis.has_defect,
                analysis.defect_reason,
                analysis.notes,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("ChemicalAnalysis", analysis.id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ChemicalAnalysis>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_row).optional()?)
    }

    pub fn find_by_ladle_id(&self, ladle_id: &str) -> RepositoryResult<Option<ChemicalAnalysis>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE ladle_id = ?1", SELECT_COLUMNS);
        Ok(conn.query_row(&sql, params![ladle_id], map_row).optional()?)
    }

    /// Decision of the analysis for a ladle (None: no analysis or no decision)
    pub fn find_decision_by_ladle_id(&self, ladle_id: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let decision: Option<Option<String>> = conn
            .query_row(
                "SELECT decision FROM chemical_analyses WHERE ladle_id = ?1",
                params![ladle_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(decision.flatten())
    }

    pub fn exists_ladle_id(&self, ladle_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chemical_analyses WHERE ladle_id = ?1",
            params![ladle_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Highest ladle number recorded for a test date
    pub fn max_ladle_no_for_date(&self, test_date: NaiveDate) -> RepositoryResult<Option<i32>> {
        let conn = self.get_conn()?;
        let max: Option<i32> = conn.query_row(
            "SELECT MAX(ladle_no) FROM chemical_analyses WHERE test_date = ?1",
            params![test_date],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    /// Filtered page, newest test date first
    pub fn list(
        &self,
        filter: &ChemicalFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<ChemicalAnalysis>> {
        let conn = self.get_conn()?;
        let builder = build_filter(filter);
        let where_sql = builder.where_sql();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM chemical_analyses{}", where_sql),
            builder.params().as_slice(),
            |row| row.get(0),
        )?;

        let sql = format!(
            "{}{} ORDER BY test_date DESC, ladle_no DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS, where_sql
        );
        let limit = page.per_page as i64;
        let offset = page.offset();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(builder.params_with(&[&limit, &offset]).as_slice(), map_row)?;
        let items = rows.collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(total, returned = items.len(), "chemical analyses listed");
        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    /// Every matching row, oldest first (report export)
    pub fn list_all(&self, filter: &ChemicalFilter) -> RepositoryResult<Vec<ChemicalAnalysis>> {
        let conn = self.get_conn()?;
        let builder = build_filter(filter);
        let sql = format!(
            "{}{} ORDER BY test_date ASC, ladle_no ASC",
            SELECT_COLUMNS,
            builder.where_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(builder.params().as_slice(), map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Most recently created analyses
    pub fn recent(&self, limit: usize) -> RepositoryResult<Vec<ChemicalAnalysis>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY created_at DESC, id DESC LIMIT ?1", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete by id; ForeignKeyViolation while pipes or tests still reference the ladle
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM chemical_analyses WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("ChemicalAnalysis", id));
        }
        Ok(())
    }
}

fn build_filter(filter: &ChemicalFilter) -> FilterBuilder {
    let mut b = FilterBuilder::new();
    b.and_opt("test_date >= ?", filter.date_from)
        .and_opt("test_date <= ?", filter.date_to)
        .and_opt("furnace_id = ?", filter.furnace_id)
        .and_opt("decision = ?", filter.decision.clone())
        .and_opt("has_defect = ?", filter.has_defect);
    b
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ChemicalAnalysis> {
    Ok(ChemicalAnalysis {
        id: row.get(0)?,
        test_date: row.get(1)?,
        furnace_id: row.get(2)?,
        ladle_no: row.get(3)?,
        day: row.get(4)?,
        month: row.get(5)?,
        year: row.get(6)?,
        ladle_id: row.get(7)?,
        readings: ElementReadings {
            carbon: row.get(8)?,
            silicon: row.get(9)?,
            magnesium: row.get(10)?,
            copper: row.get(11)?,
            chromium: row.get(12)?,
            sulfur: row.get(13)?,
            manganese: row.get(14)?,
            phosphorus: row.get(15)?,
            lead: row.get(16)?,
            aluminum: row.get(17)?,
        },
        equivalents: Equivalents {
            carbon_equivalent: row.get(18)?,
            manganese_equivalent: row.get(19)?,
            magnesium_equivalent: row.get(20)?,
        },
        engineer_notes: row.get(21)?,
        decision: row.get(22)?,
        reason: row.get(23)?,
        has_defect: row.get(24)?,
        defect_reason: row.get(25)?,
        notes: row.get(26)?,
        created_at: row.get(27)?,
        created_by: row.get(28)?,
    })
}
