// ==========================================
// Foundry QC Tracker - mechanical test repository
// ==========================================
// Table: mechanical_tests
// Derived results are stored as computed by the caller
// ==========================================

use crate::domain::mechanical::{
    DerivedResults, MechanicalFilter, MechanicalTest, Microstructure, SampleMeasurements,
};
use crate::domain::types::{Page, PageRequest};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::FilterBuilder;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(test)]
mod tests;

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, test_date, test_number, diameter, code, pipe_no, ladle_id,
        sample_thickness, d1, d2, d3, original_length, final_length, area_d_squared, force_kgf,
        avg_dimension, elongation, tensile_strength,
        microstructure, percent_85, percent_70, percent_40, percent_1,
        nodularity_percent, nodule_count, hardness, carbides,
        shift, tester_name, decision, reason, has_defect, defect_reason, comments,
        created_at, created_by
    FROM mechanical_tests
"#;

pub struct MechanicalTestRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MechanicalTestRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert a test; `test.id` is ignored
    pub fn insert(&self, test: &MechanicalTest) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let m = &test.measurements;
        let r = &test.derived;
        let s = &test.structure;
        conn.execute(
            r#"
            INSERT INTO mechanical_tests (
                test_date, test_number, diameter, code, pipe_no, ladle_id,
                sample_thickness, d1, d2, d3, original_length, final_length, area_d_squared, force_kgf,
                avg_dimension, elongation, tensile_strength,
                microstructure, percent_85, percent_70, percent_40, percent_1,
                nodularity_percent, nodule_count, hardness, carbides,
                shift, tester_name, decision, reason, has_defect, defect_reason, comments,
                created_at, created_by
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                ?15, ?16, ?17,
                ?18, ?19, ?20, ?21, ?22,
                ?23, ?24, ?25, ?26,
                ?27, ?28, ?29, ?30, ?31, ?32, ?33,
                ?34, ?35
            )
            "#,
            params![
                test.test_date,
                test.test_number,
                test.diameter,
                test.code,
                test.pipe_no,
                test.ladle_id,
                m.sample_thickness,
                m.d1,
                m.d2,
                m.d3,
                m.original_length,
                m.final_length,
                m.area_d_squared,
                m.force_kgf,
                r.avg_dimension,
                r.elongation,
                r.tensile_strength,
                s.microstructure,
                s.percent_85,
                s.percent_70,
                s.percent_40,
                s.percent_1,
                s.nodularity_percent,
                s.nodule_count,
                s.hardness,
                s.carbides,
                test.shift,
                test.tester_name,
                test.decision,
                test.reason,
                test.has_defect,
                test.defect_reason,
                test.comments,
                test.created_at,
                test.created_by,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Overwrite every editable column; created_at / created_by are kept
    pub fn update(&self, test: &MechanicalTest) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let m = &test.measurements;
        let r = &test.derived;
        let s = &test.structure;
        let affected = conn.execute(
            r#"
            UPDATE mechanical_tests SET
                test_date = ?1, test_number = ?2, diameter = ?3, code = ?4, pipe_no = ?5, ladle_id = ?6,
                sample_thickness = ?7, d1 = ?8, d2 = ?9, d3 = ?10,
                original_length = ?11, final_length = ?12, area_d_squared = ?13, force_kgf = ?14,
                avg_dimension = ?15, elongation = ?16, tensile_strength = ?17,
                microstructure = ?18, percent_85 = ?19, percent_70 = ?20, percent_40 = ?21, percent_1 = ?22,
                nodularity_percent = ?23, nodule_count = ?24, hardness = ?25, carbides = ?26,
                shift = ?27, tester_name = ?28, decision = ?29, reason = ?30,
                has_defect = ?31, defect_reason = ?32, comments = ?33
            WHERE id = ?34
            "#,
            params![
                test.test_date,
                test.test_number,
                test.diameter,
                test.code,
                test.pipe_no,
                test.ladle_id,
                m.sample_thickness,
                m.d1,
                m.d2,
                m.d3,
                m.original_length,
                m.final_length,
                m.area_d_squared,
                m.force_kgf,
                r.avg_dimension,
                r.elongation,
                r.tensile_strength,
                s.microstructure,
                s.percent_85,
                s.percent_70,
                s.percent_40,
                s.percent_1,
                s.nodularity_percent,
                s.nodule_count,
                s.hardness,
                s.carbides,
                test.shift,
                test.tester_name,
                test.decision,
                test.reason,
                test.has_defect,
                test.defect_reason,
                test.comments,
                test.id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("MechanicalTest", test.id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MechanicalTest>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_row).optional()?)
    }

    pub fn list(
        &self,
        filter: &MechanicalFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<MechanicalTest>> {
        let conn = self.get_conn()?;
        let b = build_filter(filter);
        let where_sql = b.where_sql();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM mechanical_tests{}", where_sql),
            b.params().as_slice(),
            |row| row.get(0),
        )?;

        let sql = format!(
            "{}{} ORDER BY test_date DESC, id DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS, where_sql
        );
        let limit = page.per_page as i64;
        let offset = page.offset();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(b.params_with(&[&limit, &offset]).as_slice(), map_row)?;
        let items = rows.collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    /// Every matching row, oldest first (CSV export)
    pub fn list_all(&self, filter: &MechanicalFilter) -> RepositoryResult<Vec<MechanicalTest>> {
        let conn = self.get_conn()?;
        let b = build_filter(filter);
        let sql = format!(
            "{}{} ORDER BY test_date ASC, id ASC",
            SELECT_COLUMNS,
            b.where_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(b.params().as_slice(), map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM mechanical_tests WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("MechanicalTest", id));
        }
        Ok(())
    }
}

fn build_filter(filter: &MechanicalFilter) -> FilterBuilder {
    let mut b = FilterBuilder::new();
    b.and_opt("ladle_id = ?", filter.ladle_id.clone())
        .and_opt("test_date >= ?", filter.date_from)
        .and_opt("test_date <= ?", filter.date_to)
        .and_opt("decision = ?", filter.decision.clone());
    b
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<MechanicalTest> {
    Ok(MechanicalTest {
        id: row.get(0)?,
        test_date: row.get(1)?,
        test_number: row.get(2)?,
        diameter: row.get(3)?,
        code: row.get(4)?,
        pipe_no: row.get(5)?,
        ladle_id: row.get(6)?,
        measurements: SampleMeasurements {
            sample_thickness: row.get(7)?,
            d1: row.get(8)?,
            d2: row.get(9)?,
            d3: row.get(10)?,
            original_length: row.get(11)?,
            final_length: row.get(12)?,
            area_d_squared: row.get(13)?,
            force_kgf: row.get(14)?,
        },
        derived: DerivedResults {
            avg_dimension: row.get(15)?,
            elongation: row.get(16)?,
            tensile_strength: row.get(17)?,
        },
        structure: Microstructure {
            microstructure: row.get(18)?,
            percent_85: row.get(19)?,
            percent_70: row.get(20)?,
            percent_40: row.get(21)?,
            percent_1: row.get(22)?,
            nodularity_percent: row.get(23)?,
            nodule_count: row.get(24)?,
            hardness: row.get(25)?,
            carbides: row.get(26)?,
        },
        shift: row.get(27)?,
        tester_name: row.get(28)?,
        decision: row.get(29)?,
        reason: row.get(30)?,
        has_defect: row.get(31)?,
        defect_reason: row.get(32)?,
        comments: row.get(33)?,
        created_at: row.get(34)?,
        created_by: row.get(35)?,
    })
}
