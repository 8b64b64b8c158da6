// ==========================================
// Foundry QC Tracker - dashboard aggregates
// ==========================================
// Count queries over chemical_analyses, pipes, mechanical_tests.
// The window covers window_start..=as_of.
// ==========================================

use crate::domain::dashboard::{DecisionCount, FurnaceCount};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

/// Aggregates for one dashboard window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardCounts {
    pub analyses_today: i64,
    pub analyses_in_window: i64,
    pub defective_analyses_in_window: i64,
    pub decided_in_window: i64,
    pub accepted_in_window: i64,
    pub pipes_today: i64,
    pub pipes_in_window: i64,
    pub mechanical_tests_today: i64,
    pub mechanical_tests_in_window: i64,
    pub by_furnace: Vec<FurnaceCount>,
    pub by_decision: Vec<DecisionCount>,
}

pub struct DashboardRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DashboardRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn counts(&self, as_of: NaiveDate, window_start: NaiveDate) -> RepositoryResult<DashboardCounts> {
        let conn = self.get_conn()?;

        let count = |sql: &str, p: &[&dyn rusqlite::ToSql]| -> RepositoryResult<i64> {
            Ok(conn.query_row(sql, p, |row| row.get(0))?)
        };

        let analyses_today = count(
            "SELECT COUNT(*) FROM chemical_analyses WHERE test_date = ?1",
            params![as_of],
        )?;
        let analyses_in_window = count(
            "SELECT COUNT(*) FROM chemical_analyses WHERE test_date >= ?1 AND test_date <= ?2",
            params![window_start, as_of],
        )?;
        let defective_analyses_in_window = count(
            "SELECT COUNT(*) FROM chemical_analyses WHERE test_date >= ?1 AND test_date <= ?2 AND has_defect = 1",
            params![window_start, as_of],
        )?;
        let decided_in_window = count(
            "SELECT COUNT(*) FROM chemical_analyses WHERE test_date >= ?1 AND test_date <= ?2 AND decision IS NOT NULL",
            params![window_start, as_of],
        )?;
        let accepted_in_window = count(
            "SELECT COUNT(*) FROM chemical_analyses WHERE test_date >= ?1 AND test_date <= ?2 AND decision = 'ACCEPT'",
            params![window_start, as_of],
        )?;

        let pipes_today = count(
            "SELECT COUNT(*) FROM pipes WHERE production_date = ?1",
            params![as_of],
        )?;
        let pipes_in_window = count(
            "SELECT COUNT(*) FROM pipes WHERE production_date >= ?1 AND production_date <= ?2",
            params![window_start, as_of],
        )?;
        let mechanical_tests_today = count(
            "SELECT COUNT(*) FROM mechanical_tests WHERE test_date = ?1",
            params![as_of],
        )?;
        let mechanical_tests_in_window = count(
            "SELECT COUNT(*) FROM mechanical_tests WHERE test_date >= ?1 AND test_date <= ?2",
            params![window_start, as_of],
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT f.furnace_code, COUNT(c.id)
            FROM chemical_analyses c
            JOIN furnaces f ON f.id = c.furnace_id
            WHERE c.test_date >= ?1 AND c.test_date <= ?2
            GROUP BY f.furnace_code
            ORDER BY f.furnace_code
            "#,
        )?;
        let by_furnace = stmt
            .query_map(params![window_start, as_of], |row| {
                Ok(FurnaceCount {
                    furnace_code: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT decision, COUNT(*)
            FROM chemical_analyses
            WHERE test_date >= ?1 AND test_date <= ?2 AND decision IS NOT NULL
            GROUP BY decision
            ORDER BY COUNT(*) DESC, decision ASC
            "#,
        )?;
        let by_decision = stmt
            .query_map(params![window_start, as_of], |row| {
                Ok(DecisionCount {
                    decision: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DashboardCounts {
            analyses_today,
            analyses_in_window,
            defective_analyses_in_window,
            decided_in_window,
            accepted_in_window,
            pipes_today,
            pipes_in_window,
            mechanical_tests_today,
            mechanical_tests_in_window,
            by_furnace,
            by_decision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        crate::db::seed::seed_reference_data(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO chemical_analyses (test_date, furnace_id, ladle_no, day, month, year, ladle_id, decision, has_defect, created_at)
            VALUES
                ('2025-01-13', 1, 1, 13, 1, 2025, '113012025', 'ACCEPT', 0, '2025-01-13T08:00:00'),
                ('2025-01-13', 1, 2, 13, 1, 2025, '213012025', 'REJECT', 1, '2025-01-13T09:00:00'),
                ('2025-01-10', 2, 1, 10, 1, 2025, '110012025', 'ACCEPT', 0, '2025-01-10T09:00:00'),
                ('2025-01-09', 2, 2, 9, 1, 2025, '209012025', NULL, 0, '2025-01-09T09:00:00'),
                ('2024-12-01', 2, 1, 1, 12, 2024, '101122024', 'ACCEPT', 0, '2024-12-01T09:00:00');
            INSERT INTO pipes (production_date, no_code, created_at)
            VALUES ('2025-01-13', 'N1', '2025-01-13T10:00:00'), ('2025-01-08', 'N2', '2025-01-08T10:00:00');
            INSERT INTO mechanical_tests (test_date, has_defect, created_at)
            VALUES ('2025-01-13', 0, '2025-01-13T11:00:00');
            "#,
        )
        .unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_counts_window() {
        let repo = DashboardRepository::new(setup_test_db());
        let as_of = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let c = repo.counts(as_of, start).unwrap();

        assert_eq!(c.analyses_today, 2);
        assert_eq!(c.analyses_in_window, 4);
        assert_eq!(c.defective_analyses_in_window, 1);
        assert_eq!(c.decided_in_window, 3);
        assert_eq!(c.accepted_in_window, 2);
        assert_eq!(c.pipes_today, 1);
        assert_eq!(c.pipes_in_window, 2);
        assert_eq!(c.mechanical_tests_today, 1);
        assert_eq!(c.mechanical_tests_in_window, 1);

        assert_eq!(c.by_furnace.len(), 2);
        assert_eq!(c.by_furnace[0].count, 2);
        assert_eq!(c.by_decision[0].decision, "ACCEPT");
        assert_eq!(c.by_decision[0].count, 2);
    }

    #[test]
    fn test_counts_empty_db() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = DashboardRepository::new(Arc::new(Mutex::new(conn)));
        let day = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        assert_eq!(repo.counts(day, day).unwrap(), DashboardCounts::default());
    }
}
