use super::pipes::PipeRepository;
use crate::domain::pipe::{HistoryAction, PipeStage, StageHistoryEntry};
use crate::domain::report::StageDefect;
use crate::domain::types::Stage;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

const STAGE_COLUMNS: &str = r#"
    SELECT
        id, pipe_id, stage_name, stage_date, decision, reason,
        has_defect, defect_type_id, defect_type, defect_reason,
        machine_id, measurement_type, measurement_value, notes,
        created_at, updated_at, updated_by
    FROM pipe_stages
"#;

const HISTORY_COLUMNS: &str = r#"
    SELECT
        id, pipe_stage_id, pipe_id, stage_name, action,
        stage_date, decision, reason, has_defect, defect_type, defect_reason,
        machine_id, machine_code, measurement_type, measurement_value, notes,
        changed_at, changed_by
    FROM pipe_stage_history
"#;

impl PipeRepository {
    /// Stage rows of a pipe in production order
    pub fn list_stages(&self, pipe_id: i64) -> RepositoryResult<Vec<PipeStage>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE pipe_id = ?1", STAGE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pipe_id], map_stage)?;
        let mut stages = rows.collect::<Result<Vec<_>, _>>()?;
        stages.sort_by_key(|s| s.stage.index());
        Ok(stages)
    }

    /// Stage rows of every pipe linked to a production order
    pub fn list_stages_for_order(&self, order_id: i64) -> RepositoryResult<Vec<PipeStage>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE pipe_id IN (SELECT id FROM pipes WHERE production_order_id = ?1) ORDER BY pipe_id",
            STAGE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![order_id], map_stage)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn find_stage(&self, pipe_id: i64, stage: Stage) -> RepositoryResult<Option<PipeStage>> {
        let conn = self.get_conn()?;
        find_stage_in(&conn, pipe_id, stage)
    }

    /// Insert or replace the row for (pipe_id, stage) and record a history snapshot
    ///
    /// `record.updated_at` / `record.updated_by` become the history
    /// changed_at / changed_by. `id` and `created_at` are ignored on update.
    ///
    /// # Returns
    /// - stored row and whether it was created or updated
    pub fn upsert_stage(&self, record: &PipeStage) -> RepositoryResult<(PipeStage, HistoryAction)> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM pipe_stages WHERE pipe_id = ?1 AND stage_name = ?2",
                params![record.pipe_id, record.stage.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let action = match existing {
            Some(id) => {
                tx.execute(
                    r#"
                    UPDATE pipe_stages SET
                        stage_date = ?1, decision = ?2, reason = ?3,
                        has_defect = ?4, defect_type_id = ?5, defect_type = ?6, defect_reason = ?7,
                        machine_id = ?8, measurement_type = ?9, measurement_value = ?10,
                        notes = ?11, updated_at = ?12, updated_by = ?13
                    WHERE id = ?14
                    "#,
                    params![
                        record.stage_date,
                        record.decision,
                        record.reason,
                        record.has_defect,
                        record.defect_type_id,
                        record.defect_type,
                        record.defect_reason,
                        record.machine_id,
                        record.measurement_type,
                        record.measurement_value,
                        record.notes,
                        record.updated_at,
                        record.updated_by,
                        id,
                    ],
                )?;
                HistoryAction::Update
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO pipe_stages (
                        pipe_id, stage_name, stage_date, decision, reason,
                        has_defect, defect_type_id, defect_type, defect_reason,
                        machine_id, measurement_type, measurement_value, notes,
                        created_at, updated_at, updated_by
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                    "#,
                    params![
                        record.pipe_id,
                        record.stage.as_str(),
                        record.stage_date,
                        record.decision,
                        record.reason,
                        record.has_defect,
                        record.defect_type_id,
                        record.defect_type,
                        record.defect_reason,
                        record.machine_id,
                        record.measurement_type,
                        record.measurement_value,
                        record.notes,
                        record.updated_at,
                        record.updated_at,
                        record.updated_by,
                    ],
                )?;
                HistoryAction::Create
            }
        };

        let stored = find_stage_in(&tx, record.pipe_id, record.stage)?
            .ok_or_else(|| RepositoryError::not_found("PipeStage", record.pipe_id))?;
        insert_history(&tx, &stored, action, record.updated_at, record.updated_by.as_deref())?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::debug!(
            pipe_id = stored.pipe_id,
            stage = %stored.stage,
            action = action.as_str(),
            "stage saved"
        );
        Ok((stored, action))
    }

    /// Remove a stage row, leaving a DELETE snapshot behind
    pub fn delete_stage(
        &self,
        pipe_id: i64,
        stage: Stage,
        changed_at: NaiveDateTime,
        changed_by: Option<&str>,
    ) -> RepositoryResult<PipeStage> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let stored = find_stage_in(&tx, pipe_id, stage)?.ok_or_else(|| {
            RepositoryError::not_found("PipeStage", format!("{}/{}", pipe_id, stage))
        })?;
        insert_history(&tx, &stored, HistoryAction::Delete, changed_at, changed_by)?;
        tx.execute("DELETE FROM pipe_stages WHERE id = ?1", params![stored.id])?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(stored)
    }

    /// Stage rows flagged defective, for pipes produced within [from, to]
    pub fn stage_defects(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<StageDefect>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.id, p.no_code, p.production_date, s.stage_name, s.defect_type, s.defect_reason
            FROM pipe_stages s
            JOIN pipes p ON p.id = s.pipe_id
            WHERE s.has_defect = 1 AND p.production_date >= ?1 AND p.production_date <= ?2
            ORDER BY p.production_date ASC, p.no_code ASC
            "#,
        )?;
        let rows = stmt.query_map(params![from, to], |row| {
            Ok(StageDefect {
                pipe_id: row.get(0)?,
                no_code: row.get(1)?,
                production_date: row.get(2)?,
                stage: stage_column(row, 3)?,
                defect_type: row.get(4)?,
                defect_reason: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// History of a pipe, newest first
    pub fn list_history(&self, pipe_id: i64) -> RepositoryResult<Vec<StageHistoryEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE pipe_id = ?1 ORDER BY changed_at DESC, id DESC",
            HISTORY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pipe_id], map_history)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn find_stage_in(
    conn: &Connection,
    pipe_id: i64,
    stage: Stage,
) -> RepositoryResult<Option<PipeStage>> {
    let sql = format!("{} WHERE pipe_id = ?1 AND stage_name = ?2", STAGE_COLUMNS);
    Ok(conn
        .query_row(&sql, params![pipe_id, stage.as_str()], map_stage)
        .optional()?)
}

fn insert_history(
    conn: &Connection,
    stage: &PipeStage,
    action: HistoryAction,
    changed_at: NaiveDateTime,
    changed_by: Option<&str>,
) -> RepositoryResult<()> {
    let machine_code: Option<String> = match stage.machine_id {
        Some(id) => conn
            .query_row(
                "SELECT machine_code FROM machines WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?,
        None => None,
    };

    conn.execute(
        r#"
        INSERT INTO pipe_stage_history (
            pipe_stage_id, pipe_id, stage_name, action,
            stage_date, decision, reason, has_defect, defect_type, defect_reason,
            machine_id, machine_code, measurement_type, measurement_value, notes,
            changed_at, changed_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
        "#,
        params![
            stage.id,
            stage.pipe_id,
            stage.stage.as_str(),
            action.as_str(),
            stage.stage_date,
            stage.decision,
            stage.reason,
            stage.has_defect,
            stage.defect_type,
            stage.defect_reason,
            stage.machine_id,
            machine_code,
            stage.measurement_type,
            stage.measurement_value,
            stage.notes,
            changed_at,
            changed_by,
        ],
    )?;
    Ok(())
}

fn stage_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Stage> {
    let raw: String = row.get(idx)?;
    Stage::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown stage: {}", raw).into(),
        )
    })
}

fn map_stage(row: &Row<'_>) -> rusqlite::Result<PipeStage> {
    Ok(PipeStage {
        id: row.get(0)?,
        pipe_id: row.get(1)?,
        stage: stage_column(row, 2)?,
        stage_date: row.get(3)?,
        decision: row.get(4)?,
        reason: row.get(5)?,
        has_defect: row.get(6)?,
        defect_type_id: row.get(7)?,
        defect_type: row.get(8)?,
        defect_reason: row.get(9)?,
        machine_id: row.get(10)?,
        measurement_type: row.get(11)?,
        measurement_value: row.get(12)?,
        notes: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
        updated_by: row.get(16)?,
    })
}

fn map_history(row: &Row<'_>) -> rusqlite::Result<StageHistoryEntry> {
    let raw_action: String = row.get(4)?;
    let action = HistoryAction::parse(&raw_action).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown history action: {}", raw_action).into(),
        )
    })?;

    Ok(StageHistoryEntry {
        id: row.get(0)?,
        pipe_stage_id: row.get(1)?,
        pipe_id: row.get(2)?,
        stage: stage_column(row, 3)?,
        action,
        stage_date: row.get(5)?,
        decision: row.get(6)?,
        reason: row.get(7)?,
        has_defect: row.get(8)?,
        defect_type: row.get(9)?,
        defect_reason: row.get(10)?,
        machine_id: row.get(11)?,
        machine_code: row.get(12)?,
        measurement_type: row.get(13)?,
        measurement_value: row.get(14)?,
        notes: row.get(15)?,
        changed_at: row.get(16)?,
        changed_by: row.get(17)?,
    })
}
