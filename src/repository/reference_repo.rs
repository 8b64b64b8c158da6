// ==========================================
// Foundry QC Tracker - reference data repository
// ==========================================
// Read-only access to the lookup tables.
// Loaded once at startup into ReferenceData.
// ==========================================

use crate::domain::reference::{
    DecisionType, DefectType, ElementSpecification, Engineer, Furnace, Machine, MechanicalRule,
    ReferenceData, Shift,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct ReferenceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReferenceRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Snapshot of every lookup table
    pub fn load_all(&self) -> RepositoryResult<ReferenceData> {
        let conn = self.get_conn()?;
        let data = ReferenceData {
            furnaces: load_furnaces(&conn)?,
            machines: load_machines(&conn)?,
            defect_types: load_defect_types(&conn)?,
            decision_types: load_decision_types(&conn)?,
            element_specifications: load_element_specifications(&conn)?,
            mechanical_rules: load_mechanical_rules(&conn)?,
            shifts: load_shifts(&conn)?,
            engineers: load_engineers(&conn)?,
        };
        tracing::debug!(
            furnaces = data.furnaces.len(),
            machines = data.machines.len(),
            specifications = data.element_specifications.len(),
            mechanical_rules = data.mechanical_rules.len(),
            "reference data loaded"
        );
        Ok(data)
    }

    pub fn element_specifications(&self) -> RepositoryResult<Vec<ElementSpecification>> {
        let conn = self.get_conn()?;
        load_element_specifications(&conn)
    }
}

fn load_furnaces(conn: &Connection) -> RepositoryResult<Vec<Furnace>> {
    let mut stmt = conn.prepare(
        "SELECT id, furnace_code, furnace_name, is_active FROM furnaces ORDER BY furnace_code",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Furnace {
            id: row.get(0)?,
            furnace_code: row.get(1)?,
            furnace_name: row.get(2)?,
            is_active: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn load_machines(conn: &Connection) -> RepositoryResult<Vec<Machine>> {
    let mut stmt = conn.prepare(
        "SELECT id, machine_code, machine_name, stage, is_active FROM machines ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Machine {
            id: row.get(0)?,
            machine_code: row.get(1)?,
            machine_name: row.get(2)?,
            stage: row.get(3)?,
            is_active: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn load_defect_types(conn: &Connection) -> RepositoryResult<Vec<DefectType>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, defect_code, defect_name_ar, defect_name_en, applies_to_stages, is_active
        FROM defect_types
        ORDER BY id
        "#,
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            DefectType {
                id: row.get(0)?,
                defect_code: row.get(1)?,
                defect_name_ar: row.get(2)?,
                defect_name_en: row.get(3)?,
                applies_to_stages: Vec::new(),
                is_active: row.get(5)?,
            },
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (mut defect, applies_json) = row?;
        defect.applies_to_stages = serde_json::from_str(&applies_json).map_err(|e| {
            RepositoryError::FieldValueError {
                field: "applies_to_stages".to_string(),
                message: format!("defect_type {}: {}", defect.id, e),
            }
        })?;
        out.push(defect);
    }
    Ok(out)
}

fn load_decision_types(conn: &Connection) -> RepositoryResult<Vec<DecisionType>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, decision_code, decision_name_ar, decision_name_en, color_code
        FROM decision_types
        ORDER BY id
        "#,
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DecisionType {
            id: row.get(0)?,
            decision_code: row.get(1)?,
            decision_name_ar: row.get(2)?,
            decision_name_en: row.get(3)?,
            color_code: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn load_element_specifications(conn: &Connection) -> RepositoryResult<Vec<ElementSpecification>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, element_code, element_name, min_value, max_value, unit
        FROM element_specifications
        ORDER BY id
        "#,
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ElementSpecification {
            id: row.get(0)?,
            element_code: row.get(1)?,
            element_name: row.get(2)?,
            min_value: row.get(3)?,
            max_value: row.get(4)?,
            unit: row.get(5)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn load_mechanical_rules(conn: &Connection) -> RepositoryResult<Vec<MechanicalRule>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, property_code, property_name, property_name_ar, unit,
               min_value, max_value, decision_code
        FROM mechanical_rules
        ORDER BY id
        "#,
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(MechanicalRule {
            id: row.get(0)?,
            property_code: row.get(1)?,
            property_name: row.get(2)?,
            property_name_ar: row.get(3)?,
            unit: row.get(4)?,
            min_value: row.get(5)?,
            max_value: row.get(6)?,
            decision_code: row.get(7)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn load_shifts(conn: &Connection) -> RepositoryResult<Vec<Shift>> {
    let mut stmt = conn.prepare(
        "SELECT id, shift_number, shift_name, start_time, end_time FROM shifts ORDER BY shift_number",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Shift {
            id: row.get(0)?,
            shift_number: row.get(1)?,
            shift_name: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn load_engineers(conn: &Connection) -> RepositoryResult<Vec<Engineer>> {
    let mut stmt =
        conn.prepare("SELECT id, name, name_ar, role, is_active FROM engineers ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Engineer {
            id: row.get(0)?,
            name: row.get(1)?,
            name_ar: row.get(2)?,
            role: row.get(3)?,
            is_active: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema, seed::seed_reference_data};

    fn seeded() -> ReferenceRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        seed_reference_data(&conn).unwrap();
        ReferenceRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_load_all_seeded() {
        let data = seeded().load_all().unwrap();
        assert_eq!(data.furnaces.len(), 4);
        assert_eq!(data.furnaces[0].furnace_code, "A1");
        assert_eq!(data.shifts.len(), 3);
        assert_eq!(data.decision_types.len(), 8);

        let ce = data.specification("CE").unwrap();
        assert_eq!(ce.min_value, Some(3.62));
        assert_eq!(ce.max_value, Some(4.83));
        let cu = data.specification("Cu").unwrap();
        assert_eq!(cu.min_value, None);

        let sand = data
            .defect_types
            .iter()
            .find(|d| d.defect_name_en.as_deref() == Some("Sand"))
            .unwrap();
        assert!(sand.applies_to("CCM"));
        assert!(!sand.applies_to("Finish"));
    }

    #[test]
    fn test_mechanical_rules_keep_band_order() {
        let data = seeded().load_all().unwrap();
        let hardness: Vec<&str> = data
            .mechanical_rules_for("hardness")
            .map(|r| r.decision_code.as_str())
            .collect();
        assert_eq!(
            hardness,
            vec!["ACCEPT", "INSPECT_FIRST_LAST", "INSPECT_100", "REJECT"]
        );
        let first = data.mechanical_rules_for("tensile_strength").next().unwrap();
        assert_eq!(first.min_value, Some(42.0));
        assert_eq!(first.max_value, None);
    }

    #[test]
    fn test_machines_keep_stage() {
        let data = seeded().load_all().unwrap();
        let bc1 = data
            .machines
            .iter()
            .find(|m| m.machine_code == "BC1")
            .unwrap();
        assert_eq!(bc1.stage.as_deref(), Some("Coating"));
    }
}
