use super::MechanicalTestRepository;
use crate::domain::mechanical::{
    DerivedResults, MechanicalFilter, MechanicalTest, Microstructure, SampleMeasurements,
};
use crate::domain::types::PageRequest;
use crate::repository::error::RepositoryError;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO chemical_analyses (test_date, ladle_no, day, month, year, ladle_id, has_defect, created_at)
        VALUES ('2025-01-13', 47, 13, 1, 2025, '4713012025', 0, '2025-01-13T08:00:00');
        "#,
    )
    .unwrap();
    Arc::new(Mutex::new(conn))
}

fn make_test(day: u32, ladle_id: Option<&str>, decision: Option<&str>) -> MechanicalTest {
    MechanicalTest {
        id: 0,
        test_date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
        test_number: Some(format!("T-{}", day)),
        diameter: Some(600),
        code: None,
        pipe_no: Some("N8739".to_string()),
        ladle_id: ladle_id.map(str::to_string),
        measurements: SampleMeasurements {
            d1: Some(5.0),
            d2: Some(5.2),
            d3: Some(5.1),
            original_length: Some(50.0),
            final_length: Some(55.0),
            area_d_squared: Some(20.0),
            force_kgf: Some(860.0),
            ..Default::default()
        },
        derived: DerivedResults {
            avg_dimension: Some(5.1),
            elongation: Some(10.0),
            tensile_strength: Some(43.0),
        },
        structure: Microstructure {
            nodularity_percent: Some(85.0),
            nodule_count: Some(180),
            ..Default::default()
        },
        shift: Some(2),
        tester_name: Some("lab".to_string()),
        decision: decision.map(str::to_string),
        reason: None,
        has_defect: false,
        defect_reason: None,
        comments: None,
        created_at: Utc::now().naive_utc(),
        created_by: Some("lab".to_string()),
    }
}

#[test]
fn test_insert_find_update_delete() {
    let repo = MechanicalTestRepository::new(setup_test_db());
    let id = repo.insert(&make_test(13, Some("4713012025"), None)).unwrap();

    let mut found = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(found.derived.elongation, Some(10.0));
    assert_eq!(found.structure.nodule_count, Some(180));
    assert_eq!(found.measurements.force_kgf, Some(860.0));

    found.decision = Some("ACCEPT".to_string());
    found.comments = Some("ok".to_string());
    repo.update(&found).unwrap();
    let reread = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(reread.decision.as_deref(), Some("ACCEPT"));
    assert_eq!(reread.created_by.as_deref(), Some("lab"));

    repo.delete(id).unwrap();
    assert!(repo.find_by_id(id).unwrap().is_none());
    assert!(matches!(repo.delete(id).unwrap_err(), RepositoryError::NotFound { .. }));
}

#[test]
fn test_unknown_ladle_is_rejected() {
    let repo = MechanicalTestRepository::new(setup_test_db());
    let err = repo.insert(&make_test(13, Some("1111111111"), None)).unwrap_err();
    assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
}

#[test]
fn test_list_filters() {
    let repo = MechanicalTestRepository::new(setup_test_db());
    repo.insert(&make_test(13, Some("4713012025"), Some("ACCEPT"))).unwrap();
    repo.insert(&make_test(14, None, Some("REJECT"))).unwrap();
    repo.insert(&make_test(15, None, Some("ACCEPT"))).unwrap();

    let accepted = repo
        .list(
            &MechanicalFilter {
                decision: Some("ACCEPT".to_string()),
                ..Default::default()
            },
            PageRequest::new(1, 20),
        )
        .unwrap();
    assert_eq!(accepted.total, 2);
    assert_eq!(accepted.items[0].test_number.as_deref(), Some("T-15"));

    let by_ladle = repo
        .list_all(&MechanicalFilter {
            ladle_id: Some("4713012025".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_ladle.len(), 1);

    let all = repo.list_all(&MechanicalFilter::default()).unwrap();
    assert_eq!(all.first().unwrap().test_number.as_deref(), Some("T-13"));
}
