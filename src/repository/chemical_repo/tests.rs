use super::ChemicalAnalysisRepository;
use crate::domain::chemical::{ChemicalAnalysis, ChemicalFilter, ElementReadings, Equivalents};
use crate::domain::types::PageRequest;
use crate::repository::error::RepositoryError;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    crate::db::seed::seed_reference_data(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn make_analysis(ladle_no: i32, date: NaiveDate, decision: Option<&str>) -> ChemicalAnalysis {
    use chrono::Datelike;
    ChemicalAnalysis {
        id: 0,
        test_date: date,
        furnace_id: Some(1),
        ladle_no,
        day: date.day(),
        month: date.month(),
        year: date.year(),
        ladle_id: format!("{}{:02}{:02}{:04}", ladle_no, date.day(), date.month(), date.year()),
        readings: ElementReadings {
            carbon: Some(3.5),
            silicon: Some(2.1),
            ..Default::default()
        },
        equivalents: Equivalents {
            carbon_equivalent: Some(4.2),
            ..Default::default()
        },
        engineer_notes: None,
        decision: decision.map(str::to_string),
        reason: None,
        has_defect: false,
        defect_reason: None,
        notes: None,
        created_at: Utc::now().naive_utc(),
        created_by: Some("lab1".to_string()),
    }
}

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

#[test]
fn test_insert_and_find() {
    let repo = ChemicalAnalysisRepository::new(setup_test_db());
    let id = repo.insert(&make_analysis(47, d(13), Some("ACCEPT"))).unwrap();

    let found = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(found.ladle_id, "4713012025");
    assert_eq!(found.readings.carbon, Some(3.5));
    assert_eq!(found.equivalents.carbon_equivalent, Some(4.2));
    assert_eq!(found.test_date, d(13));

    let by_ladle = repo.find_by_ladle_id("4713012025").unwrap().unwrap();
    assert_eq!(by_ladle.id, id);
    assert!(repo.exists_ladle_id("4713012025").unwrap());
    assert_eq!(
        repo.find_decision_by_ladle_id("4713012025").unwrap().as_deref(),
        Some("ACCEPT")
    );
    assert!(repo.find_by_id(id + 100).unwrap().is_none());
}

#[test]
fn test_duplicate_ladle_id_is_unique_violation() {
    let repo = ChemicalAnalysisRepository::new(setup_test_db());
    repo.insert(&make_analysis(47, d(13), None)).unwrap();
    let err = repo.insert(&make_analysis(47, d(13), None)).unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
}

#[test]
fn test_max_ladle_no_is_per_date() {
    let repo = ChemicalAnalysisRepository::new(setup_test_db());
    assert_eq!(repo.max_ladle_no_for_date(d(13)).unwrap(), None);
    repo.insert(&make_analysis(1, d(13), None)).unwrap();
    repo.insert(&make_analysis(2, d(13), None)).unwrap();
    repo.insert(&make_analysis(9, d(14), None)).unwrap();
    assert_eq!(repo.max_ladle_no_for_date(d(13)).unwrap(), Some(2));
    assert_eq!(repo.max_ladle_no_for_date(d(14)).unwrap(), Some(9));
}

#[test]
fn test_update_and_delete() {
    let repo = ChemicalAnalysisRepository::new(setup_test_db());
    let id = repo.insert(&make_analysis(3, d(13), None)).unwrap();

    let mut a = repo.find_by_id(id).unwrap().unwrap();
    a.readings.sulfur = Some(0.05);
    a.decision = Some("REJECT".to_string());
    a.has_defect = true;
    repo.update(&a).unwrap();

    let reloaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(reloaded.readings.sulfur, Some(0.05));
    assert!(reloaded.has_defect);

    repo.delete(id).unwrap();
    assert!(repo.find_by_id(id).unwrap().is_none());
    assert!(matches!(repo.delete(id), Err(RepositoryError::NotFound { .. })));
}

#[test]
fn test_list_filters_and_pages() {
    let repo = ChemicalAnalysisRepository::new(setup_test_db());
    for n in 1..=5 {
        repo.insert(&make_analysis(n, d(13), Some("ACCEPT"))).unwrap();
    }
    repo.insert(&make_analysis(1, d(14), Some("REJECT"))).unwrap();

    let all = repo
        .list(&ChemicalFilter::default(), PageRequest::new(1, 4))
        .unwrap();
    assert_eq!(all.total, 6);
    assert_eq!(all.items.len(), 4);
    // newest date first
    assert_eq!(all.items[0].test_date, d(14));

    let second = repo
        .list(&ChemicalFilter::default(), PageRequest::new(2, 4))
        .unwrap();
    assert_eq!(second.items.len(), 2);

    let rejected = repo
        .list(
            &ChemicalFilter {
                decision: Some("REJECT".to_string()),
                ..Default::default()
            },
            PageRequest::new(1, 20),
        )
        .unwrap();
    assert_eq!(rejected.total, 1);

    let day13 = repo
        .list_all(&ChemicalFilter {
            date_from: Some(d(13)),
            date_to: Some(d(13)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(day13.len(), 5);
    assert_eq!(day13[0].ladle_no, 1);
}
