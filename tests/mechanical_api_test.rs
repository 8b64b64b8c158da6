// ==========================================
// MechanicalApi integration tests
// ==========================================

mod helpers;

use foundry_qc::api::ApiError;
use foundry_qc::domain::mechanical::{MechanicalFilter, MechanicalProperties};
use helpers::api_test_helper::*;
use helpers::test_data_builder::tensile_draft;

fn approx(value: Option<f64>, expected: f64) -> bool {
    value.map(|v| (v - expected).abs() < 1e-9).unwrap_or(false)
}

#[test]
fn test_create_computes_derived_values() {
    let env = ApiTestEnv::new().expect("test env");
    let analysis = env.create_analysis(date(2025, 1, 13), 1);

    let test = env
        .state
        .mechanical_api
        .create(&tensile_draft(date(2025, 1, 14), Some(&analysis.ladle_id)), &operator())
        .unwrap();

    assert!(test.id > 0);
    assert!(approx(test.derived.avg_dimension, 6.2));
    assert!(approx(test.derived.elongation, 10.0));
    assert!(approx(test.derived.tensile_strength, 42.0));

    let stored = env.state.mechanical_api.get(test.id).unwrap();
    assert!(approx(stored.derived.tensile_strength, 42.0));
    assert_eq!(stored.ladle_id.as_deref(), Some(analysis.ladle_id.as_str()));
}

#[test]
fn test_create_rejects_bad_input() {
    let env = ApiTestEnv::new().expect("test env");
    let api = &env.state.mechanical_api;

    let mut no_date = tensile_draft(date(2025, 1, 14), None);
    no_date.test_date = None;
    assert!(matches!(api.create(&no_date, &operator()), Err(ApiError::InvalidInput(_))));

    let unknown_ladle = tensile_draft(date(2025, 1, 14), Some("999999999"));
    assert!(matches!(
        api.create(&unknown_ladle, &operator()),
        Err(ApiError::InvalidInput(_))
    ));

    assert!(matches!(
        api.create(&tensile_draft(date(2025, 1, 14), None), &viewer()),
        Err(ApiError::PermissionDenied(_))
    ));
}

#[test]
fn test_zero_lengths_leave_derived_values_empty() {
    let env = ApiTestEnv::new().expect("test env");
    let mut draft = tensile_draft(date(2025, 1, 14), None);
    draft.measurements.original_length = Some(0.0);
    draft.measurements.area_d_squared = Some(0.0);

    let test = env.state.mechanical_api.create(&draft, &operator()).unwrap();
    assert_eq!(test.derived.elongation, None);
    assert_eq!(test.derived.tensile_strength, None);
}

#[test]
fn test_update_recomputes_and_keeps_date() {
    let env = ApiTestEnv::new().expect("test env");
    let api = &env.state.mechanical_api;
    let created = api
        .create(&tensile_draft(date(2025, 1, 14), None), &operator())
        .unwrap();

    let mut edit = tensile_draft(date(2025, 1, 14), None);
    edit.test_date = None;
    edit.measurements.final_length = Some(60.0);
    edit.decision = Some("REJECT".to_string());

    let updated = api.update(created.id, &edit, &supervisor()).unwrap();
    assert_eq!(updated.test_date, date(2025, 1, 14));
    assert!(approx(updated.derived.elongation, 20.0));
    assert_eq!(updated.decision.as_deref(), Some("REJECT"));
    assert_eq!(updated.created_by.as_deref(), Some("lab.operator"));

    assert!(matches!(
        api.update(424242, &edit, &supervisor()),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_list_and_delete() {
    let env = ApiTestEnv::new().expect("test env");
    let api = &env.state.mechanical_api;
    let analysis = env.create_analysis(date(2025, 1, 13), 1);
    api.create(&tensile_draft(date(2025, 1, 14), Some(&analysis.ladle_id)), &operator())
        .unwrap();
    let other = api
        .create(&tensile_draft(date(2025, 1, 20), None), &operator())
        .unwrap();

    let all = api.list(&MechanicalFilter::default(), None, None).unwrap();
    assert_eq!(all.total, 2);
    assert_eq!(all.items[0].id, other.id);

    let by_ladle = api
        .list(
            &MechanicalFilter {
                ladle_id: Some(analysis.ladle_id.clone()),
                ..Default::default()
            },
            None,
            None,
        )
        .unwrap();
    assert_eq!(by_ladle.total, 1);

    assert!(matches!(
        api.delete(other.id, &operator()),
        Err(ApiError::PermissionDenied(_))
    ));
    api.delete(other.id, &supervisor()).unwrap();
    assert!(matches!(api.get(other.id), Err(ApiError::NotFound(_))));
}

#[test]
fn test_auto_decision_takes_worst_property() {
    let env = ApiTestEnv::new().expect("test env");
    let mut draft = tensile_draft(date(2025, 1, 14), None);
    draft.measurements.final_length = Some(56.0);
    draft.structure.nodularity_percent = Some(65.0);
    draft.structure.hardness = Some(255.0);
    draft.structure.carbides = Some("0.5%".to_string());

    let result = env.state.mechanical_api.auto_decision(&draft);
    assert_eq!(result.recommended_decision.as_deref(), Some("INSPECT_100"));
    assert_eq!(result.decision_priority, 3);
    assert_eq!(result.worst_properties, vec!["hardness"]);
    assert_eq!(result.property_decisions.len(), 5);

    let tensile = result
        .property_decisions
        .iter()
        .find(|p| p.property_code == "tensile_strength")
        .unwrap();
    assert_eq!(tensile.decision, "ACCEPT");
    assert!(tensile.in_spec);

    // nothing is stored
    assert_eq!(
        env.state
            .mechanical_api
            .list(&MechanicalFilter::default(), None, None)
            .unwrap()
            .total,
        0
    );
}

#[test]
fn test_judge_rejects_out_of_band_values() {
    let env = ApiTestEnv::new().expect("test env");
    let api = &env.state.mechanical_api;

    let result = api.judge(&MechanicalProperties {
        tensile_strength: Some(30.0),
        carbides: Some(6.0),
        elongation: Some(12.0),
        ..Default::default()
    });
    assert_eq!(result.recommended_decision.as_deref(), Some("REJECT"));
    assert_eq!(result.worst_properties, vec!["tensile_strength", "carbides"]);

    let empty = api.judge(&MechanicalProperties::default());
    assert!(empty.recommended_decision.is_none());
    assert_eq!(empty.decision_priority, 0);
}
