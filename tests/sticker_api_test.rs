// ==========================================
// StickerApi integration tests
// ==========================================

mod helpers;

use foundry_qc::api::ApiError;
use foundry_qc::engine::sticker::NO_DECISION;
use helpers::api_test_helper::*;
use helpers::test_data_builder::{good_readings, ChemicalDraftBuilder, PipeBuilder};

#[test]
fn test_sticker_carries_chemical_decision() {
    let env = ApiTestEnv::new().expect("test env");
    let analysis = env
        .state
        .chemical_api
        .create(
            &ChemicalDraftBuilder::new(date(2025, 1, 13))
                .ladle_no(47)
                .readings(good_readings())
                .decision("ACCEPT")
                .build(),
            &operator(),
            "en",
        )
        .unwrap()
        .analysis;
    let pipe = env.create_pipe("N8739", &analysis.ladle_id, date(2025, 1, 13));

    let sticker = env.state.sticker_api.sticker(pipe.id).unwrap();
    assert_eq!(sticker.pipe_id, pipe.id);
    assert_eq!(sticker.payload.decision, "ACCEPT");
    assert_eq!(
        sticker.qr,
        "NC:N8739|L:4713012025|DN:500|T:K9|D:2025-01-13|W:420kg|DEC:ACCEPT"
    );
}

#[test]
fn test_sticker_without_ladle_shows_no_decision() {
    let env = ApiTestEnv::new().expect("test env");
    let pipe = env
        .state
        .pipe_api
        .create(&PipeBuilder::new("N1").date(date(2025, 1, 13)).build(), &operator())
        .unwrap();

    let sticker = env.state.sticker_api.sticker(pipe.id).unwrap();
    assert_eq!(sticker.payload.decision, NO_DECISION);
    assert!(sticker.qr.contains("|L:|"));

    assert!(matches!(
        env.state.sticker_api.sticker(424242),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_search_and_batch() {
    let env = ApiTestEnv::new().expect("test env");
    let analysis = env.create_analysis(date(2025, 1, 13), 1);
    let a = env.create_pipe("N100", &analysis.ladle_id, date(2025, 1, 13));
    let b = env.create_pipe("N101", &analysis.ladle_id, date(2025, 1, 13));

    let found = env.state.sticker_api.search("N10").unwrap();
    assert_eq!(found.len(), 2);
    assert!(env.state.sticker_api.search("").unwrap().is_empty());

    let batch = env.state.sticker_api.batch(&[b.id, 424242, a.id]).unwrap();
    let ids: Vec<i64> = batch.iter().map(|s| s.pipe_id).collect();
    assert_eq!(ids, vec![b.id, a.id]);

    assert!(matches!(
        env.state.sticker_api.batch(&[]),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_verify_scanned_payload() {
    let env = ApiTestEnv::new().expect("test env");
    let analysis = env.create_analysis(date(2025, 1, 13), 1);
    let pipe = env.create_pipe("N100", &analysis.ladle_id, date(2025, 1, 13));
    let sticker = env.state.sticker_api.sticker(pipe.id).unwrap();

    let ok = env.state.sticker_api.verify(&sticker.qr).unwrap();
    assert!(ok.pipe_found);
    assert!(ok.matches);

    let tampered = sticker.qr.replace("DN:500", "DN:600");
    let changed = env.state.sticker_api.verify(&tampered).unwrap();
    assert!(changed.pipe_found);
    assert!(!changed.matches);
    assert_eq!(changed.scanned.unwrap().diameter, Some(600));

    let unknown = env
        .state
        .sticker_api
        .verify("NC:ZZZ|L:|DN:|T:|D:|W:kg|DEC:N/A")
        .unwrap();
    assert!(!unknown.pipe_found);
    assert!(unknown.current.is_none());

    let garbage = env.state.sticker_api.verify("hello world").unwrap();
    assert!(garbage.scanned.is_none());
    assert!(!garbage.matches);
}

#[test]
fn test_separator_in_sticker_fields_is_rejected() {
    let env = ApiTestEnv::new().expect("test env");

    let bad_code = PipeBuilder::new("N1|00").build();
    assert!(matches!(
        env.state.pipe_api.create(&bad_code, &operator()),
        Err(ApiError::InvalidInput(_))
    ));

    let mut bad_type = PipeBuilder::new("N100").build();
    bad_type.pipe_type = Some("K9|C40".to_string());
    assert!(matches!(
        env.state.pipe_api.create(&bad_type, &operator()),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_genuine_sticker_with_padded_type_verifies() {
    let env = ApiTestEnv::new().expect("test env");
    let analysis = env.create_analysis(date(2025, 1, 13), 1);
    let mut input = PipeBuilder::new("N100")
        .ladle(&analysis.ladle_id)
        .date(date(2025, 1, 13))
        .build();
    input.pipe_type = Some("K9 ".to_string());
    let pipe = env.state.pipe_api.create(&input, &operator()).unwrap();
    let sticker = env.state.sticker_api.sticker(pipe.id).unwrap();

    let scanned = env.state.sticker_api.verify(&sticker.qr).unwrap();
    assert!(scanned.pipe_found);
    assert!(scanned.matches);
}
