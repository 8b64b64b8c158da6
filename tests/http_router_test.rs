// ==========================================
// HTTP router tests (tower::ServiceExt::oneshot, no socket)
// ==========================================

mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use foundry_qc::app::create_router;
use helpers::api_test_helper::*;

fn app(env: &ApiTestEnv) -> Router {
    create_router(env.state.clone())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, role: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Actor", "tester")
        .header("X-Role", role)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let env = ApiTestEnv::new().expect("test env");
    let (status, body) = send(app(&env), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["app"], "Foundry QC Tracker");
}

#[tokio::test]
async fn test_reference_lists_lookups_and_stages() {
    let env = ApiTestEnv::new().expect("test env");
    let (status, body) = send(app(&env), get("/api/reference")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["furnaces"].as_array().unwrap().len(), 4);
    assert_eq!(body["stages"].as_array().unwrap().len(), 8);
    assert_eq!(body["stages"][0]["stage"], "CCM");
}

#[tokio::test]
async fn test_create_and_fetch_analysis() {
    let env = ApiTestEnv::new().expect("test env");
    let draft = json!({
        "test_date": "2025-01-13",
        "ladle_no": 47,
        "readings": { "carbon": 2.5, "silicon": 2.2 }
    });
    let (status, body) = send(app(&env), post_json("/api/chemical", "operator", draft)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["ladle_id"], "4713012025");
    assert_eq!(body["analysis"]["has_defect"], true);
    assert!(!body["failures"].as_array().unwrap().is_empty());

    let id = body["analysis"]["id"].as_i64().unwrap();
    let (status, body) = send(app(&env), get(&format!("/api/chemical/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["carbon"], 2.5);

    let (status, body) = send(app(&env), get("/api/ladles/4713012025")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["analysis"]["id"], id);

    let (status, body) = send(app(&env), get("/api/chemical/next-ladle-no?date=2025-01-13")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ladle_no"], 48);
}

#[tokio::test]
async fn test_error_mapping_and_localization() {
    let env = ApiTestEnv::new().expect("test env");

    let (status, body) = send(app(&env), get("/api/chemical/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["message"], "Record not found");

    let (status, body) = send(app(&env), get("/api/chemical/999?lang=ar")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "السجل غير موجود");

    let request = Request::builder()
        .uri("/api/pipes/999")
        .header(header::ACCEPT_LANGUAGE, "ar-EG,ar;q=0.9")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&env), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "السجل غير موجود");

    // no X-Actor header: anonymous viewer
    let request = Request::builder()
        .method("POST")
        .uri("/api/pipes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "no_code": "N1" }).to_string()))
        .unwrap();
    let (status, body) = send(app(&env), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "permission_denied");

    let (status, body) = send(
        app(&env),
        post_json("/api/chemical", "operator", json!({ "ladle_no": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn test_validate_endpoint_is_localized() {
    let env = ApiTestEnv::new().expect("test env");
    let (status, body) = send(
        app(&env),
        post_json(
            "/api/chemical/validate?lang=ar",
            "viewer",
            json!({ "carbon": 4.5, "silicon": 2.2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let failures = body["failures"].as_array().unwrap();
    assert!(failures
        .iter()
        .any(|f| f.as_str().unwrap().contains("الحد الأقصى")));
}

#[tokio::test]
async fn test_pipe_stage_and_sticker_flow() {
    let env = ApiTestEnv::new().expect("test env");
    let analysis = env.create_analysis(date(2025, 1, 13), 47);

    let (status, pipe) = send(
        app(&env),
        post_json(
            "/api/pipes",
            "operator",
            json!({
                "no_code": "N8739",
                "ladle_id": analysis.ladle_id,
                "production_date": "2025-01-13",
                "diameter": 500
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let pipe_id = pipe["id"].as_i64().unwrap();

    let (status, saved) = send(
        app(&env),
        post_json(
            &format!("/api/pipes/{}/stages/ccm", pipe_id),
            "operator",
            json!({ "decision": "Accept" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["action"], "CREATE");

    let (status, detail) = send(app(&env), get(&format!("/api/pipes/{}", pipe_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"]["current_stage"], "CCM");

    let (status, history) =
        send(app(&env), get(&format!("/api/pipes/{}/history", pipe_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);

    let (status, sticker) = send(app(&env), get(&format!("/api/stickers/{}", pipe_id))).await;
    assert_eq!(status, StatusCode::OK);
    let qr = sticker["qr"].as_str().unwrap().to_string();
    assert!(qr.starts_with("NC:N8739|L:4713012025|DN:500"));

    let (status, verified) = send(
        app(&env),
        post_json("/api/stickers/verify", "viewer", json!({ "qr": qr })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["matches"], true);

    let (status, found) = send(app(&env), get("/api/stickers/search?q=N87")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, pipes) = send(app(&env), get("/api/pipes/search?q=4713012025")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pipes[0]["no_code"], "N8739");
}

#[tokio::test]
async fn test_mechanical_auto_decision_endpoint() {
    let env = ApiTestEnv::new().expect("test env");
    let (status, body) = send(
        app(&env),
        post_json(
            "/api/mechanical/auto-decision",
            "viewer",
            json!({
                "measurements": { "original_length": 50.0, "final_length": 56.0 },
                "structure": { "nodularity_percent": 55.0 }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommended_decision"], "INSPECT_100");
    assert_eq!(body["worst_properties"], json!(["nodularity_percent"]));
}

#[tokio::test]
async fn test_order_endpoints() {
    let env = ApiTestEnv::new().expect("test env");
    let (status, order) = send(
        app(&env),
        post_json(
            "/api/orders",
            "operator",
            json!({ "customer_name": "Delta", "target_quantity": 2, "order_date": "2025-01-13" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["order_number"], "PO-20250113-001");
    assert_eq!(order["status"], "pending");
    let id = order["id"].as_i64().unwrap();

    let (status, _) = send(
        app(&env),
        post_json(
            "/api/pipes",
            "operator",
            json!({ "no_code": "N1", "production_date": "2025-01-13", "production_order_id": id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, progress) = send(app(&env), get(&format!("/api/orders/{}/progress", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["produced_quantity"], 1);
    assert_eq!(progress["completed_quantity"], 0);

    let (status, stickers) = send(app(&env), get(&format!("/api/orders/{}/stickers", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stickers.as_array().unwrap().len(), 1);

    let (status, hits) = send(app(&env), get("/api/orders/search?q=delta")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits[0]["produced_quantity"], 1);

    let (status, pipes) = send(
        app(&env),
        get(&format!("/api/pipes?production_order_id={}", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pipes["total"], 1);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/orders/{}", id))
        .header("X-Actor", "tester")
        .header("X-Role", "supervisor")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(&env), delete).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(app(&env), get("/api/orders/424242")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_requires_supervisor() {
    let env = ApiTestEnv::new().expect("test env");
    let analysis = env.create_analysis(date(2025, 1, 13), 1);
    let uri = format!("/api/chemical/{}", analysis.id);

    let delete = |role: &str| {
        Request::builder()
            .method("DELETE")
            .uri(uri.as_str())
            .header("X-Actor", "tester")
            .header("X-Role", role)
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = send(app(&env), delete("operator")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(app(&env), delete("supervisor")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], analysis.id);
    assert_eq!(body["message"], "Operation successful");
}

#[tokio::test]
async fn test_csv_download_headers() {
    let env = ApiTestEnv::new().expect("test env");
    env.create_analysis(date(2025, 1, 13), 1);

    let response = app(&env)
        .oneshot(get("/api/reports/chemical.csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("chemical_analyses.csv"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[tokio::test]
async fn test_settings_endpoint() {
    let env = ApiTestEnv::new().expect("test env");

    let (status, _) = send(
        app(&env),
        post_json("/api/config", "supervisor", json!({ "key": "list.page_size", "value": "5" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app(&env),
        post_json("/api/config", "admin", json!({ "key": "list.page_size", "value": "5" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["list.page_size"], "5");

    let (status, body) = send(app(&env), get("/api/dashboard?as_of=2025-01-13")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["as_of"], "2025-01-13");
}
