use axum::http::{self, Request, StatusCode};
use gdp_mock_server::{app, app_with_state, AppState, MockOptions};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- statistics tables ---

#[tokio::test]
async fn table_path_is_percent_decoded() {
    // "/api/人口数据" as it arrives on the wire.
    let resp = app()
        .oneshot(get("/api/%E4%BA%BA%E5%8F%A3%E6%95%B0%E6%8D%AE"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["msg"], "ok");
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn unknown_table_returns_404_envelope() {
    let resp = app().oneshot(get("/api/no_such_table")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["code"], 404);
}

// --- spatial ---

#[tokio::test]
async fn spatial_years_lists_generated_years() {
    let resp = app().oneshot(get("/api/spatial/available-years")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["available_years"][0], "2021");
}

#[tokio::test]
async fn spatial_data_for_missing_year_is_404() {
    let resp = app().oneshot(get("/api/spatial/data/1999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["action_required"], true);
    assert!(body["features"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn spatial_stats_for_known_year() {
    let resp = app().oneshot(get("/api/spatial/stats/2023")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["year"], "2023");
    assert_eq!(body["province_count"], 31);
}

#[tokio::test]
async fn spatial_stats_for_column_style_year_key() {
    // "2024年" as it arrives on the wire.
    let resp = app().oneshot(get("/api/spatial/stats/2024%E5%B9%B4")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["year"], "2024年");
}

#[tokio::test]
async fn refresh_accepts_empty_post() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/spatial/refresh")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
}

// --- gdp ---

#[tokio::test]
async fn prediction_for_known_province() {
    let resp = app()
        .oneshot(get("/api/gdp/predict/%E4%BA%91%E5%8D%97%E7%9C%81"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["province"], "云南省");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn encoded_slash_stays_in_one_segment() {
    let resp = app()
        .oneshot(get("/api/gdp/historical/Hong%20Kong%2FMacau"))
        .await
        .unwrap();

    // Matched the province route (400 from the handler, not a routing 404).
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Hong Kong/Macau"));
}

#[tokio::test]
async fn custom_prediction_requires_all_files() {
    let boundary = "XBOUNDARY";
    let payload = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"province\"\r\n\r\n云南省\r\n--{boundary}--\r\n"
    );
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/gdp/predict_custom")
                .header(
                    http::header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(payload)
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- injection and recording ---

#[tokio::test]
async fn injected_soft_failure_and_log() {
    let state = AppState::new(
        MockOptions::default().soft_failure("/api/spatial/available-years", "暂无数据"),
    );
    let log = state.log();
    let resp = app_with_state(state)
        .oneshot(get("/api/spatial/available-years"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["code"], -1);
    assert_eq!(body["message"], "暂无数据");

    let recorded = log.read().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "GET");
    assert_eq!(recorded[0].path, "/api/spatial/available-years");
    assert_eq!(recorded[0].body_len, 0);
}

#[tokio::test]
async fn injected_error_status() {
    let state = AppState::new(MockOptions::default().error_status("/api/spatial/refresh", 503));
    let resp = app_with_state(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/spatial/refresh")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn oversized_body_is_rejected_and_not_recorded() {
    let state = AppState::new(MockOptions::default().body_limit(8));
    let log = state.log();
    let resp = app_with_state(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/spatial/refresh")
                .body("x".repeat(64))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(log.read().await.is_empty());
}

#[tokio::test]
async fn log_keeps_content_type() {
    let state = AppState::default();
    let log = state.log();
    app_with_state(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/spatial/refresh")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body("{}".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    let recorded = log.read().await;
    assert_eq!(recorded[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(recorded[0].body_len, 2);
}
