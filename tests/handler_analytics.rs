mod common;

use serde_json::json;

#[tokio::test]
async fn test_click_details() {
    let (state, mut rx) = common::create_test_state();
    let server = common::test_server(state.clone());

    server
        .post("/shorten")
        .json(&json!({ "longUrl": "example.com/a", "userId": "u1", "customAlias": "stats" }))
        .await
        .assert_status_ok();

    server
        .get("/stats")
        .add_header("User-Agent", "agent-1")
        .add_header("Referer", "https://news.example.com")
        .await;
    server.get("/stats").await;
    assert_eq!(common::drain_clicks(&state, &mut rx).await, 2);

    let response = server
        .post("/analytics/details")
        .json(&json!({ "shortCode": "stats" }))
        .await;

    response.assert_status_ok();
    let clicks = response.json::<Vec<serde_json::Value>>();
    assert_eq!(clicks.len(), 2);
    assert_eq!(clicks[0]["shortCode"], "stats");
    assert_eq!(clicks[0]["ipAddress"], "127.0.0.1");
    assert_eq!(clicks[0]["userAgent"], "agent-1");
    assert_eq!(clicks[0]["referrer"], "https://news.example.com");
    assert_eq!(clicks[1]["userAgent"], "Unknown");
    assert_eq!(clicks[1]["referrer"], "Direct");
}

#[tokio::test]
async fn test_click_details_unknown_code_is_empty() {
    let (state, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/analytics/details")
        .json(&json!({ "shortCode": "nothing" }))
        .await;

    response.assert_status_ok();
    assert!(response.json::<Vec<serde_json::Value>>().is_empty());
}

#[tokio::test]
async fn test_click_details_requires_code() {
    let (state, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/analytics/details")
        .json(&json!({ "shortCode": "" }))
        .await;

    assert_eq!(response.status_code(), 400);
}
