mod common;

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

// test me: cargo t --test health_check -- --nocapture --show-output
#[tokio::test]
async fn health_check_works() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };

    let response = app
        .client
        .get(app.url("/api/health"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["item"]["status"], "OK");
    assert_eq!(body["item"]["service"], "CampusMitra Backend");
}

#[tokio::test]
async fn components_report_database_pipeline_and_storage() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(&app.pipeline)
        .await;

    let response = app
        .client
        .get(app.url("/api/health/components"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let components = &body["item"]["components"];
    assert_eq!(body["item"]["status"], "healthy");
    assert_eq!(components["database"]["status"], "healthy");
    assert_eq!(components["ai_pipeline"]["status"], "healthy");
    assert_eq!(components["storage"]["status"], "healthy");
}

#[tokio::test]
async fn pipeline_outage_degrades_but_stays_up() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.pipeline)
        .await;

    let response = app
        .client
        .get(app.url("/api/health/components"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["item"]["status"], "degraded");
    assert_eq!(body["item"]["components"]["ai_pipeline"]["status"], "degraded");
}

#[tokio::test]
async fn metrics_accumulate_component_checks() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&app.pipeline)
        .await;

    for _ in 0..2 {
        app.client
            .get(app.url("/api/health/components"))
            .send()
            .await
            .expect("Failed to execute request.");
    }

    let body: serde_json::Value = app
        .client
        .get(app.url("/api/health/metrics"))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();

    assert!(body["item"]["database"].is_object());
    assert!(body["item"]["storage"].is_object());
}
