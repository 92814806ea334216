mod helpers;

use std::sync::Arc;
use std::time::Duration;

use claims::{assert_err, assert_none, assert_ok};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use banco_didatico::catalog::{ActionState, MaterialActions};
use banco_didatico::core::cache::keys;
use banco_didatico::core::AppErrorType;
use banco_didatico::models::materials::Material;
use banco_didatico::models::ratings::RatePayload;
use helpers::{material_json, spawn_app, TestApp};

fn actions_for(app: &TestApp) -> MaterialActions {
    MaterialActions::new(
        Arc::clone(&app.client),
        Arc::clone(&app.session),
        Arc::clone(&app.cache),
        app.notifier.clone(),
    )
}

#[tokio::test]
async fn unauthenticated_download_never_calls_the_endpoint() {
    let app = spawn_app().await;
    let actions = actions_for(&app);

    let error = assert_err!(actions.download("m1").await);
    assert!(error.requires_login());
    assert_eq!(error.error_type, AppErrorType::AuthRequired);

    let requests = app.server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn download_returns_a_ticket_and_invalidates_the_material_views() {
    let app = spawn_app().await;
    app.login().await;
    let actions = actions_for(&app);

    Mock::given(method("GET"))
        .and(path("/materials/m1/download"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "downloadUrl": "https://files.example/m1.pdf", "fileName": "m1.pdf" }
        })))
        .mount(&app.server)
        .await;

    // a stale copy of the material sits in the cache
    let stale: Material = serde_json::from_value(material_json("m1")).unwrap();
    assert_ok!(app.cache.set(&keys::material("m1"), &stale));
    assert_ok!(app.cache.set(keys::STATS, &json!({"totalMaterials": 9})));

    let ticket = assert_ok!(actions.download("m1").await);
    assert_eq!(ticket.file_name, "m1.pdf");

    // the stale views are unreachable after the action
    let cached: Option<Material> = assert_ok!(app.cache.get(&keys::material("m1")));
    assert_none!(cached);
    let stats: Option<serde_json::Value> = assert_ok!(app.cache.get(keys::STATS));
    assert_none!(stats);
    assert!(matches!(actions.download_state(), ActionState::Success(_)));
}

#[tokio::test]
async fn a_zero_rating_is_rejected_before_any_request() {
    let app = spawn_app().await;
    app.login().await;
    let actions = actions_for(&app);

    let error = assert_err!(actions.rate("m1", &RatePayload::new(0)).await);
    assert_eq!(error.error_type, AppErrorType::PayloadValidationError);

    let requests = app.server.received_requests().await.unwrap();
    assert!(requests.iter().all(|request| !request.url.path().contains("/rate")));
}

#[tokio::test]
async fn rating_success_invalidates_the_cached_aggregates() {
    let app = spawn_app().await;
    app.login().await;
    let actions = actions_for(&app);

    Mock::given(method("POST"))
        .and(path("/materials/m1/rate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "materialId": "m1", "avgRating": 4.5, "totalRatings": 6 }
        })))
        .mount(&app.server)
        .await;

    let stale: Material = serde_json::from_value(material_json("m1")).unwrap();
    assert_ok!(app.cache.set(&keys::material("m1"), &stale));
    assert_ok!(app.cache.set(&keys::search("page=1&limit=12"), &json!([])));

    let receipt =
        assert_ok!(actions.rate("m1", &RatePayload::with_comment(5, "ótimo material")).await);
    assert_eq!(receipt.avg_rating, 4.5);
    assert_eq!(receipt.total_ratings, 6);

    // the next read of the material or of any search slice refetches
    let material: Option<Material> = assert_ok!(app.cache.get(&keys::material("m1")));
    assert_none!(material);
    let slice: Option<serde_json::Value> =
        assert_ok!(app.cache.get(&keys::search("page=1&limit=12")));
    assert_none!(slice);
}

#[tokio::test]
async fn a_duplicate_rating_surfaces_the_backend_message_verbatim() {
    let mut app = spawn_app().await;
    app.login().await;
    let actions = actions_for(&app);

    Mock::given(method("POST"))
        .and(path("/materials/m1/rate"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "success": false,
            "error": "Você já avaliou este material"
        })))
        .mount(&app.server)
        .await;

    let error = assert_err!(actions.rate("m1", &RatePayload::new(4)).await);
    assert_eq!(error.message(), "Você já avaliou este material");
    assert_eq!(
        actions.rate_state().failure(),
        Some("Você já avaliou este material")
    );

    // the failure reaches the toast channel with the same wording
    let notification = app.notifications.recv().await.unwrap();
    assert_eq!(notification.message, "Você já avaliou este material");
}

#[tokio::test]
async fn a_second_download_is_refused_while_one_is_pending() {
    let app = spawn_app().await;
    app.login().await;
    let actions = actions_for(&app);

    Mock::given(method("GET"))
        .and(path("/materials/m1/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({
                    "success": true,
                    "data": { "downloadUrl": "https://files.example/m1.pdf", "fileName": "m1.pdf" }
                })),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    let (first, second) = tokio::join!(actions.download("m1"), actions.download("m1"));

    assert_ok!(first);
    let error = assert_err!(second);
    assert_eq!(error.error_type, AppErrorType::PayloadValidationError);
}

#[tokio::test]
async fn a_401_on_any_action_resets_the_session() {
    let app = spawn_app().await;
    app.login().await;
    let actions = actions_for(&app);

    Mock::given(method("GET"))
        .and(path("/materials/m1/download"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": "Token inválido"
        })))
        .mount(&app.server)
        .await;

    assert_ok!(app.cache.set(keys::STATS, &json!({"totalMaterials": 3})));

    let error = assert_err!(actions.download("m1").await);
    assert!(error.is_unauthorized());
    assert!(!app.session.is_authenticated());
    assert!(app.cache.is_empty());
}

#[tokio::test]
async fn a_failed_action_can_be_retried() {
    let app = spawn_app().await;
    app.login().await;
    let actions = actions_for(&app);

    Mock::given(method("DELETE"))
        .and(path("/materials/m1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Erro interno do servidor"
        })))
        .up_to_n_times(1)
        .mount(&app.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/materials/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&app.server)
        .await;

    assert_err!(actions.delete("m1").await);
    assert!(matches!(actions.delete_state(), ActionState::Failed(_)));

    assert_ok!(actions.delete("m1").await);
    assert!(matches!(actions.delete_state(), ActionState::Success(())));
}

#[tokio::test]
async fn update_refuses_an_invalid_partial_payload_locally() {
    let app = spawn_app().await;
    app.login().await;
    let actions = actions_for(&app);

    let payload = banco_didatico::models::materials::UpdateMaterialPayload {
        description: Some("curta".to_string()),
        ..Default::default()
    };
    let error = assert_err!(actions.update("m1", &payload).await);
    assert_eq!(error.error_type, AppErrorType::PayloadValidationError);

    let requests = app.server.received_requests().await.unwrap();
    assert!(requests.iter().all(|request| request.url.path() != "/materials/m1"));
}
