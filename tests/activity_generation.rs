mod helpers;

use std::sync::Arc;

use claims::{assert_err, assert_ok, assert_some};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use banco_didatico::catalog::{ActionState, GenerationPanel};
use banco_didatico::core::AppErrorType;
use helpers::{spawn_app, TestApp};

fn panel_for(app: &TestApp) -> GenerationPanel {
    GenerationPanel::new(
        Arc::clone(&app.client),
        Arc::clone(&app.session),
        app.notifier.clone(),
    )
}

fn generation_body(summary: &str) -> Value {
    json!({
        "success": true,
        "data": {
            "schemaVersion": 2,
            "material": {
                "id": "m1",
                "title": "Frações no cotidiano",
                "discipline": "Matemática",
                "grade": "7º Ano"
            },
            "lessonPlan": {
                "title": "Aula sobre frações",
                "totalDurationMinutes": 50,
                "stages": [
                    {
                        "name": "Abertura",
                        "durationMinutes": 10,
                        "description": "Retomada do conceito de fração."
                    },
                    {
                        "name": "Prática",
                        "durationMinutes": 40,
                        "description": "Resolução guiada dos exercícios."
                    }
                ]
            },
            "activities": {
                "summary": summary,
                "objectives": ["Reconhecer frações equivalentes"],
                "exercises": ["Represente 3/4 de uma pizza"],
                "multiple_choice": [
                    {
                        "question": "Qual fração equivale a 1/2?",
                        "options": ["2/4", "3/5", "1/3"],
                        "answer": "2/4"
                    }
                ],
                "essay_questions": ["Explique o que é uma fração imprópria"]
            },
            "metadata": {
                "contentLength": 5120,
                "extractedFromFile": true,
                "generatedAt": "2026-03-01T10:00:00Z"
            }
        }
    })
}

#[tokio::test]
async fn generation_fills_the_panel_with_the_versioned_content() {
    let app = spawn_app().await;
    app.login().await;
    let panel = panel_for(&app);
    Mock::given(method("POST"))
        .and(path("/materials/m1/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_body("Resumo A")))
        .mount(&app.server)
        .await;

    let content = assert_ok!(panel.generate("m1").await);
    assert_eq!(content.schema_version, 2);
    assert_eq!(content.lesson_plan.stages.len(), 2);
    assert_eq!(content.activities.multiple_choice[0].answer, "2/4");

    let held = assert_some!(panel.content());
    assert_eq!(held.activities.summary, "Resumo A");
}

#[tokio::test]
async fn a_second_generation_replaces_the_displayed_content() {
    let app = spawn_app().await;
    app.login().await;
    let panel = panel_for(&app);

    Mock::given(method("POST"))
        .and(path("/materials/m1/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_body("Resumo A")))
        .up_to_n_times(1)
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/materials/m1/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_body("Resumo B")))
        .mount(&app.server)
        .await;

    assert_ok!(panel.generate("m1").await);
    assert_ok!(panel.generate("m1").await);

    // replaced, not accumulated
    let held = assert_some!(panel.content());
    assert_eq!(held.activities.summary, "Resumo B");
}

#[tokio::test]
async fn a_mismatched_schema_version_is_refused() {
    let app = spawn_app().await;
    app.login().await;
    let panel = panel_for(&app);

    let mut body = generation_body("Resumo A");
    body["data"]["schemaVersion"] = json!(1);
    Mock::given(method("POST"))
        .and(path("/materials/m1/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&app.server)
        .await;

    let error = assert_err!(panel.generate("m1").await);
    assert_eq!(error.error_type, AppErrorType::UnsupportedSchema);
    assert!(matches!(panel.state(), ActionState::Failed(_)));
}

#[tokio::test]
async fn an_anonymous_caller_is_redirected_instead_of_calling_out() {
    let app = spawn_app().await;
    let panel = panel_for(&app);

    let error = assert_err!(panel.generate("m1").await);
    assert!(error.requires_login());

    let requests = app.server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}
