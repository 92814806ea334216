#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use banco_didatico::api::ApiClient;
use banco_didatico::core::config::{AppConfig, BackendApiConfig, CatalogConfig, UploadConfig};
use banco_didatico::core::{Notification, Notifier, QueryCache};
use banco_didatico::models::users::{LoginPayload, User};
use banco_didatico::session::SessionStore;

pub struct TestApp {
    pub server: MockServer,
    pub client: Arc<ApiClient>,
    pub cache: Arc<QueryCache>,
    pub session: Arc<SessionStore>,
    pub notifier: Notifier,
    pub notifications: UnboundedReceiver<Notification>,
}

pub async fn spawn_app() -> TestApp {
    let server = MockServer::start().await;

    let config = AppConfig {
        backend_api: BackendApiConfig {
            base_url: server.uri(),
            request_timeout_secs: 5,
        },
        catalog: CatalogConfig {
            default_page_size: 12,
            cache_ttl_secs: 60,
        },
        upload: UploadConfig {
            request_timeout_secs: 10,
        },
    };

    let client = Arc::new(ApiClient::build(&config).expect("failed to build the api client"));
    let cache = Arc::new(QueryCache::new(config.catalog.cache_ttl_secs));
    let (notifier, notifications) = Notifier::new();
    let session = Arc::new(SessionStore::new(
        Arc::clone(&client),
        Arc::clone(&cache),
        notifier.clone(),
    ));

    TestApp {
        server,
        client,
        cache,
        session,
        notifier,
        notifications,
    }
}

impl TestApp {
    pub async fn mount_login(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body()))
            .mount(&self.server)
            .await;
    }

    /// Mounts the login endpoint and signs in, leaving the session
    /// authenticated for the rest of the test.
    pub async fn login(&self) -> User {
        self.mount_login().await;
        self.session
            .login(&login_payload())
            .await
            .expect("test login failed")
    }
}

pub fn login_payload() -> LoginPayload {
    LoginPayload {
        email: "ana@escola.edu.br".to_string(),
        password: "segredo1".to_string(),
    }
}

pub fn user_json() -> Value {
    json!({
        "id": "u1",
        "name": "Ana Lima",
        "email": "ana@escola.edu.br",
        "school": "EM Paulo Freire",
        "materialsCount": 2,
        "createdAt": "2026-01-10T12:00:00Z"
    })
}

pub fn auth_body() -> Value {
    json!({
        "success": true,
        "data": { "user": user_json(), "token": "tok-123" }
    })
}

pub fn material_json(id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Material {}", id),
        "description": "Sequência de exercícios sobre frações aplicadas.",
        "discipline": "Matemática",
        "grade": "7º Ano",
        "materialType": "EXERCISE",
        "difficulty": "MEDIUM",
        "avgRating": 4.2,
        "totalRatings": 5,
        "downloadCount": 12,
        "createdAt": "2026-02-01T09:00:00Z",
        "author": { "id": "u1", "name": "Ana Lima" }
    })
}

pub fn listing_body(materials: Vec<Value>, current: i32, has_next: bool) -> Value {
    let count = materials.len();
    json!({
        "success": true,
        "data": {
            "materials": materials,
            "pagination": {
                "current": current,
                "total": if has_next { current + 1 } else { current },
                "count": count,
                "limit": 12,
                "hasNext": has_next,
                "hasPrev": current > 1
            },
            "stats": {
                "totalMaterials": count,
                "avgRating": 4.0,
                "avgDownloads": 10.0
            }
        }
    })
}
