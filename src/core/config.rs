use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize, Clone)]
pub struct AppConfig {
    pub backend_api: BackendApiConfig,
    pub catalog: CatalogConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self, config::ConfigError> {
        let base_path = std::env::current_dir().expect("Failed to find the current dir");
        let config_dir = base_path.join("src/core/configurations");

        let app_environment: Environment = std::env::var("BANCO_DIDATICO_APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .expect("Failed to parse BANCO_DIDATICO_APP_ENVIRONMENT");

        let configurations = config::Config::builder()
            .add_source(
                config::File::from(config_dir.join(app_environment.as_str())).required(true),
            )
            .build()?;

        configurations.try_deserialize()
    }
}

#[derive(Deserialize, Clone)]
pub struct BackendApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl BackendApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Deserialize, Clone)]
pub struct CatalogConfig {
    pub default_page_size: i32,
    pub cache_ttl_secs: i64,
}

#[derive(Deserialize, Clone)]
pub struct UploadConfig {
    // uploads carry their own, longer bound so large files fail after a
    // bounded wait instead of tripping the default request timeout
    pub request_timeout_secs: u64,
}

impl UploadConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub enum Environment {
    Local,
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not supported environment. Use either `local`, `sandbox` or `production` ",
                other
            )),
        }
    }
}
