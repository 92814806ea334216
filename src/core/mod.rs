pub mod cache;
pub mod config;
mod notify;
mod responses;
mod telemetry;

pub use self::config::AppConfig;
pub use cache::QueryCache;
pub use notify::*;
pub use responses::*;
pub use telemetry::*;
