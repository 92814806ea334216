//! Client layer of the Banco Colaborativo de Recursos Didáticos: typed
//! wrappers over the backend REST API, the observable session store,
//! validated form payloads, the query cache and the async view-model
//! state machines (feed, actions, upload, generation, dashboard).
//!
//! Wiring is explicit — nothing global:
//!
//! ```no_run
//! use std::sync::Arc;
//! use banco_didatico::api::ApiClient;
//! use banco_didatico::catalog::MaterialsFeed;
//! use banco_didatico::core::{AppConfig, Notifier, QueryCache};
//! use banco_didatico::session::SessionStore;
//!
//! # fn main() -> Result<(), anyhow::Error> {
//! let config = AppConfig::new()?;
//! let client = Arc::new(ApiClient::build(&config)?);
//! let cache = Arc::new(QueryCache::new(config.catalog.cache_ttl_secs));
//! let (notifier, _notifications) = Notifier::new();
//!
//! let session = Arc::new(SessionStore::new(
//!     Arc::clone(&client),
//!     Arc::clone(&cache),
//!     notifier.clone(),
//! ));
//! let feed = MaterialsFeed::new(
//!     Arc::clone(&client),
//!     Arc::clone(&session),
//!     Arc::clone(&cache),
//!     config.catalog.default_page_size,
//! );
//! # let _ = feed;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod models;
pub mod session;
