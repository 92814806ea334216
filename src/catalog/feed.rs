use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::instrument;

use crate::api::materials::MaterialsPage;
use crate::api::{self, ApiClient};
use crate::core::cache::keys;
use crate::core::{AppError, QueryCache};
use crate::models::materials::{Material, MaterialFilters};
use crate::models::pagination::{CatalogStats, PageQuery, PaginationMeta};
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub materials: Vec<Material>,
    pub pagination: Option<PaginationMeta>,
    pub stats: Option<CatalogStats>,
    pub loading: bool,
    pub error: Option<String>,
}

struct FeedInner {
    filters: MaterialFilters,
    page: PageQuery,
    materials: Vec<Material>,
    pagination: Option<PaginationMeta>,
    stats: Option<CatalogStats>,
    loading: bool,
    error: Option<String>,
}

/// Incremental materials listing. Page 1 replaces what is shown; later
/// pages append without duplicating ids. An empty answer is a regular
/// state, never an error.
pub struct MaterialsFeed {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    cache: Arc<QueryCache>,
    inner: Mutex<FeedInner>,
}

impl MaterialsFeed {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionStore>,
        cache: Arc<QueryCache>,
        default_limit: i32,
    ) -> Self {
        Self {
            client,
            session,
            cache,
            inner: Mutex::new(FeedInner {
                filters: MaterialFilters::default(),
                page: PageQuery::new(1, default_limit),
                materials: Vec::new(),
                pagination: None,
                stats: None,
                loading: false,
                error: None,
            }),
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        match self.inner.lock() {
            Ok(inner) => FeedSnapshot {
                materials: inner.materials.clone(),
                pagination: inner.pagination.clone(),
                stats: inner.stats.clone(),
                loading: inner.loading,
                error: inner.error.clone(),
            },
            Err(_) => FeedSnapshot {
                materials: Vec::new(),
                pagination: None,
                stats: None,
                loading: false,
                error: Some("Estado da busca indisponível".to_string()),
            },
        }
    }

    /// Runs a search. Page 1 replaces the listing, a later page
    /// appends to it.
    #[instrument(name = "Feed Search", skip(self, filters))]
    pub async fn search(&self, filters: MaterialFilters, page: PageQuery) -> Result<(), AppError> {
        if !self.begin_load()? {
            return Err(AppError::validation_error("Busca já em andamento"));
        }
        self.perform(filters, page).await
    }

    /// Fetches the next page and appends it. A no-op while a load is in
    /// flight or when the listing is already complete.
    #[instrument(name = "Feed Load More", skip(self))]
    pub async fn load_more(&self) -> Result<(), AppError> {
        let (filters, next_page) = {
            let inner = self.lock()?;
            if inner.loading {
                return Ok(());
            }
            match &inner.pagination {
                Some(pagination) if pagination.has_next => {
                    (inner.filters.clone(), inner.page.next())
                }
                _ => return Ok(()),
            }
        };

        if !self.begin_load()? {
            return Ok(());
        }
        self.perform(filters, next_page).await
    }

    /// Reloads page 1 with the current filters, replacing the listing
    /// in place.
    #[instrument(name = "Feed Refresh", skip(self))]
    pub async fn refresh(&self) -> Result<(), AppError> {
        let (filters, limit) = {
            let inner = self.lock()?;
            (inner.filters.clone(), inner.page.limit)
        };

        if !self.begin_load()? {
            return Err(AppError::validation_error("Busca já em andamento"));
        }
        self.perform(filters, PageQuery::new(1, limit)).await
    }

    pub fn reset(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            let limit = inner.page.limit;
            inner.filters = MaterialFilters::default();
            inner.page = PageQuery::new(1, limit);
            inner.materials.clear();
            inner.pagination = None;
            inner.stats = None;
            inner.loading = false;
            inner.error = None;
        }
    }

    fn begin_load(&self) -> Result<bool, AppError> {
        let mut inner = self.lock()?;
        if inner.loading {
            return Ok(false);
        }
        inner.loading = true;
        inner.error = None;
        Ok(true)
    }

    async fn perform(&self, filters: MaterialFilters, page: PageQuery) -> Result<(), AppError> {
        let mut page = page;
        page.validate();

        let result = self.cached_search(&filters, &page).await;

        let mut inner = self.lock()?;
        inner.loading = false;
        match result {
            Ok(fetched) => {
                if page.page <= 1 {
                    inner.materials = fetched.materials;
                } else {
                    append_new(&mut inner.materials, fetched.materials);
                }
                inner.pagination = Some(fetched.pagination);
                inner.stats = Some(fetched.stats);
                inner.filters = filters;
                inner.page = page;
                Ok(())
            }
            Err(error) => {
                drop(inner);
                let error = self.session.absorb_unauthorized(error);
                if let Ok(mut inner) = self.inner.lock() {
                    inner.error = Some(error.message());
                }
                Err(error)
            }
        }
    }

    async fn cached_search(
        &self,
        filters: &MaterialFilters,
        page: &PageQuery,
    ) -> Result<MaterialsPage, AppError> {
        let cache_key = keys::search(&filters.cache_token(page));

        match self.cache.get::<MaterialsPage>(&cache_key) {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(error) => tracing::warn!(error = %error, "query cache read failed"),
        }

        let fetched = api::materials::search(&self.client, filters, page).await?;
        if let Err(error) = self.cache.set(&cache_key, &fetched) {
            tracing::warn!(error = %error, "query cache write failed");
        }
        Ok(fetched)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, FeedInner>, AppError> {
        self.inner
            .lock()
            .map_err(|e| AppError::internal_error(format!("Feed state unavailable: {}", e)))
    }
}

fn append_new(shown: &mut Vec<Material>, fetched: Vec<Material>) {
    let shown_ids: HashSet<String> = shown.iter().map(|material| material.id.clone()).collect();
    shown.extend(
        fetched
            .into_iter()
            .filter(|material| !shown_ids.contains(&material.id)),
    );
}
