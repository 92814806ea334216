use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::api::{self, ApiClient};
use crate::api::materials::MaterialsPage;
use crate::core::cache::keys;
use crate::core::{AppError, QueryCache};
use crate::models::materials::Material;
use crate::models::pagination::PageQuery;
use crate::session::SessionStore;

const DASHBOARD_PAGE_SIZE: i32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_materials: i64,
    pub total_downloads: i64,
    pub average_rating: f64,
    pub this_month_uploads: i64,
}

impl DashboardSummary {
    pub fn zeroed() -> Self {
        Self {
            total_materials: 0,
            total_downloads: 0,
            average_rating: 0.0,
            this_month_uploads: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub materials: Vec<Material>,
    pub summary: DashboardSummary,
}

/// The teacher's own corner: their materials plus aggregates computed
/// from them. An anonymous caller gets the zeroed view instead of an
/// error.
pub async fn load(
    client: &ApiClient,
    session: &SessionStore,
    cache: &QueryCache,
) -> Result<DashboardView, AppError> {
    if !session.is_authenticated() {
        return Ok(DashboardView {
            materials: Vec::new(),
            summary: DashboardSummary::zeroed(),
        });
    }

    let page = PageQuery::new(1, DASHBOARD_PAGE_SIZE);
    let cache_key = keys::my_materials(page.page);

    let fetched: MaterialsPage = match cache.get(&cache_key) {
        Ok(Some(hit)) => hit,
        _ => {
            let fetched = api::materials::my_materials(client, &page)
                .await
                .map_err(|error| session.absorb_unauthorized(error))?;
            if let Err(error) = cache.set(&cache_key, &fetched) {
                tracing::warn!(error = %error, "query cache write failed");
            }
            fetched
        }
    };

    let summary = summarize(&fetched.materials, fetched.pagination.count, Utc::now());
    Ok(DashboardView {
        materials: fetched.materials,
        summary,
    })
}

pub fn summarize(materials: &[Material], total_count: i64, now: DateTime<Utc>) -> DashboardSummary {
    let total_downloads = materials.iter().map(|m| m.download_count).sum();

    let rated: Vec<f64> = materials
        .iter()
        .filter(|m| m.total_ratings > 0)
        .map(|m| m.avg_rating)
        .collect();
    let average_rating = if rated.is_empty() {
        0.0
    } else {
        rated.iter().sum::<f64>() / rated.len() as f64
    };

    let this_month_uploads = materials
        .iter()
        .filter(|m| m.created_at.year() == now.year() && m.created_at.month() == now.month())
        .count() as i64;

    DashboardSummary {
        total_materials: total_count,
        total_downloads,
        average_rating,
        this_month_uploads,
    }
}
