use tracing::instrument;

use crate::api::materials::OverviewStats;
use crate::api::{self, ApiClient};
use crate::core::cache::keys;
use crate::core::{AppError, QueryCache};
use crate::models::materials::Material;

/// Cache-aware loaders for the material detail view. A mutation on the
/// material sweeps these keys, so the view refetches exactly when its
/// numbers could have changed.
#[instrument(name = "Load Material", skip(client, cache))]
pub async fn load_material(
    client: &ApiClient,
    cache: &QueryCache,
    material_id: &str,
) -> Result<Material, AppError> {
    let cache_key = keys::material(material_id);
    if let Ok(Some(hit)) = cache.get::<Material>(&cache_key) {
        return Ok(hit);
    }

    let material = api::materials::get(client, material_id).await?;
    if let Err(error) = cache.set(&cache_key, &material) {
        tracing::warn!(error = %error, "query cache write failed");
    }
    Ok(material)
}

#[instrument(name = "Load Similar Materials", skip(client, cache))]
pub async fn load_similar(
    client: &ApiClient,
    cache: &QueryCache,
    material_id: &str,
    limit: i32,
) -> Result<Vec<Material>, AppError> {
    let cache_key = keys::similar(material_id);
    if let Ok(Some(hit)) = cache.get::<Vec<Material>>(&cache_key) {
        return Ok(hit);
    }

    let similar = api::materials::similar(client, material_id, limit).await?;
    if let Err(error) = cache.set(&cache_key, &similar) {
        tracing::warn!(error = %error, "query cache write failed");
    }
    Ok(similar)
}

#[instrument(name = "Load Catalog Stats", skip(client, cache))]
pub async fn load_stats(client: &ApiClient, cache: &QueryCache) -> Result<OverviewStats, AppError> {
    if let Ok(Some(hit)) = cache.get::<OverviewStats>(keys::STATS) {
        return Ok(hit);
    }

    let stats = api::materials::stats(client).await?;
    if let Err(error) = cache.set(keys::STATS, &stats) {
        tracing::warn!(error = %error, "query cache write failed");
    }
    Ok(stats)
}
