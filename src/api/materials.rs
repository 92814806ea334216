use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use super::client::ApiClient;
use crate::core::{AppError, AppErrorType};
use crate::models::materials::{Material, MaterialFilters, UpdateMaterialPayload};
use crate::models::pagination::{CatalogStats, PageQuery, PaginationMeta};
use crate::models::ratings::{RatePayload, RatingReceipt};

/// One page of a materials listing: the items plus the pagination and
/// aggregate blocks the backend sends alongside them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialsPage {
    pub materials: Vec<Material>,
    pub pagination: PaginationMeta,
    pub stats: CatalogStats,
}

impl MaterialsPage {
    pub fn empty(limit: i32) -> Self {
        Self {
            materials: Vec::new(),
            pagination: PaginationMeta::empty(limit),
            stats: CatalogStats::zeroed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadTicket {
    pub download_url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_materials: i64,
    pub total_downloads: i64,
    pub total_ratings: i64,
    pub avg_rating: f64,
    #[serde(default)]
    pub recent_materials: i64,
}

#[derive(Deserialize)]
struct SimilarBlock {
    similar: Vec<Material>,
}

#[derive(Deserialize)]
struct OverviewBlock {
    overview: OverviewStats,
}

#[instrument(name = "Search Materials", skip(client, filters))]
pub async fn search(
    client: &ApiClient,
    filters: &MaterialFilters,
    page: &PageQuery,
) -> Result<MaterialsPage, AppError> {
    let mut page = *page;
    page.validate();
    let pairs = filters.to_query_pairs(&page);

    let result = client
        .execute::<MaterialsPage>(client.get("/materials").query(&pairs))
        .await;

    match result {
        // an empty catalog slice is a valid answer, not a failure
        Err(error) if is_empty_result(&error) => Ok(MaterialsPage::empty(page.limit)),
        other => other,
    }
}

fn is_empty_result(error: &AppError) -> bool {
    if error.error_type == AppErrorType::NotFoundError {
        return true;
    }
    error
        .message
        .as_deref()
        .map(|message| message.contains("Nenhum material encontrado"))
        .unwrap_or(false)
}

#[instrument(name = "Get Material", skip(client))]
pub async fn get(client: &ApiClient, material_id: &str) -> Result<Material, AppError> {
    client
        .execute(client.get(&format!("/materials/{}", material_id)))
        .await
}

#[instrument(name = "My Materials", skip(client))]
pub async fn my_materials(client: &ApiClient, page: &PageQuery) -> Result<MaterialsPage, AppError> {
    let mut page = *page;
    page.validate();
    let pairs = [
        ("page".to_string(), page.page.to_string()),
        ("limit".to_string(), page.limit.to_string()),
    ];
    client
        .execute(client.get("/materials/user/my-materials").query(&pairs))
        .await
}

#[instrument(name = "Similar Materials", skip(client))]
pub async fn similar(
    client: &ApiClient,
    material_id: &str,
    limit: i32,
) -> Result<Vec<Material>, AppError> {
    let block: SimilarBlock = client
        .execute(
            client
                .get(&format!("/materials/{}/similar", material_id))
                .query(&[("limit", limit.to_string())]),
        )
        .await?;
    Ok(block.similar)
}

#[instrument(name = "Catalog Stats", skip(client))]
pub async fn stats(client: &ApiClient) -> Result<OverviewStats, AppError> {
    let block: OverviewBlock = client.execute(client.get("/materials/stats")).await?;
    Ok(block.overview)
}

/// Asks the backend for a short-lived download URL. The caller must be
/// authenticated; the session layer guards that before calling here.
#[instrument(name = "Request Download", skip(client))]
pub async fn request_download(
    client: &ApiClient,
    material_id: &str,
) -> Result<DownloadTicket, AppError> {
    client
        .execute(client.get(&format!("/materials/{}/download", material_id)))
        .await
}

#[instrument(name = "Rate Material", skip(client, payload))]
pub async fn rate(
    client: &ApiClient,
    material_id: &str,
    payload: &RatePayload,
) -> Result<RatingReceipt, AppError> {
    payload.validate()?;
    client
        .execute(
            client
                .post(&format!("/materials/{}/rate", material_id))
                .json(payload),
        )
        .await
}

#[instrument(name = "Update Material", skip(client, payload))]
pub async fn update(
    client: &ApiClient,
    material_id: &str,
    payload: &UpdateMaterialPayload,
) -> Result<Material, AppError> {
    payload.validate()?;
    client
        .execute(
            client
                .put(&format!("/materials/{}", material_id))
                .json(payload),
        )
        .await
}

#[instrument(name = "Delete Material", skip(client))]
pub async fn delete(client: &ApiClient, material_id: &str) -> Result<(), AppError> {
    client
        .execute_empty(client.delete(&format!("/materials/{}", material_id)))
        .await
}
