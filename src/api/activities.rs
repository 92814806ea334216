use tracing::instrument;

use super::client::ApiClient;
use crate::core::AppError;
use crate::models::activities::{GeneratedContent, GenerationRequest, GENERATION_SCHEMA_VERSION};

/// Asks the generation service for a lesson plan and activity set
/// derived from one material. Generation takes several seconds
/// server-side; callers surface a distinct pending state meanwhile.
#[instrument(name = "Generate Activities", skip(client))]
pub async fn generate(client: &ApiClient, material_id: &str) -> Result<GeneratedContent, AppError> {
    let request = GenerationRequest::new();
    let content: GeneratedContent = client
        .execute(
            client
                .post(&format!("/materials/{}/activities", material_id))
                .json(&request),
        )
        .await?;

    if content.schema_version != GENERATION_SCHEMA_VERSION {
        return Err(AppError::unsupported_schema(format!(
            "Generation reply uses schema version {}, this client speaks {}",
            content.schema_version, GENERATION_SCHEMA_VERSION
        )));
    }

    Ok(content)
}
