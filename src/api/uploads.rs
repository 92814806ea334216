use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;
use validator::Validate;

use super::client::ApiClient;
use crate::core::AppError;
use crate::models::materials::Material;
use crate::models::uploads::{NewMaterialPayload, NewMaterialReceipt, UploadFile};

const CHUNK_SIZE: usize = 64 * 1024;

/// Transmit-progress publisher for one upload. Percentages only move
/// forward; a subscriber watching the channel sees 0..=100 in order,
/// never a regression.
#[derive(Clone)]
pub struct ProgressHandle {
    tx: Arc<watch::Sender<u8>>,
}

impl ProgressHandle {
    pub fn new() -> (Self, watch::Receiver<u8>) {
        let (tx, rx) = watch::channel(0);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn percent(&self) -> u8 {
        *self.tx.borrow()
    }

    pub(crate) fn update(&self, sent_bytes: usize, total_bytes: usize) {
        let percent = if total_bytes == 0 {
            100
        } else {
            ((sent_bytes as f64 / total_bytes as f64) * 100.0).floor() as u8
        };
        self.advance_to(percent.min(100));
    }

    pub(crate) fn complete(&self) {
        self.advance_to(100);
    }

    fn advance_to(&self, percent: u8) {
        self.tx.send_if_modified(|current| {
            if percent > *current {
                *current = percent;
                true
            } else {
                false
            }
        });
    }
}

/// Validates and transmits a new material. A payload that fails
/// validation is refused before any request is built, and the request
/// itself runs under the longer upload timeout so a stalled transfer
/// fails after a bounded wait.
#[instrument(name = "Upload Material", skip(client, payload, progress), fields(title = %payload.title))]
pub async fn upload(
    client: &ApiClient,
    payload: &NewMaterialPayload,
    progress: &ProgressHandle,
) -> Result<Material, AppError> {
    payload.validate()?;

    let form = build_form(payload, progress.clone())?;
    let request = client
        .post("/materials")
        .multipart(form)
        .timeout(client.upload_timeout());

    let receipt: NewMaterialReceipt = client.execute(request).await?;
    progress.complete();
    Ok(receipt.material)
}

fn build_form(payload: &NewMaterialPayload, progress: ProgressHandle) -> Result<Form, AppError> {
    let mut form = Form::new()
        .text("title", payload.title.clone())
        .text("description", payload.description.clone())
        .text("discipline", payload.discipline.clone())
        .text("grade", payload.grade.clone())
        .text("materialType", payload.material_type.as_str())
        .text("difficulty", payload.difficulty.as_str());

    if let Some(sub_topic) = &payload.sub_topic {
        form = form.text("subTopic", sub_topic.clone());
    }
    if let Some(estimated_duration) = payload.estimated_duration {
        form = form.text("estimatedDuration", estimated_duration.to_string());
    }
    if !payload.tags.is_empty() {
        let tags = serde_json::to_string(&payload.tags)?;
        form = form.text("tags", tags);
    }

    Ok(form.part("file", file_part(&payload.file, progress)?))
}

fn file_part(file: &UploadFile, progress: ProgressHandle) -> Result<Part, AppError> {
    let total_bytes = file.bytes.len();
    let chunks: Vec<Bytes> = file
        .bytes
        .chunks(CHUNK_SIZE)
        .map(Bytes::copy_from_slice)
        .collect();

    let mut sent_bytes = 0usize;
    let body_stream = futures_util::stream::iter(chunks).map(move |chunk| {
        sent_bytes += chunk.len();
        progress.update(sent_bytes, total_bytes);
        Ok::<Bytes, std::io::Error>(chunk)
    });

    Part::stream_with_length(Body::wrap_stream(body_stream), total_bytes as u64)
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)
        .map_err(|e| AppError::internal_error(format!("Invalid content type: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn progress_never_regresses() {
        let (progress, rx) = ProgressHandle::new();
        progress.update(500, 1000);
        assert_eq!(*rx.borrow(), 50);

        // a stale, smaller measurement must not move the needle back
        progress.update(300, 1000);
        assert_eq!(*rx.borrow(), 50);

        progress.complete();
        assert_eq!(*rx.borrow(), 100);
    }

    #[quickcheck]
    fn progress_is_bounded(sent: usize, total: usize) -> bool {
        let (progress, rx) = ProgressHandle::new();
        progress.update(sent, total);
        let within_bounds = *rx.borrow() <= 100;
        within_bounds
    }

    #[test]
    fn empty_files_report_complete_immediately() {
        let (progress, _rx) = ProgressHandle::new();
        progress.update(0, 0);
        assert_eq!(progress.percent(), 100);
    }
}
