use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;
use validator::Validate;

use crate::api::{self, ApiClient, ProgressHandle};
use crate::core::cache::keys;
use crate::core::{AppError, Notifier, QueryCache};
use crate::models::materials::Material;
use crate::models::uploads::NewMaterialPayload;
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq)]
pub enum UploadPhase {
    Idle,
    Uploading { percent: u8 },
    Success { material_id: String },
    Failed { message: String },
}

impl UploadPhase {
    pub fn is_uploading(&self) -> bool {
        matches!(self, Self::Uploading { .. })
    }
}

/// The upload form's engine. Validation happens entirely before
/// transmission, progress is published as a never-decreasing
/// percentage, and a failed attempt can be resubmitted with the same
/// payload — the form data survives the failure.
pub struct UploadPipeline {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    cache: Arc<QueryCache>,
    notifier: Notifier,
    phase: Arc<watch::Sender<UploadPhase>>,
}

impl UploadPipeline {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionStore>,
        cache: Arc<QueryCache>,
        notifier: Notifier,
    ) -> Self {
        let (phase, _) = watch::channel(UploadPhase::Idle);
        Self {
            client,
            session,
            cache,
            notifier,
            phase: Arc::new(phase),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadPhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase.borrow().clone()
    }

    pub fn reset(&self) {
        self.phase.send_replace(UploadPhase::Idle);
    }

    #[instrument(name = "Upload Pipeline Submit", skip(self, payload), fields(title = %payload.title))]
    pub async fn submit(&self, payload: &NewMaterialPayload) -> Result<Material, AppError> {
        if !self.session.is_authenticated() {
            let error = AppError::auth_required("Você precisa fazer login para enviar materiais");
            self.notifier.error(error.message());
            return Err(error);
        }
        // claim the pipeline; a second submit while one is in flight
        // loses the race and is refused
        let claimed = self.phase.send_if_modified(|current| {
            if current.is_uploading() {
                false
            } else {
                *current = UploadPhase::Uploading { percent: 0 };
                true
            }
        });
        if !claimed {
            return Err(AppError::validation_error("Envio já em andamento"));
        }

        // client-side rejection: no request leaves the process
        if let Err(validation) = payload.validate() {
            let error = AppError::from(validation);
            self.phase.send_replace(UploadPhase::Failed {
                message: error.message(),
            });
            self.notifier.error(error.message());
            return Err(error);
        }

        let (progress, mut progress_rx) = ProgressHandle::new();
        let phase = Arc::clone(&self.phase);
        let forwarder = tokio::spawn(async move {
            while progress_rx.changed().await.is_ok() {
                let percent = *progress_rx.borrow();
                phase.send_if_modified(|current| match current {
                    UploadPhase::Uploading { percent: shown } if percent > *shown => {
                        *shown = percent;
                        true
                    }
                    _ => false,
                });
            }
        });

        let result = api::uploads::upload(&self.client, payload, &progress).await;
        drop(progress);
        let _ = forwarder.await;

        match result {
            Ok(material) => {
                self.cache.invalidate_prefix(keys::MY_MATERIALS_PREFIX);
                self.cache.invalidate(keys::STATS);
                self.cache.invalidate_prefix(keys::SEARCH_PREFIX);
                self.phase.send_replace(UploadPhase::Success {
                    material_id: material.id.clone(),
                });
                self.notifier.success("Material enviado com sucesso");
                Ok(material)
            }
            Err(error) => {
                let error = self.session.absorb_unauthorized(error);
                self.phase.send_replace(UploadPhase::Failed {
                    message: error.message(),
                });
                self.notifier.error(error.message());
                Err(error)
            }
        }
    }
}
