use std::sync::{Arc, Mutex};
use tracing::instrument;

use crate::api::materials::DownloadTicket;
use crate::api::{self, ApiClient};
use crate::core::cache::keys;
use crate::core::{AppError, Notifier, QueryCache};
use crate::models::materials::{Material, UpdateMaterialPayload};
use crate::models::ratings::{RatePayload, RatingReceipt};
use crate::session::SessionStore;

/// Lifecycle every async action shares. `Pending` blocks a second
/// start; `Failed` may go back to `Pending` through an explicit retry.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionState<T> {
    Idle,
    Pending,
    Success(T),
    Failed(String),
}

impl<T> ActionState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

pub(crate) fn begin<T>(
    slot: &Mutex<ActionState<T>>,
    busy_message: &str,
) -> Result<(), AppError> {
    let mut state = slot
        .lock()
        .map_err(|e| AppError::internal_error(format!("Action state unavailable: {}", e)))?;
    if state.is_pending() {
        return Err(AppError::validation_error(busy_message));
    }
    *state = ActionState::Pending;
    Ok(())
}

pub(crate) fn settle<T>(slot: &Mutex<ActionState<T>>, outcome: ActionState<T>) {
    if let Ok(mut state) = slot.lock() {
        *state = outcome;
    }
}

fn read<T: Clone>(slot: &Mutex<ActionState<T>>) -> ActionState<T> {
    slot.lock()
        .map(|state| state.clone())
        .unwrap_or(ActionState::Idle)
}

/// Authenticated mutations on one material. Every success invalidates
/// the cached views that could have changed — the material itself, the
/// caller's own list, the aggregates and the search slices — before the
/// success notification goes out, so a subscriber never reads "done"
/// next to stale numbers.
pub struct MaterialActions {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    cache: Arc<QueryCache>,
    notifier: Notifier,
    download_state: Mutex<ActionState<DownloadTicket>>,
    rate_state: Mutex<ActionState<RatingReceipt>>,
    update_state: Mutex<ActionState<Material>>,
    delete_state: Mutex<ActionState<()>>,
}

impl MaterialActions {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionStore>,
        cache: Arc<QueryCache>,
        notifier: Notifier,
    ) -> Self {
        Self {
            client,
            session,
            cache,
            notifier,
            download_state: Mutex::new(ActionState::Idle),
            rate_state: Mutex::new(ActionState::Idle),
            update_state: Mutex::new(ActionState::Idle),
            delete_state: Mutex::new(ActionState::Idle),
        }
    }

    pub fn download_state(&self) -> ActionState<DownloadTicket> {
        read(&self.download_state)
    }

    pub fn rate_state(&self) -> ActionState<RatingReceipt> {
        read(&self.rate_state)
    }

    pub fn update_state(&self) -> ActionState<Material> {
        read(&self.update_state)
    }

    pub fn delete_state(&self) -> ActionState<()> {
        read(&self.delete_state)
    }

    pub fn reset_download(&self) {
        settle(&self.download_state, ActionState::Idle);
    }

    pub fn reset_rate(&self) {
        settle(&self.rate_state, ActionState::Idle);
    }

    /// Asks for a download ticket. Refused locally, with a
    /// redirect-to-login error and no request at all, when nobody is
    /// logged in.
    #[instrument(name = "Download Material", skip(self))]
    pub async fn download(&self, material_id: &str) -> Result<DownloadTicket, AppError> {
        if !self.session.is_authenticated() {
            let error = AppError::auth_required("Você precisa fazer login para baixar materiais");
            self.notifier.error(error.message());
            return Err(error);
        }
        begin(&self.download_state, "Download já em andamento")?;

        match api::materials::request_download(&self.client, material_id).await {
            Ok(ticket) => {
                self.invalidate_material_views(material_id);
                settle(&self.download_state, ActionState::Success(ticket.clone()));
                self.notifier.success("Download pronto");
                Ok(ticket)
            }
            Err(error) => self.fail(material_id, &self.download_state, error),
        }
    }

    /// Submits a 1 to 5 rating. The score is validated before any
    /// request; a duplicate-rating answer from the backend surfaces
    /// verbatim.
    #[instrument(name = "Rate Material", skip(self, payload))]
    pub async fn rate(
        &self,
        material_id: &str,
        payload: &RatePayload,
    ) -> Result<RatingReceipt, AppError> {
        if !self.session.is_authenticated() {
            let error = AppError::auth_required("Você precisa fazer login para avaliar materiais");
            self.notifier.error(error.message());
            return Err(error);
        }
        begin(&self.rate_state, "Avaliação já em andamento")?;

        match api::materials::rate(&self.client, material_id, payload).await {
            Ok(receipt) => {
                self.invalidate_material_views(material_id);
                settle(&self.rate_state, ActionState::Success(receipt.clone()));
                self.notifier.success("Avaliação enviada");
                Ok(receipt)
            }
            Err(error) => self.fail(material_id, &self.rate_state, error),
        }
    }

    #[instrument(name = "Update Material", skip(self, payload))]
    pub async fn update(
        &self,
        material_id: &str,
        payload: &UpdateMaterialPayload,
    ) -> Result<Material, AppError> {
        if !self.session.is_authenticated() {
            let error = AppError::auth_required("Você precisa fazer login para editar materiais");
            self.notifier.error(error.message());
            return Err(error);
        }
        begin(&self.update_state, "Edição já em andamento")?;

        match api::materials::update(&self.client, material_id, payload).await {
            Ok(material) => {
                self.invalidate_material_views(material_id);
                settle(&self.update_state, ActionState::Success(material.clone()));
                self.notifier.success("Material atualizado");
                Ok(material)
            }
            Err(error) => self.fail(material_id, &self.update_state, error),
        }
    }

    #[instrument(name = "Delete Material", skip(self))]
    pub async fn delete(&self, material_id: &str) -> Result<(), AppError> {
        if !self.session.is_authenticated() {
            let error = AppError::auth_required("Você precisa fazer login para excluir materiais");
            self.notifier.error(error.message());
            return Err(error);
        }
        begin(&self.delete_state, "Exclusão já em andamento")?;

        match api::materials::delete(&self.client, material_id).await {
            Ok(()) => {
                self.invalidate_material_views(material_id);
                settle(&self.delete_state, ActionState::Success(()));
                self.notifier.success("Material excluído");
                Ok(())
            }
            Err(error) => self.fail(material_id, &self.delete_state, error),
        }
    }

    fn fail<T, V>(
        &self,
        material_id: &str,
        slot: &Mutex<ActionState<T>>,
        error: AppError,
    ) -> Result<V, AppError> {
        let error = self.session.absorb_unauthorized(error);
        tracing::warn!(material_id, error = %error, "material action failed");
        settle(slot, ActionState::Failed(error.message()));
        self.notifier.error(error.message());
        Err(error)
    }

    // Over-invalidation is fine; a stale count surviving a user's own
    // action is not.
    fn invalidate_material_views(&self, material_id: &str) {
        self.cache.invalidate(&keys::material(material_id));
        self.cache.invalidate(&keys::similar(material_id));
        self.cache.invalidate_prefix(keys::MY_MATERIALS_PREFIX);
        self.cache.invalidate(keys::STATS);
        self.cache.invalidate_prefix(keys::SEARCH_PREFIX);
    }
}
