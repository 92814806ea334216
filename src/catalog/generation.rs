use std::sync::{Arc, Mutex};
use tracing::instrument;

use super::actions::{begin, settle, ActionState};
use crate::api::{self, ApiClient};
use crate::core::{AppError, Notifier};
use crate::models::activities::GeneratedContent;
use crate::session::SessionStore;

/// Holds the activity/lesson-plan output for one page view. A second
/// generation replaces the displayed result; nothing accumulates.
pub struct GenerationPanel {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    notifier: Notifier,
    state: Mutex<ActionState<GeneratedContent>>,
}

impl GenerationPanel {
    pub fn new(client: Arc<ApiClient>, session: Arc<SessionStore>, notifier: Notifier) -> Self {
        Self {
            client,
            session,
            notifier,
            state: Mutex::new(ActionState::Idle),
        }
    }

    pub fn state(&self) -> ActionState<GeneratedContent> {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or(ActionState::Idle)
    }

    pub fn content(&self) -> Option<GeneratedContent> {
        match self.state() {
            ActionState::Success(content) => Some(content),
            _ => None,
        }
    }

    pub fn reset(&self) {
        settle(&self.state, ActionState::Idle);
    }

    #[instrument(name = "Generate Content", skip(self))]
    pub async fn generate(&self, material_id: &str) -> Result<GeneratedContent, AppError> {
        if !self.session.is_authenticated() {
            let error = AppError::auth_required("Você precisa fazer login para gerar atividades");
            self.notifier.error(error.message());
            return Err(error);
        }
        begin(&self.state, "Geração já em andamento")?;

        match api::activities::generate(&self.client, material_id).await {
            Ok(content) => {
                settle(&self.state, ActionState::Success(content.clone()));
                self.notifier.success("Atividades geradas com sucesso");
                Ok(content)
            }
            Err(error) => {
                let error = self.session.absorb_unauthorized(error);
                tracing::warn!(material_id, error = %error, "generation failed");
                settle(&self.state, ActionState::Failed(error.message()));
                self.notifier.error(error.message());
                Err(error)
            }
        }
    }
}
