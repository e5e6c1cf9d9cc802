//! Skill dispatcher
//!
//! Routes an inbound request envelope to a skill's lifecycle hooks:
//!
//! ```text
//! execute ─┬─ application id check
//!          ├─ attributes: default / load from store (stale records dropped)
//!          ├─ session.new → on_session_started
//!          └─ request.type ─┬─ LaunchRequest       → on_launch
//!                           ├─ IntentRequest       → on_intent → IntentHandlers[name]
//!                           ├─ SessionEndedRequest → on_session_ended (no response)
//!                           └─ anything else       → UnroutableRequestType
//! ```

mod handlers;

pub use handlers::{intent_fn, FnIntentHandler, IntentHandler, IntentHandlers};

use crate::config::SkillConfig;
use crate::envelope::{
    Attributes, Intent, RequestBody, RequestEnvelope, RequestKind, ResponseEnvelope, Session,
};
use crate::error::{SkillError, SkillResult};
use crate::response::ResponseBuilder;
use crate::store::{AttributeStore, SqliteAttributeStore};
use crate::trace::traced_async;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::Instrument;

/// A voice skill. Override the hooks you need.
///
/// `on_launch` has no useful default and fails until overridden.
/// `on_intent` resolves through [`Skill::intent_handlers`].
#[async_trait]
pub trait Skill: Send + Sync {
    async fn on_session_started(
        &self,
        request: &RequestBody,
        session: &mut Session,
    ) -> SkillResult<()> {
        tracing::debug!(
            request_id = %request.request_id,
            session_id = %session.session_id,
            "Session started"
        );
        Ok(())
    }

    async fn on_launch(
        &self,
        _request: &RequestBody,
        _response: ResponseBuilder,
    ) -> SkillResult<ResponseEnvelope> {
        Err(SkillError::HandlerOverrideMissing("on_launch"))
    }

    async fn on_intent(
        &self,
        request: &RequestBody,
        intent: &Intent,
        response: ResponseBuilder,
    ) -> SkillResult<ResponseEnvelope> {
        let handler = self
            .intent_handlers()
            .and_then(|handlers| handlers.get(&intent.name))
            .ok_or_else(|| SkillError::UnsupportedIntent(intent.name.clone()))?;

        tracing::info!(request_id = %request.request_id, intent = %intent.name, "Dispatch intent");
        handler.handle(intent, response).await
    }

    async fn on_session_ended(&self, request: &RequestBody, session: &Session) -> SkillResult<()> {
        tracing::debug!(
            request_id = %request.request_id,
            session_id = %session.session_id,
            reason = ?request.reason,
            "Session ended"
        );
        Ok(())
    }

    /// Handlers consulted by the default `on_intent`
    fn intent_handlers(&self) -> Option<&IntentHandlers> {
        None
    }
}

/// Entry point for one skill: validates, loads state, routes
pub struct SkillDispatcher {
    skill: Arc<dyn Skill>,
    application_id: Option<String>,
    store: Option<Arc<dyn AttributeStore>>,
}

impl SkillDispatcher {
    pub fn new(skill: Arc<dyn Skill>) -> Self {
        Self {
            skill,
            application_id: None,
            store: None,
        }
    }

    /// Dispatcher configured from `config`, opening the SQLite store when a
    /// table name is set
    pub fn from_config(skill: Arc<dyn Skill>, config: &SkillConfig) -> SkillResult<Self> {
        let mut dispatcher = Self::new(skill);
        dispatcher.application_id.clone_from(&config.application_id);

        if let Some(table) = &config.table_name {
            tracing::info!(path = %config.db_path.display(), table = %table, "Opening attribute store");
            let store = SqliteAttributeStore::open(&config.db_path, table)?
                .with_max_json_bytes(config.max_attribute_bytes);
            dispatcher.store = Some(Arc::new(store));
        }

        Ok(dispatcher)
    }

    #[must_use]
    pub fn with_application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn AttributeStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Handle one request. `Ok(None)` means the platform expects no body
    /// (session ended). Errors are logged here once and returned.
    pub async fn execute(&self, envelope: RequestEnvelope) -> SkillResult<Option<ResponseEnvelope>> {
        let request_id = envelope.request.request_id.clone();
        let span = tracing::info_span!("execute", request_id = %request_id);
        let result = self.dispatch(envelope).instrument(span).await;

        match &result {
            Ok(response) => tracing::info!(
                request_id = %request_id,
                responded = response.is_some(),
                "Request handled"
            ),
            Err(e) => tracing::error!(
                request_id = %request_id,
                kind = ?e.kind(),
                error = %e,
                "Unexpected exception"
            ),
        }
        result
    }

    async fn dispatch(&self, envelope: RequestEnvelope) -> SkillResult<Option<ResponseEnvelope>> {
        let RequestEnvelope {
            mut session,
            request,
            ..
        } = envelope;

        tracing::info!(
            request_id = %request.request_id,
            application_id = %session.application.application_id,
            request_type = %request.request_type,
            "Dispatching request"
        );

        self.check_application_id(&session)?;
        self.load_attributes(&mut session).await?;

        if session.is_new {
            self.skill.on_session_started(&request, &mut session).await?;
        }

        let response = match &self.store {
            Some(store) => ResponseBuilder::persisted(session, Arc::clone(store)),
            None => ResponseBuilder::new(session),
        };

        match request.kind() {
            RequestKind::Launch => self.skill.on_launch(&request, response).await.map(Some),
            RequestKind::Intent => {
                let intent = request.intent.as_ref().ok_or(SkillError::MissingIntent)?;
                self.skill
                    .on_intent(&request, intent, response)
                    .await
                    .map(Some)
            }
            RequestKind::SessionEnded => {
                self.skill
                    .on_session_ended(&request, response.session())
                    .await?;
                Ok(None)
            }
            RequestKind::Other(request_type) => {
                Err(SkillError::UnroutableRequestType(request_type.to_string()))
            }
        }
    }

    fn check_application_id(&self, session: &Session) -> SkillResult<()> {
        match &self.application_id {
            Some(expected) if *expected != session.application.application_id => {
                Err(SkillError::InvalidApplicationId {
                    expected: expected.clone(),
                    actual: session.application.application_id.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Attributes sent by the platform win. Otherwise load the user's record,
    /// dropping it if it was written by a different session.
    async fn load_attributes(&self, session: &mut Session) -> SkillResult<()> {
        if session.attributes.is_some() {
            return Ok(());
        }

        let mut attributes = Attributes::new();
        if let Some(store) = &self.store {
            let user_id = session.user.user_id.clone();
            let record = traced_async("SkillDispatcher.load_attributes", store.get(&user_id)).await?;
            match record {
                Some(record) if record.session_id == session.session_id => {
                    attributes = record.attributes;
                }
                Some(record) => tracing::debug!(
                    user_id = %user_id,
                    stored_session = %record.session_id,
                    session_id = %session.session_id,
                    "Discarding stale attributes"
                ),
                None => tracing::debug!(user_id = %user_id, "No stored attributes"),
            }
        }

        session.attributes = Some(attributes);
        Ok(())
    }
}
