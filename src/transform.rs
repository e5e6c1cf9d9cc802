//! Functional transform skill
//!
//! Launch and intent requests become a [`Stimulus`]. The stimulus and the
//! session's history go through the [`TransformTable`]; the resulting
//! [`SkillState`] is appended to history and its interaction becomes the
//! response. History lives in `session.attributes.history` and is
//! append-only.

mod state;
mod table;

#[cfg(test)]
mod proptests;

pub use state::{Interaction, InteractionType, RepeatOf, SkillState, Stimulus, StimulusOrigin};
pub use table::{previous_state, transform_fn, FnTransform, RepeatTransform, Transform, TransformTable};

use crate::envelope::{Intent, RequestBody, ResponseEnvelope, Session};
use crate::error::{SkillError, SkillResult};
use crate::response::{AskWithCard, ResponseBuilder, TellWithCard};
use crate::skill::Skill;
use crate::trace::{traced, traced_async};
use async_trait::async_trait;

/// Stimulus name used for launch requests unless overridden
pub const DEFAULT_LAUNCH_NAME: &str = "WelcomeIntent";

/// Attribute key holding the serialized history
pub const HISTORY_KEY: &str = "history";

pub struct TransformSkill {
    table: TransformTable,
    launch_name: String,
}

impl TransformSkill {
    pub fn new(table: TransformTable) -> Self {
        Self {
            table,
            launch_name: DEFAULT_LAUNCH_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_launch_name(mut self, name: impl Into<String>) -> Self {
        self.launch_name = name.into();
        self
    }

    pub fn launch_name(&self) -> &str {
        &self.launch_name
    }

    pub fn table(&self) -> &TransformTable {
        &self.table
    }

    /// Resolve `stimulus` against the session's history and record the new
    /// state. History is left untouched when resolution fails.
    pub fn apply_stimulus(&self, stimulus: &Stimulus, session: &mut Session) -> SkillResult<SkillState> {
        traced("TransformSkill.apply_stimulus", || {
            let mut history = load_history(session)?;
            tracing::debug!(stimulus = %stimulus.name, history_len = history.len(), "Applying stimulus");

            let next = self.table.resolve(stimulus, &history)?;
            history.push(next.clone());
            store_history(session, &history)?;
            Ok(next)
        })
    }

    /// Apply `stimulus` and answer with the resulting interaction
    pub async fn handle_stimulus(
        &self,
        stimulus: &Stimulus,
        mut response: ResponseBuilder,
    ) -> SkillResult<ResponseEnvelope> {
        let next = self.apply_stimulus(stimulus, response.session_mut())?;
        self.respond(next.interaction, response).await
    }

    /// Map an interaction onto the matching response call
    pub async fn respond(
        &self,
        interaction: Interaction,
        response: ResponseBuilder,
    ) -> SkillResult<ResponseEnvelope> {
        traced_async("TransformSkill.respond", async move {
            let Interaction {
                interaction_type,
                output,
                reprompt,
                card_title,
                card_content,
                ..
            } = interaction;
            let card_title = card_title.filter(|title| !title.is_empty());

            match (interaction_type, card_title) {
                (InteractionType::Tell, Some(card_title)) => {
                    response
                        .tell_with_card(TellWithCard {
                            output,
                            reprompt,
                            card_title,
                            card_content: card_content.unwrap_or_default(),
                            should_end_session: true,
                        })
                        .await
                }
                (InteractionType::Ask, Some(card_title)) => {
                    response
                        .ask_with_card(AskWithCard {
                            output,
                            reprompt,
                            card_title,
                            card_content: card_content.unwrap_or_default(),
                        })
                        .await
                }
                (InteractionType::Tell, None) => response.tell(output, reprompt).await,
                (InteractionType::Ask, None) => response.ask(output, reprompt).await,
            }
        })
        .await
    }
}

#[async_trait]
impl Skill for TransformSkill {
    async fn on_launch(
        &self,
        request: &RequestBody,
        response: ResponseBuilder,
    ) -> SkillResult<ResponseEnvelope> {
        let stimulus = Stimulus::from_launch(&self.launch_name, request.clone());
        self.handle_stimulus(&stimulus, response).await
    }

    async fn on_intent(
        &self,
        request: &RequestBody,
        intent: &Intent,
        response: ResponseBuilder,
    ) -> SkillResult<ResponseEnvelope> {
        tracing::info!(request_id = %request.request_id, intent = %intent.name, "Handling intent");
        self.handle_stimulus(&Stimulus::from_intent(intent.clone()), response)
            .await
    }
}

/// History recorded in the session, empty if none yet
pub fn load_history(session: &Session) -> SkillResult<Vec<SkillState>> {
    match session.attributes.as_ref().and_then(|a| a.get(HISTORY_KEY)) {
        Some(value) => serde_json::from_value(value.clone()).map_err(SkillError::InvalidHistory),
        None => Ok(Vec::new()),
    }
}

fn store_history(session: &mut Session, history: &[SkillState]) -> SkillResult<()> {
    let value = serde_json::to_value(history).map_err(SkillError::InvalidHistory)?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::debug!(history_bytes = value.to_string().len(), "History updated");
    }
    session.attributes_mut().insert(HISTORY_KEY.to_string(), value);
    Ok(())
}
