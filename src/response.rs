//! Response builder
//!
//! Handed to every handler. Each terminal call (`tell`, `ask`, and the card
//! variants) consumes the builder, so a dispatch produces exactly one
//! response envelope.

use crate::envelope::{
    Attributes, Card, CardType, OutputSpeech, Reprompt, ResponseBody, ResponseEnvelope, Session,
    RESPONSE_VERSION,
};
use crate::error::SkillResult;
use crate::store::AttributeStore;
use crate::trace::traced_async;
use std::sync::Arc;

/// Everything needed to assemble a response body
#[derive(Debug, Clone, Default)]
pub struct SpeechletOptions {
    pub output: OutputSpeech,
    pub should_end_session: bool,
    pub reprompt: Option<OutputSpeech>,
    pub card_title: Option<String>,
    pub card_content: Option<String>,
}

/// Arguments for [`ResponseBuilder::tell_with_card`]
#[derive(Debug, Clone)]
pub struct TellWithCard {
    pub output: OutputSpeech,
    pub reprompt: Option<OutputSpeech>,
    pub card_title: String,
    pub card_content: String,
    pub should_end_session: bool,
}

impl TellWithCard {
    pub fn new(
        output: OutputSpeech,
        card_title: impl Into<String>,
        card_content: impl Into<String>,
    ) -> Self {
        Self {
            output,
            reprompt: None,
            card_title: card_title.into(),
            card_content: card_content.into(),
            should_end_session: true,
        }
    }

    #[must_use]
    pub fn with_reprompt(mut self, reprompt: OutputSpeech) -> Self {
        self.reprompt = Some(reprompt);
        self
    }

    #[must_use]
    pub fn keep_session_open(mut self) -> Self {
        self.should_end_session = false;
        self
    }
}

/// Arguments for [`ResponseBuilder::ask_with_card`]
#[derive(Debug, Clone)]
pub struct AskWithCard {
    pub output: OutputSpeech,
    pub reprompt: Option<OutputSpeech>,
    pub card_title: String,
    pub card_content: String,
}

impl AskWithCard {
    pub fn new(
        output: OutputSpeech,
        card_title: impl Into<String>,
        card_content: impl Into<String>,
    ) -> Self {
        Self {
            output,
            reprompt: None,
            card_title: card_title.into(),
            card_content: card_content.into(),
        }
    }

    #[must_use]
    pub fn with_reprompt(mut self, reprompt: OutputSpeech) -> Self {
        self.reprompt = Some(reprompt);
        self
    }
}

/// Assemble the envelope. The card is attached only when both title and
/// content are non-empty.
pub fn build_response_body(
    options: SpeechletOptions,
    session_attributes: Option<Attributes>,
) -> ResponseEnvelope {
    let card = match (options.card_title, options.card_content) {
        (Some(title), Some(content)) if !title.is_empty() && !content.is_empty() => Some(Card {
            card_type: CardType::Simple,
            title,
            content,
        }),
        _ => None,
    };

    let envelope = ResponseEnvelope {
        version: RESPONSE_VERSION.to_string(),
        response: ResponseBody {
            output_speech: options.output,
            should_end_session: options.should_end_session,
            reprompt: options.reprompt.map(|output_speech| Reprompt { output_speech }),
            card,
        },
        session_attributes,
    };

    if tracing::enabled!(tracing::Level::DEBUG) {
        let length = serde_json::to_string(&envelope).map_or(0, |s| s.len());
        tracing::debug!(length, "Response built");
    }

    envelope
}

/// Per-dispatch response handle bound to the current session
pub struct ResponseBuilder {
    session: Session,
    store: Option<Arc<dyn AttributeStore>>,
}

impl ResponseBuilder {
    /// Builder that embeds attributes in the response envelope
    pub fn new(session: Session) -> Self {
        Self {
            session,
            store: None,
        }
    }

    /// Builder that writes attributes to `store` instead of the envelope
    pub fn persisted(session: Session, store: Arc<dyn AttributeStore>) -> Self {
        Self {
            session,
            store: Some(store),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        self.session.attributes_mut()
    }

    pub fn is_persisted(&self) -> bool {
        self.store.is_some()
    }

    /// Speak and end the session
    pub async fn tell(
        self,
        output: OutputSpeech,
        reprompt: Option<OutputSpeech>,
    ) -> SkillResult<ResponseEnvelope> {
        self.finish(SpeechletOptions {
            output,
            should_end_session: true,
            reprompt,
            ..SpeechletOptions::default()
        })
        .await
    }

    pub async fn tell_with_card(self, args: TellWithCard) -> SkillResult<ResponseEnvelope> {
        self.finish(SpeechletOptions {
            output: args.output,
            should_end_session: args.should_end_session,
            reprompt: args.reprompt,
            card_title: Some(args.card_title),
            card_content: Some(args.card_content),
        })
        .await
    }

    /// Speak and keep the session open for the user's answer
    pub async fn ask(
        self,
        output: OutputSpeech,
        reprompt: Option<OutputSpeech>,
    ) -> SkillResult<ResponseEnvelope> {
        self.finish(SpeechletOptions {
            output,
            should_end_session: false,
            reprompt,
            ..SpeechletOptions::default()
        })
        .await
    }

    pub async fn ask_with_card(self, args: AskWithCard) -> SkillResult<ResponseEnvelope> {
        self.finish(SpeechletOptions {
            output: args.output,
            should_end_session: false,
            reprompt: args.reprompt,
            card_title: Some(args.card_title),
            card_content: Some(args.card_content),
        })
        .await
    }

    async fn finish(self, options: SpeechletOptions) -> SkillResult<ResponseEnvelope> {
        let Self { session, store } = self;

        match store {
            Some(store) => {
                let attributes = session.attributes.unwrap_or_default();
                traced_async("ResponseBuilder.save", async {
                    store
                        .save(&session.user.user_id, &session.session_id, &attributes)
                        .await
                })
                .await?;
                Ok(build_response_body(options, None))
            }
            None => Ok(build_response_body(options, session.attributes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{Application, User};
    use crate::error::SkillError;
    use crate::store::{MemoryAttributeStore, StoreError};
    use serde_json::json;

    fn session() -> Session {
        let mut attributes = Attributes::new();
        attributes.insert("color".to_string(), json!("blue"));
        Session {
            session_id: "s-1".to_string(),
            application: Application {
                application_id: "app".to_string(),
            },
            user: User {
                user_id: "u-1".to_string(),
                access_token: None,
            },
            attributes: Some(attributes),
            is_new: false,
        }
    }

    #[tokio::test]
    async fn test_tell_ends_session_and_embeds_attributes() {
        let envelope = ResponseBuilder::new(session())
            .tell(OutputSpeech::from_text("Bye"), None)
            .await
            .unwrap();
        assert_eq!(envelope.version, "1.0");
        assert!(envelope.response.should_end_session);
        assert!(envelope.response.reprompt.is_none());
        assert!(envelope.response.card.is_none());
        assert_eq!(envelope.session_attributes.unwrap()["color"], "blue");
    }

    #[tokio::test]
    async fn test_ask_keeps_session_open_with_reprompt() {
        let envelope = ResponseBuilder::new(session())
            .ask(
                OutputSpeech::from_text("Which?"),
                Some(OutputSpeech::from_text("Say a color.")),
            )
            .await
            .unwrap();
        assert!(!envelope.response.should_end_session);
        let reprompt = envelope.response.reprompt.unwrap();
        assert_eq!(reprompt.output_speech.text, "Say a color.");
    }

    #[tokio::test]
    async fn test_card_requires_title_and_content() {
        let envelope = ResponseBuilder::new(session())
            .tell_with_card(TellWithCard::new(OutputSpeech::from_text("x"), "Title", ""))
            .await
            .unwrap();
        assert!(envelope.response.card.is_none());

        let envelope = ResponseBuilder::new(session())
            .ask_with_card(AskWithCard::new(OutputSpeech::from_text("x"), "Title", "Body"))
            .await
            .unwrap();
        let card = envelope.response.card.unwrap();
        assert_eq!(card.title, "Title");
        assert_eq!(card.content, "Body");
        assert!(!envelope.response.should_end_session);
    }

    #[tokio::test]
    async fn test_tell_with_card_can_keep_session_open() {
        let envelope = ResponseBuilder::new(session())
            .tell_with_card(
                TellWithCard::new(OutputSpeech::from_text("x"), "T", "C").keep_session_open(),
            )
            .await
            .unwrap();
        assert!(!envelope.response.should_end_session);
    }

    #[tokio::test]
    async fn test_persisted_mode_saves_and_omits_attributes() {
        let store = Arc::new(MemoryAttributeStore::new("attrs"));
        let mut builder = ResponseBuilder::persisted(session(), store.clone());
        builder
            .attributes_mut()
            .insert("count".to_string(), json!(2));

        let envelope = builder
            .tell(OutputSpeech::from_text("Saved"), None)
            .await
            .unwrap();
        assert!(envelope.session_attributes.is_none());

        let saves = store.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].user_id, "u-1");
        assert_eq!(saves[0].session_id, "s-1");
        assert_eq!(saves[0].attributes["count"], 2);
        assert_eq!(saves[0].attributes["color"], "blue");
    }

    #[tokio::test]
    async fn test_persistence_failure_propagates() {
        let store = Arc::new(MemoryAttributeStore::new("attrs").with_max_json_bytes(2));
        let err = ResponseBuilder::persisted(session(), store)
            .tell(OutputSpeech::from_text("x"), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SkillError::Persistence(StoreError::TooLarge { .. })
        ));
    }
}
