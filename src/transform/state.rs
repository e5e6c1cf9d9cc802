//! Dialog state types
//!
//! These are stored verbatim under `session.attributes.history`, so the JSON
//! shape (camelCase, `repeatIntentOrLaunchRequest`) is part of the contract.

use crate::envelope::{Intent, OutputSpeech, RequestBody};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Where a stimulus came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StimulusOrigin {
    #[default]
    User,
}

/// The request a repeat stimulus carried
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepeatOf {
    Intent(Intent),
    Launch(RequestBody),
}

/// Normalized trigger for the transform table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stimulus {
    pub name: String,
    #[serde(default)]
    pub origin: StimulusOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_request: Option<RequestBody>,
    /// Set when this stimulus replays an earlier one
    #[serde(
        default,
        rename = "repeatIntentOrLaunchRequest",
        skip_serializing_if = "Option::is_none"
    )]
    pub repeat_of: Option<RepeatOf>,
}

impl Stimulus {
    pub fn from_intent(intent: Intent) -> Self {
        Self {
            name: intent.name.clone(),
            origin: StimulusOrigin::User,
            intent: Some(intent),
            launch_request: None,
            repeat_of: None,
        }
    }

    pub fn from_launch(name: impl Into<String>, request: RequestBody) -> Self {
        Self {
            name: name.into(),
            origin: StimulusOrigin::User,
            intent: None,
            launch_request: Some(request),
            repeat_of: None,
        }
    }

    pub fn is_repeat(&self) -> bool {
        self.repeat_of.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    /// Expects a reply; session stays open
    Ask,
    /// Says something and ends the session
    Tell,
}

/// The user-facing effect of one resolved turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub stimulus: Stimulus,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub output: OutputSpeech,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<OutputSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_content: Option<String>,
    /// Free-form per-turn data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl Interaction {
    pub fn ask(stimulus: Stimulus, output: OutputSpeech, reprompt: OutputSpeech) -> Self {
        Self {
            stimulus,
            interaction_type: InteractionType::Ask,
            output,
            reprompt: Some(reprompt),
            card_title: None,
            card_content: None,
            context: None,
        }
    }

    pub fn tell(stimulus: Stimulus, output: OutputSpeech) -> Self {
        Self {
            stimulus,
            interaction_type: InteractionType::Tell,
            output,
            reprompt: None,
            card_title: None,
            card_content: None,
            context: None,
        }
    }

    #[must_use]
    pub fn with_card(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.card_title = Some(title.into());
        self.card_content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// One resolved dialog turn, appended to history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillState {
    pub id: String,
    /// Free-form state label
    pub location: String,
    pub interaction: Interaction,
}

impl SkillState {
    pub fn new(location: impl Into<String>, interaction: Interaction) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            location: location.into(),
            interaction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stimulus_json_shape() {
        let mut stimulus = Stimulus::from_intent(Intent::new("ColorIntent"));
        stimulus.repeat_of = Some(RepeatOf::Intent(Intent::new("AMAZON.RepeatIntent")));

        let value = serde_json::to_value(&stimulus).unwrap();
        assert_eq!(value["origin"], "user");
        assert_eq!(value["intent"]["name"], "ColorIntent");
        assert_eq!(
            value["repeatIntentOrLaunchRequest"]["name"],
            "AMAZON.RepeatIntent"
        );
        assert!(value.get("launchRequest").is_none());

        let back: Stimulus = serde_json::from_value(value).unwrap();
        assert!(back.is_repeat());
    }

    #[test]
    fn test_repeat_of_launch_request_deserializes() {
        let value = json!({
            "name": "WelcomeIntent",
            "origin": "user",
            "repeatIntentOrLaunchRequest": { "type": "LaunchRequest", "requestId": "r-1" }
        });
        let stimulus: Stimulus = serde_json::from_value(value).unwrap();
        assert!(matches!(stimulus.repeat_of, Some(RepeatOf::Launch(ref r)) if r.request_id == "r-1"));
    }

    #[test]
    fn test_skill_state_ids_are_unique() {
        let interaction = Interaction::tell(
            Stimulus::from_intent(Intent::new("A")),
            OutputSpeech::from_text("a"),
        );
        let a = SkillState::new("start", interaction.clone());
        let b = SkillState::new("start", interaction);
        assert_ne!(a.id, b.id);
        assert_eq!(a.interaction, b.interaction);
    }

    #[test]
    fn test_interaction_type_serializes_lowercase() {
        let interaction = Interaction::ask(
            Stimulus::from_intent(Intent::new("A")),
            OutputSpeech::from_text("a?"),
            OutputSpeech::from_text("a??"),
        )
        .with_card("Title", "Body");
        let value = serde_json::to_value(&interaction).unwrap();
        assert_eq!(value["type"], "ask");
        assert_eq!(value["cardTitle"], "Title");
        assert_eq!(value["reprompt"]["type"], "SSML");
    }
}
