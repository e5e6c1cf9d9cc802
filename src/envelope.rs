//! Wire types for the platform webhook contract
//!
//! The platform POSTs a request envelope and expects a response envelope
//! back. Field names follow the platform's camelCase JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Open key-value map carried in `session.attributes`
pub type Attributes = Map<String, Value>;

/// Version string stamped on every response envelope
pub const RESPONSE_VERSION: &str = "1.0";

// ============================================================================
// Inbound
// ============================================================================

/// Request envelope as received from the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub session: Session,
    pub request: RequestBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub application: Application,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(rename = "new", default)]
    pub is_new: bool,
}

impl Session {
    /// Attributes map, created empty if the platform sent none
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        self.attributes.get_or_insert_with(Map::new)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// The `request` member. `type` is kept as a string so unknown request
/// types survive deserialization and are rejected by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(rename = "type")]
    pub request_type: String,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Routing discriminant derived from `request.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind<'a> {
    Launch,
    Intent,
    SessionEnded,
    Other(&'a str),
}

impl RequestBody {
    pub fn kind(&self) -> RequestKind<'_> {
        match self.request_type.as_str() {
            "LaunchRequest" => RequestKind::Launch,
            "IntentRequest" => RequestKind::Intent,
            "SessionEndedRequest" => RequestKind::SessionEnded,
            other => RequestKind::Other(other),
        }
    }
}

/// A named, slot-parameterized user request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub slots: BTreeMap<String, Slot>,
}

impl Intent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.slots.insert(
            name.clone(),
            Slot {
                name,
                value: Some(value.into()),
            },
        );
        self
    }

    /// Value of the named slot, if the user filled it
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.slots.get(name).and_then(|s| s.value.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

// ============================================================================
// Outbound
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputSpeechType {
    #[default]
    #[serde(rename = "SSML")]
    Ssml,
    PlainText,
}

/// Spoken output with a plain-text twin for card display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OutputSpeech {
    #[serde(rename = "type", default)]
    pub speech_type: OutputSpeechType,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ssml: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CardType {
    #[default]
    Simple,
}

/// Visual companion shown in the platform's app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub output_speech: OutputSpeech,
    pub should_end_session: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
}

/// Response envelope returned to the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    pub response: ResponseBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<Attributes>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_intent_request() {
        let raw = json!({
            "version": "1.0",
            "session": {
                "sessionId": "s-1",
                "application": { "applicationId": "app-1" },
                "user": { "userId": "u-1" },
                "new": false
            },
            "request": {
                "type": "IntentRequest",
                "requestId": "r-1",
                "intent": {
                    "name": "ColorIntent",
                    "slots": { "Color": { "name": "Color", "value": "blue" } }
                }
            }
        });
        let envelope: RequestEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.request.kind(), RequestKind::Intent);
        assert!(envelope.session.attributes.is_none());
        assert!(!envelope.session.is_new);
        let intent = envelope.request.intent.unwrap();
        assert_eq!(intent.slot_value("Color"), Some("blue"));
        assert_eq!(intent.slot_value("Size"), None);
    }

    #[test]
    fn test_unknown_request_type_still_parses() {
        let raw = json!({
            "session": {
                "sessionId": "s-1",
                "application": { "applicationId": "app-1" },
                "user": { "userId": "u-1" },
                "new": true
            },
            "request": { "type": "Display.ElementSelected", "requestId": "r-2" }
        });
        let envelope: RequestEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(
            envelope.request.kind(),
            RequestKind::Other("Display.ElementSelected")
        );
        assert!(envelope.session.is_new);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let envelope = ResponseEnvelope {
            version: RESPONSE_VERSION.to_string(),
            response: ResponseBody {
                output_speech: OutputSpeech {
                    speech_type: OutputSpeechType::Ssml,
                    text: "hi".to_string(),
                    ssml: "<speak><p>hi</p></speak>".to_string(),
                },
                should_end_session: true,
                reprompt: None,
                card: Some(Card {
                    card_type: CardType::Simple,
                    title: "T".to_string(),
                    content: "C".to_string(),
                }),
            },
            session_attributes: None,
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["response"]["outputSpeech"]["type"], "SSML");
        assert_eq!(value["response"]["shouldEndSession"], true);
        assert_eq!(value["response"]["card"]["type"], "Simple");
        assert!(value["response"].get("reprompt").is_none());
        assert!(value.get("sessionAttributes").is_none());
    }
}
