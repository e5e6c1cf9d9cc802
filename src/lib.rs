//! Funcy skill - an SDK for voice-assistant skills
//!
//! Receives the platform's request envelope, dispatches it to lifecycle hooks
//! or a functional transform table, and builds the response envelope with
//! speech markup and optional cards.

pub mod api;
pub mod config;
pub mod envelope;
pub mod error;
pub mod response;
pub mod skill;
pub mod speech;
pub mod ssml;
pub mod store;
pub mod trace;
pub mod transform;

pub use config::SkillConfig;
pub use envelope::{Attributes, Intent, OutputSpeech, RequestEnvelope, ResponseEnvelope, Session};
pub use error::{SkillError, SkillErrorKind, SkillResult};
pub use response::{AskWithCard, ResponseBuilder, TellWithCard};
pub use skill::{intent_fn, IntentHandler, IntentHandlers, Skill, SkillDispatcher};
pub use speech::SpeechBuilder;
pub use store::{AttributeStore, MemoryAttributeStore, SqliteAttributeStore, StoreError};
pub use transform::{
    transform_fn, Interaction, RepeatTransform, SkillState, Stimulus, Transform, TransformSkill,
    TransformTable,
};
