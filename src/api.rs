//! HTTP surface for hosting a skill
//!
//! The platform POSTs request envelopes to `/skill`.

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::skill::SkillDispatcher;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<SkillDispatcher>,
}

impl AppState {
    pub fn new(dispatcher: SkillDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}
