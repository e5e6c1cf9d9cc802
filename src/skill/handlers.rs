//! Intent handler registry

use crate::envelope::{Intent, ResponseEnvelope};
use crate::error::SkillResult;
use crate::response::ResponseBuilder;
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Handles one named intent
#[async_trait]
pub trait IntentHandler: Send + Sync {
    async fn handle(
        &self,
        intent: &Intent,
        response: ResponseBuilder,
    ) -> SkillResult<ResponseEnvelope>;
}

/// Intent name to handler mapping
#[derive(Default, Clone)]
pub struct IntentHandlers {
    handlers: HashMap<String, Arc<dyn IntentHandler>>,
}

impl IntentHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for `name`
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn IntentHandler>) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn IntentHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Registered intent names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Closure-backed handler, see [`intent_fn`]
pub struct FnIntentHandler<F>(F);

#[async_trait]
impl<F, Fut> IntentHandler for FnIntentHandler<F>
where
    F: Fn(Intent, ResponseBuilder) -> Fut + Send + Sync,
    Fut: Future<Output = SkillResult<ResponseEnvelope>> + Send,
{
    async fn handle(
        &self,
        intent: &Intent,
        response: ResponseBuilder,
    ) -> SkillResult<ResponseEnvelope> {
        (self.0)(intent.clone(), response).await
    }
}

/// Adapt an async closure into an [`IntentHandler`]
pub fn intent_fn<F, Fut>(f: F) -> Arc<dyn IntentHandler>
where
    F: Fn(Intent, ResponseBuilder) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = SkillResult<ResponseEnvelope>> + Send + 'static,
{
    Arc::new(FnIntentHandler(f))
}
