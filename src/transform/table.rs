//! Transform table
//!
//! Each stimulus name maps to an ordered chain of transforms. A transform
//! either claims the stimulus (returns the next state) or passes (`None`).
//! The first claim wins; later transforms in the chain are not evaluated.

use super::state::{RepeatOf, SkillState, Stimulus};
use crate::error::{SkillError, SkillResult};
use crate::trace::traced;
use std::collections::HashMap;
use std::sync::Arc;

/// Produces the next state for a stimulus, or passes with `None`
pub trait Transform: Send + Sync {
    fn apply(
        &self,
        table: &TransformTable,
        stimulus: &Stimulus,
        history: &[SkillState],
    ) -> SkillResult<Option<SkillState>>;
}

/// Closure-backed transform, see [`transform_fn`]
pub struct FnTransform<F>(F);

impl<F> Transform for FnTransform<F>
where
    F: Fn(&Stimulus, &[SkillState]) -> SkillResult<Option<SkillState>> + Send + Sync,
{
    fn apply(
        &self,
        _table: &TransformTable,
        stimulus: &Stimulus,
        history: &[SkillState],
    ) -> SkillResult<Option<SkillState>> {
        (self.0)(stimulus, history)
    }
}

/// Adapt a closure into a [`Transform`]
pub fn transform_fn<F>(f: F) -> Arc<dyn Transform>
where
    F: Fn(&Stimulus, &[SkillState]) -> SkillResult<Option<SkillState>> + Send + Sync + 'static,
{
    Arc::new(FnTransform(f))
}

#[derive(Default, Clone)]
pub struct TransformTable {
    chains: HashMap<String, Vec<Arc<dyn Transform>>>,
}

impl TransformTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `transform` to the chain for `name`
    pub fn register(&mut self, name: impl Into<String>, transform: Arc<dyn Transform>) -> &mut Self {
        self.chains.entry(name.into()).or_default().push(transform);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.chains.contains_key(name)
    }

    /// Registered stimulus names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.chains.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the chain for `stimulus.name` against `history`
    pub fn resolve(&self, stimulus: &Stimulus, history: &[SkillState]) -> SkillResult<SkillState> {
        let chain = self
            .chains
            .get(&stimulus.name)
            .ok_or_else(|| SkillError::UnknownStimulusName(stimulus.name.clone()))?;

        for (position, transform) in chain.iter().enumerate() {
            let next = traced("TransformTable.resolve", || {
                transform.apply(self, stimulus, history)
            })?;
            if let Some(state) = next {
                tracing::debug!(
                    stimulus = %stimulus.name,
                    position,
                    location = %state.location,
                    "Transform applied"
                );
                return Ok(state);
            }
        }

        tracing::debug!(
            stimulus = %stimulus.name,
            chain_len = chain.len(),
            history_len = history.len(),
            "No transform produced a state"
        );
        Err(SkillError::NoApplicableTransform {
            stimulus: stimulus.name.clone(),
        })
    }
}

/// Most recent state, optionally the most recent one matching `filter`
pub fn previous_state<'a, P>(history: &'a [SkillState], filter: Option<P>) -> Option<&'a SkillState>
where
    P: Fn(&SkillState) -> bool,
{
    match filter {
        Some(filter) => history.iter().rev().find(|&state| filter(state)),
        None => history.last(),
    }
}

/// Replays the latest non-repeat turn by re-running its transforms.
///
/// The earlier stimulus is cloned, tagged with the repeat request, and
/// resolved again, so dynamic output is recomputed rather than echoed.
/// Passes when there is nothing to repeat. States recorded under the repeat
/// stimulus's own name (a fallback answering an earlier repeat) are never
/// replayed.
#[derive(Debug, Default, Clone, Copy)]
pub struct RepeatTransform;

impl Transform for RepeatTransform {
    fn apply(
        &self,
        table: &TransformTable,
        stimulus: &Stimulus,
        history: &[SkillState],
    ) -> SkillResult<Option<SkillState>> {
        let Some(previous) = previous_state(
            history,
            Some(|state: &SkillState| {
                let earlier = &state.interaction.stimulus;
                !earlier.is_repeat() && earlier.name != stimulus.name
            }),
        ) else {
            tracing::debug!(history_len = history.len(), "Nothing to repeat");
            return Ok(None);
        };

        let mut replay = previous.interaction.stimulus.clone();
        replay.repeat_of = stimulus
            .intent
            .clone()
            .map(RepeatOf::Intent)
            .or_else(|| stimulus.launch_request.clone().map(RepeatOf::Launch));

        tracing::debug!(replay = %replay.name, "Repeating previous stimulus");
        table.resolve(&replay, history).map(Some)
    }
}
