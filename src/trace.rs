//! Scoped execution helpers
//!
//! Run a callback inside a named span, log start and outcome at debug level,
//! and hand the result back untouched. Error-level reporting belongs to the
//! caller at the top of the request. The span is closed on
//! every exit path (guard drop / `Instrument`).

use std::fmt::Display;
use std::future::Future;
use tracing::Instrument;

/// Run `f` inside a `scope` span named `lc`
pub fn traced<T, E, F>(lc: &'static str, f: F) -> Result<T, E>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    let span = tracing::debug_span!("scope", lc = lc);
    let _guard = span.enter();
    tracing::debug!("Starting...");
    let result = f();
    log_outcome(&result);
    result
}

/// Async counterpart of [`traced`]
pub async fn traced_async<T, E, F>(lc: &'static str, fut: F) -> Result<T, E>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    let span = tracing::debug_span!("scope", lc = lc);
    async move {
        tracing::debug!("Starting...");
        let result = fut.await;
        log_outcome(&result);
        result
    }
    .instrument(span)
    .await
}

fn log_outcome<T, E: Display>(result: &Result<T, E>) {
    match result {
        Ok(_) => tracing::debug!("Complete."),
        Err(e) => tracing::debug!(error = %e, "Scope failed"),
    }
}
