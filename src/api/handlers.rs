//! HTTP request handlers

use super::types::ErrorResponse;
use super::AppState;
use crate::envelope::RequestEnvelope;
use crate::error::{SkillError, SkillErrorKind};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Platform webhook
        .route("/skill", post(handle_skill))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Skill Webhook
// ============================================================

/// Run one envelope through the dispatcher. A session-ended request yields
/// `204 No Content`.
async fn handle_skill(
    State(state): State<AppState>,
    Json(envelope): Json<RequestEnvelope>,
) -> Result<Response, AppError> {
    match state.dispatcher.execute(envelope).await? {
        Some(response) => Ok(Json(response).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("funcy-skill ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

/// Dispatch failure mapped to an HTTP status
#[derive(Debug)]
struct AppError(SkillError);

impl From<SkillError> for AppError {
    fn from(err: SkillError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            SkillErrorKind::Forbidden => StatusCode::FORBIDDEN,
            SkillErrorKind::Routing => StatusCode::BAD_REQUEST,
            SkillErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::from(&self.0));
        (status, body).into_response()
    }
}
