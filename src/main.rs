//! Skill server
//!
//! Hosts the demo greeter skill behind the platform webhook.

mod greeter;

use funcy_skill::api::{create_router, AppState};
use funcy_skill::{SkillConfig, SkillDispatcher};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "funcy_skill=info,skill_server=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = SkillConfig::from_env();

    if config.application_id.is_none() {
        tracing::warn!("SKILL_APPLICATION_ID not set; accepting requests from any application");
    }

    // Ensure database directory exists
    if config.persistence_enabled() {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    } else {
        tracing::info!("SKILL_TABLE_NAME not set; attributes round-trip through the envelope");
    }

    let skill = greeter::greeter_skill();
    tracing::info!(
        launch = %skill.launch_name(),
        stimuli = ?skill.table().names(),
        "Greeter skill registered"
    );

    let dispatcher = SkillDispatcher::from_config(Arc::new(skill), &config)?;
    let app = create_router(AppState::new(dispatcher)).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Skill server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
