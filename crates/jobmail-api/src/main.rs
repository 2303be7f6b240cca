//! jobmail API Server
//!
//! REST API server extracting job-application details from emails.
//!
//! Author: hephaex@gmail.com

use jobmail_api::{create_router, state::AppState};
use jobmail_core::config::{AppConfig, LoggingConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "jobmail_api=debug,jobmail_extractor={},tower_http=debug",
            logging.level
        )
        .into()
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// `JOBMAIL_CONFIG` names a TOML file; environment variables override it
fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("JOBMAIL_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging);

    let addr = config.bind_address();

    // Create application state
    let state = Arc::new(AppState::new(config)?);
    tracing::info!(
        ner = state.parser.tagger_name(),
        "Extraction pipeline ready"
    );

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("jobmail API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
