use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

mod api;
mod config;
mod error;
mod i18n;
mod openai;
mod platform;
mod service;
#[cfg(test)]
mod testing;

use crate::config::{GatewayConfig, RuntimeConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::openai::OpenAiClient;
use crate::service::GatewayService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real environment variables still apply
    let dotenv = dotenvy::dotenv();

    init_logging();

    info!(
        "Starting knowledge base gateway v{}",
        env!("CARGO_PKG_VERSION")
    );
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    // Nothing is bound or connected until configuration validates
    let runtime_config = match startup_config(crate::config::load_config()) {
        Ok(config) => Arc::new(config),
        Err(code) => std::process::exit(code),
    };

    info!(
        host = %runtime_config.server.host,
        port = runtime_config.server.port,
        base_url = %runtime_config.platform.base_url,
        timeout_secs = runtime_config.platform.request_timeout.as_secs(),
        "Configuration loaded"
    );

    let client = OpenAiClient::new(runtime_config.platform.clone())?;
    let service = Arc::new(GatewayService::new(runtime_config.clone(), Arc::new(client)));

    let app = api::router(service);

    let addr = format!(
        "{}:{}",
        runtime_config.server.host, runtime_config.server.port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Exit status when configuration is missing or unreadable
const EXIT_CONFIG: i32 = 1;

/// Turn the loaded configuration into the runtime configuration, or the
/// exit status the process must stop with.
fn startup_config(loaded: ServiceResult<GatewayConfig>) -> Result<RuntimeConfig, i32> {
    let config = loaded.map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        EXIT_CONFIG
    })?;

    let presence = config.presence();
    info!(
        OPENAI_API_KEY = presence.api_key,
        OPENAI_ASSISTANT_ID = presence.assistant_id,
        OPENAI_VECTOR_STORE_ID = presence.vector_store_id,
        "Required configuration values"
    );

    config.validate().map_err(|e| {
        match e {
            ServiceError::ConfigMissing { missing } => {
                error!(missing = ?missing, "Required configuration is missing, refusing to start");
            }
            e => error!(error = %e, "Invalid configuration"),
        }
        EXIT_CONFIG
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kb_gateway_service=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
