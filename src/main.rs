use std::net::SocketAddr;

use axum::http::{header, HeaderValue, Method};
use drowsiness_backend::config::Config;
use drowsiness_backend::landmarks::provider_from_config;
use drowsiness_backend::logging::{init_tracing, LogConfig};
use drowsiness_backend::routes::build_router;
use drowsiness_backend::state::AppState;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&LogConfig::from(&config));
    tracing::info!("Starting drowsiness-backend");
    tracing::debug!(?config, "Loaded configuration");

    let landmarks = match provider_from_config(&config.landmarks) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize landmark provider");
            std::process::exit(1);
        }
    };

    let cors_layer = match build_cors_layer(&config.cors_origins) {
        Ok(layer) => layer,
        Err(e) => {
            tracing::error!(error = %e, origins = ?config.cors_origins, "Invalid CORS_ORIGINS");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(&config, landmarks, shutdown_tx.clone());

    let app = build_router(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ));

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");

    let server = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(shutdown_tx));

    if let Err(e) = server.await {
        tracing::error!(error = %e, "HTTP server crashed");
    }

    tracing::info!("Shutdown complete");
}

fn build_cors_layer(origins: &[String]) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let base = CorsLayer::new().allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.iter().any(|o| o == "*") {
        // 通配符模式与 credentials 互斥
        return Ok(base
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_credentials(false));
    }

    let parsed = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(base
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_credentials(true))
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
