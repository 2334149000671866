use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use color_eyre::eyre::{Context, eyre};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    database::Database,
    http_server::{
        error::fallback,
        http_routes::{artists, pages, shows, venues},
        state::AppState,
        templates::Templates,
    },
    ports::clock::Clock,
};

pub struct HttpServerConfig {
    pub port: u16,
    pub database: Database,
    pub clock: Arc<dyn Clock>,
    pub static_dir: PathBuf,
}

pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/venues", get(venues::list))
        .route("/venues/search", post(venues::search))
        .route(
            "/venues/create",
            get(venues::create_form).post(venues::create),
        )
        .route("/venues/{id}", get(venues::detail).delete(venues::delete))
        .route(
            "/venues/{id}/edit",
            get(venues::edit_form).post(venues::edit),
        )
        .route("/artists", get(artists::list))
        .route("/artists/search", post(artists::search))
        .route(
            "/artists/create",
            get(artists::create_form).post(artists::create),
        )
        .route(
            "/artists/{id}",
            get(artists::detail).delete(artists::delete),
        )
        .route(
            "/artists/{id}/edit",
            get(artists::edit_form).post(artists::edit),
        )
        .route("/shows", get(shows::list))
        .route("/shows/create", get(shows::create_form).post(shows::create))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start(config: HttpServerConfig) -> color_eyre::Result<()> {
    let HttpServerConfig {
        port,
        database,
        clock,
        static_dir,
    } = config;

    let app_state = Arc::new(AppState {
        db: Arc::new(database),
        clock,
        templates: Templates::new()?,
    });

    if !static_dir.is_dir() {
        tracing::warn!(
            "Static directory {} does not exist, /static will return 404",
            static_dir.display()
        );
    }

    let app = router(app_state, &static_dir);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", port))?;
    tracing::info!("Listening on http://localhost:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Failed to start HTTP server")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, starting shutdown");
}
