use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use crate::adapters::HttpDogApi;
use crate::config::ServerConfig;
use crate::domain::ports::DogApi;
use crate::utils::error::Result;
use routes::{
    area_search_handler, breed_options_handler, breeds_handler, dog_handler, dogs_handler,
    geocode_handler, health_handler, location_search_handler, locations_handler, login_handler,
    logout_handler, match_handler, search_handler,
};
use state::{AppState, SharedState};

/// All `/api` routes plus `/health`.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/breeds", get(breeds_handler))
        .route("/api/dogs", post(dogs_handler))
        .route("/api/dogs/breeds", get(breed_options_handler))
        .route("/api/dogs/match", post(match_handler))
        .route(
            "/api/dogs/search",
            get(search_handler).post(area_search_handler),
        )
        .route("/api/dogs/{id}", get(dog_handler))
        .route("/api/locations", post(locations_handler))
        .route("/api/locations/search", post(location_search_handler))
        .route("/api/locations/geocode", get(geocode_handler))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        return None;
    }

    // 需要帶 cookie，因此不能使用萬用字元 origin
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(60 * 60)),
    )
}

/// Router wired to the real remote API, with tracing and CORS layers.
pub fn build_app(config: &ServerConfig) -> Result<Router> {
    let api: Arc<dyn DogApi> = Arc::new(HttpDogApi::new(config)?);
    let state = AppState::new(api, config.cookie_name.clone());

    let mut app = router(state).layer(TraceLayer::new_for_http());
    if let Some(cors) = cors_layer(&config.allowed_origins) {
        app = app.layer(cors);
    }

    Ok(app)
}

pub async fn start_server(config: ServerConfig) -> Result<()> {
    let address = config.socket_addr()?;
    let app = build_app(&config)?;

    info!("Forwarding to {}", config.base_url);
    info!("Binding to {address}");

    let listener = TcpListener::bind(address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            return std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
