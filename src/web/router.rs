//! Web application router and middleware setup.

use crate::web::config::WebConfig;
use crate::web::{handlers, websocket, AppState};
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Create the main axum application with all routes and middleware.
pub fn create_app(config: &WebConfig, state: AppState) -> Router {
    let mut app = Router::new()
        // API routes
        .route("/api/metrics", get(handlers::get_metrics))
        .route("/api/history", get(handlers::get_history))
        .route("/api/health", get(handlers::health_check))
        // WebSocket route
        .route("/ws", get(websocket::websocket_handler));

    let static_dir = config
        .static_dir
        .clone()
        .filter(|path| {
            let exists = path.is_dir();
            if !exists {
                warn!("Static path {:?} does not exist, serving default index", path);
            }
            exists
        });

    match static_dir {
        Some(static_dir) => {
            info!("Serving static files from: {:?}", static_dir);
            app = app.nest_service("/static", ServeDir::new(&static_dir));

            let index_file = static_dir.join("index.html");
            if index_file.exists() {
                app = app.route_service("/", ServeFile::new(index_file));
            } else {
                app = app.route("/", get(handlers::default_index));
            }
        }
        None => {
            app = app.route("/", get(handlers::default_index));
        }
    }

    if config.cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
