use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers, Config};
use crate::handlers::events::{create_event, delete_event, get_event, list_events, update_event};
use crate::handlers::{health_check, AppState};

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/api/events", get(list_events).post(create_event))
        .route(
            "/api/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .with_state(state);

    for layer in create_security_headers(config.production) {
        router = router.layer(layer);
    }

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer(&config.allowed_origins)),
    )
}
