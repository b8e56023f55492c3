//! Router assembly shared by the binary and the integration tests.

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::config::RelayConfig;
use crate::ws::handler::ws_handler;

/// Builds the full application: REST, WebSocket, docs and middleware.
pub fn build_app(state: AppState, config: &RelayConfig) -> Router {
    let router = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    let router = router.layer(TraceLayer::new_for_http());
    let router = if config.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
