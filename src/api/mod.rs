pub mod dtos;
pub mod errors;
pub mod handlers;

pub use errors::{ApiError, ErrorResponse};

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{app_state::AppState, health};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_articles,
        handlers::get_article,
        handlers::get_stats,
        handlers::trigger_fetch,
        handlers::cleanup,
        handlers::enhance,
        handlers::daily_briefing,
        health::health_check,
    ),
    tags(
        (name = "articles", description = "Stored feed articles"),
        (name = "ingestion", description = "Ingestion, retention and enhancement triggers"),
        (name = "news", description = "Daily briefing"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn router(state: AppState) -> Router {
    let rss = Router::new()
        .route("/articles", get(handlers::list_articles))
        .route("/articles/{id}", get(handlers::get_article))
        .route("/stats", get(handlers::get_stats))
        .route("/fetch", post(handlers::trigger_fetch))
        .route("/cleanup", delete(handlers::cleanup))
        .route("/enhance", post(handlers::enhance));

    Router::new()
        .nest("/api/rss", rss)
        .route("/api/news/daily-briefing", get(handlers::daily_briefing))
        .route("/healthz", get(health::health_check))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}
