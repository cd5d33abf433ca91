use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use chrono::Utc;
use tracing::info;

use crate::{
    api::{
        dtos::{
            ArticleListResponse, ArticleResponse, BriefingParams, BriefingResponse, CleanupParams,
            CleanupResponse, EnhanceRequest, EnhanceResponse, FetchResponse, StatsResponse,
        },
        errors::{ApiError, ErrorResponse},
    },
    app_state::AppState,
    ingest::CycleOutcome,
    query::ListArticlesRequest,
};

#[utoipa::path(
    get,
    path = "/api/rss/articles",
    tag = "articles",
    params(ListArticlesRequest),
    responses(
        (status = 200, description = "Articles, newest first", body = ArticleListResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_articles(
    State(state): State<AppState>,
    params: Result<Query<ListArticlesRequest>, QueryRejection>,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let Query(request) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let articles = state.query.list(request).await?;

    Ok(Json(ArticleListResponse {
        count: articles.len(),
        articles,
        timestamp: Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/rss/articles/{id}",
    tag = "articles",
    params(("id" = i64, Path, description = "Article id")),
    responses(
        (status = 200, description = "The article", body = ArticleResponse),
        (status = 404, description = "No such article", body = ErrorResponse)
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let article = state
        .query
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;

    Ok(Json(ArticleResponse {
        article,
        timestamp: Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/rss/stats",
    tag = "articles",
    responses(
        (status = 200, description = "Store statistics", body = StatsResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.query.stats().await?;
    Ok(Json(StatsResponse {
        stats,
        timestamp: Utc::now(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/rss/fetch",
    tag = "ingestion",
    responses(
        (status = 200, description = "Cycle report; failed sources are listed in errors", body = FetchResponse),
        (status = 409, description = "A cycle is already running", body = ErrorResponse)
    )
)]
pub async fn trigger_fetch(State(state): State<AppState>) -> Result<Json<FetchResponse>, ApiError> {
    match state.pipeline.run_cycle().await {
        CycleOutcome::Completed(report) => {
            info!(fetched = report.fetched, saved = report.saved, "manual ingestion finished");
            Ok(Json(FetchResponse {
                message: format!(
                    "Fetched {} articles, saved {} new",
                    report.fetched, report.saved
                ),
                result: report,
                timestamp: Utc::now(),
            }))
        }
        CycleOutcome::AlreadyRunning => Err(ApiError::Conflict(
            "An ingestion cycle is already running".to_string(),
        )),
    }
}

#[utoipa::path(
    delete,
    path = "/api/rss/cleanup",
    tag = "ingestion",
    params(CleanupParams),
    responses(
        (status = 200, description = "Old articles removed", body = CleanupResponse),
        (status = 400, description = "Invalid days", body = ErrorResponse)
    )
)]
pub async fn cleanup(
    State(state): State<AppState>,
    params: Result<Query<CleanupParams>, QueryRejection>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let days = params
        .validate(state.retention_days)
        .map_err(ApiError::BadRequest)?;
    let deleted = state.store.delete_older_than(days).await?;

    Ok(Json(CleanupResponse {
        message: format!("Deleted {deleted} articles older than {days} days"),
        deleted,
        timestamp: Utc::now(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/rss/enhance",
    tag = "ingestion",
    request_body(content = EnhanceRequest, description = "Optional; limit defaults to 10"),
    responses(
        (status = 200, description = "Number of articles scored", body = EnhanceResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse)
    )
)]
pub async fn enhance(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EnhanceResponse>, ApiError> {
    let request: EnhanceRequest = if body.iter().all(u8::is_ascii_whitespace) {
        EnhanceRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };
    let limit = request.validate().map_err(ApiError::BadRequest)?;

    let message = if state.enhancement.is_available() {
        None
    } else {
        Some("Enhancement unavailable: no validator configured".to_string())
    };
    let enhanced = state.enhancement.enhance(limit).await?;

    Ok(Json(EnhanceResponse {
        message: message.unwrap_or_else(|| format!("Enhanced {enhanced} articles")),
        enhanced,
        timestamp: Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/news/daily-briefing",
    tag = "news",
    params(BriefingParams),
    responses(
        (status = 200, description = "Newest articles, topped up from news APIs when feeds are thin", body = BriefingResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn daily_briefing(
    State(state): State<AppState>,
    params: Result<Query<BriefingParams>, QueryRejection>,
) -> Result<Json<BriefingResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let briefing = state.briefing.daily(params.rss.unwrap_or(true)).await?;

    Ok(Json(BriefingResponse {
        count: briefing.articles.len(),
        articles: briefing.articles,
        stats: briefing.stats,
        source: briefing.source,
        timestamp: Utc::now(),
    }))
}
