use crate::{
    aggregator::{self, BlogListSummary},
    error::AppError,
    routes::ApiErrorResponse,
    server::Server,
};
use axum::{Json, Router, extract::State, routing::get};

/// Summary statistics over every stored blog
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Blog list summary", body = BlogListSummary),
        (status = 500, description = "Internal server error", body = ApiErrorResponse)
    ),
    tag = "Stats"
)]
pub async fn get_stats(State(server): State<Server>) -> Result<Json<BlogListSummary>, AppError> {
    let records = server.database.blogs().all_records().await?;
    Ok(Json(aggregator::summarize(&records)))
}

pub fn create_stats_routes() -> Router<Server> {
    Router::new().route("/stats", get(get_stats))
}
