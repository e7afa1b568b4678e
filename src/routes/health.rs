use crate::{health::HealthResponse, server::Server};
use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HealthCheckQuery {
    /// `all` runs every component check, a component name runs only that one
    #[serde(default)]
    pub check: Option<String>,
}

/// Service liveness, plus component checks on request
#[utoipa::path(
    get,
    path = "/health",
    params(HealthCheckQuery),
    responses(
        (status = 200, description = "Health report", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(
    State(server): State<Server>,
    Query(params): Query<HealthCheckQuery>,
) -> Json<HealthResponse> {
    Json(
        server
            .health_service
            .check_health(params.check.as_deref())
            .await,
    )
}

pub fn create_health_routes() -> Router<Server> {
    Router::new().route("/", get(health_check))
}
