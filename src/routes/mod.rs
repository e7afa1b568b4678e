pub mod blogs;
pub mod docs;
pub mod health;
pub mod login;
pub mod stats;
pub mod users;

use crate::server::Server;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use blogs::create_blog_routes;
pub use docs::create_docs_routes;
pub use health::create_health_routes;
pub use login::create_login_routes;
pub use stats::create_stats_routes;
pub use users::create_user_routes;

/// Body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    pub error: String,
}

/// Everything mounted under `/api`
pub fn create_api_routes(server: &Server) -> Router<Server> {
    Router::new()
        .merge(create_blog_routes(server))
        .merge(create_user_routes(server))
        .merge(create_login_routes())
        .merge(create_stats_routes())
        .merge(create_docs_routes())
}
