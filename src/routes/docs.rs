use crate::server::Server;
use axum::{Json, Router, routing::get};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bloglist API",
        version = "1.0.0",
        description = "Blog list service with token authentication and summary statistics"
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::blogs::list_blogs,
        crate::routes::blogs::create_blog,
        crate::routes::blogs::get_blog,
        crate::routes::blogs::update_blog,
        crate::routes::blogs::delete_blog,
        crate::routes::users::create_user,
        crate::routes::users::list_users,
        crate::routes::login::login,
        crate::routes::stats::get_stats,
    ),
    components(
        schemas(
            crate::routes::ApiErrorResponse,
            crate::routes::health::HealthCheckQuery,
            crate::health::HealthResponse,
            crate::health::HealthStatus,
            crate::health::HealthCheckResult,
            crate::routes::blogs::BlogRequest,
            crate::routes::blogs::BlogResponse,
            crate::routes::blogs::BlogOwner,
            crate::routes::users::CreateUserRequest,
            crate::routes::users::UserResponse,
            crate::routes::users::UserBlog,
            crate::routes::login::LoginRequest,
            crate::routes::login::LoginResponse,
            crate::aggregator::BlogRecord,
            crate::aggregator::BlogListSummary,
            crate::aggregator::FavoriteSummary,
            crate::aggregator::AuthorBlogCount,
            crate::aggregator::AuthorLikesTotal,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Blogs", description = "Blog list management"),
        (name = "Users", description = "User registration and listing"),
        (name = "Authentication", description = "Token login"),
        (name = "Stats", description = "Aggregate statistics over all blogs"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn create_docs_routes() -> Router<Server> {
    Router::new().route("/docs/openapi.json", get(openapi_json))
}
