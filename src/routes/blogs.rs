use crate::{
    auth::middleware::{UserExtractor, jwt_auth_middleware},
    database::{
        BlogChanges, NewBlog,
        entities::{BlogEntry, UserRecord},
    },
    error::AppError,
    routes::ApiErrorResponse,
    server::Server,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

/// Creator of a blog, as embedded in blog responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogOwner {
    pub id: i32,
    pub username: String,
    pub name: Option<String>,
}

impl From<UserRecord> for BlogOwner {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogResponse {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: i64,
    /// `null` when the creator no longer exists
    pub user: Option<BlogOwner>,
}

impl BlogResponse {
    pub fn new(blog: BlogEntry, owner: Option<UserRecord>) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            author: blog.author,
            url: blog.url,
            likes: blog.likes,
            user: owner.map(BlogOwner::from),
        }
    }
}

/// Body of create and update requests
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BlogRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Defaults to 0
    #[serde(default)]
    pub likes: Option<i64>,
}

impl BlogRequest {
    fn into_changes(self) -> Result<BlogChanges, AppError> {
        let title = self.title.unwrap_or_default();
        let url = self.url.unwrap_or_default();
        if title.trim().is_empty() || url.trim().is_empty() {
            return Err(AppError::BadRequest("title and url are required".to_string()));
        }

        let likes = self.likes.unwrap_or(0);
        if likes < 0 {
            return Err(AppError::BadRequest(
                "likes must be a non-negative integer".to_string(),
            ));
        }

        Ok(BlogChanges {
            title,
            author: self.author.unwrap_or_default(),
            url,
            likes,
        })
    }
}

/// List all blogs
#[utoipa::path(
    get,
    path = "/api/blogs",
    responses(
        (status = 200, description = "All blogs with their creators", body = [BlogResponse]),
        (status = 500, description = "Internal server error", body = ApiErrorResponse)
    ),
    tag = "Blogs"
)]
pub async fn list_blogs(State(server): State<Server>) -> Result<Json<Vec<BlogResponse>>, AppError> {
    let blogs = server.database.blogs().find_all_with_users().await?;

    Ok(Json(
        blogs
            .into_iter()
            .map(|(blog, owner)| BlogResponse::new(blog, owner))
            .collect(),
    ))
}

/// Create a blog owned by the authenticated user
#[utoipa::path(
    post,
    path = "/api/blogs",
    request_body = BlogRequest,
    responses(
        (status = 201, description = "Blog created", body = BlogResponse),
        (status = 400, description = "Missing title or url", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse)
    ),
    tag = "Blogs",
    security(
        ("jwt_auth" = [])
    )
)]
pub async fn create_blog(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Json(request): Json<BlogRequest>,
) -> Result<(StatusCode, Json<BlogResponse>), AppError> {
    let changes = request.into_changes()?;

    let blog = server
        .database
        .blogs()
        .create(NewBlog {
            title: changes.title,
            author: changes.author,
            url: changes.url,
            likes: changes.likes,
            user_id: Some(user.id),
        })
        .await?;

    info!(blog_id = %blog.id, user_id = %user.id, "Blog created");

    Ok((StatusCode::CREATED, Json(BlogResponse::new(blog, Some(user)))))
}

/// Get a single blog
#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    params(
        ("id" = i32, Path, description = "Blog ID")
    ),
    responses(
        (status = 200, description = "Blog found", body = BlogResponse),
        (status = 404, description = "Blog not found", body = ApiErrorResponse)
    ),
    tag = "Blogs"
)]
pub async fn get_blog(
    State(server): State<Server>,
    Path(blog_id): Path<i32>,
) -> Result<Json<BlogResponse>, AppError> {
    let (blog, owner) = server
        .database
        .blogs()
        .find_with_user(blog_id)
        .await?
        .ok_or_else(|| AppError::NotFound("blog not found".to_string()))?;

    Ok(Json(BlogResponse::new(blog, owner)))
}

/// Replace a blog's title, author, url and likes
#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    params(
        ("id" = i32, Path, description = "Blog ID")
    ),
    request_body = BlogRequest,
    responses(
        (status = 200, description = "Blog updated", body = BlogResponse),
        (status = 400, description = "Missing title or url", body = ApiErrorResponse),
        (status = 404, description = "Blog not found", body = ApiErrorResponse)
    ),
    tag = "Blogs"
)]
pub async fn update_blog(
    State(server): State<Server>,
    Path(blog_id): Path<i32>,
    Json(request): Json<BlogRequest>,
) -> Result<Json<BlogResponse>, AppError> {
    let changes = request.into_changes()?;
    let blogs = server.database.blogs();

    blogs
        .update(blog_id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("blog not found".to_string()))?;

    let (blog, owner) = blogs
        .find_with_user(blog_id)
        .await?
        .ok_or_else(|| AppError::NotFound("blog not found".to_string()))?;

    Ok(Json(BlogResponse::new(blog, owner)))
}

/// Delete a blog. Only its creator may do this.
#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    params(
        ("id" = i32, Path, description = "Blog ID")
    ),
    responses(
        (status = 204, description = "Blog deleted"),
        (status = 401, description = "Missing token or not the creator", body = ApiErrorResponse),
        (status = 404, description = "Blog not found", body = ApiErrorResponse)
    ),
    tag = "Blogs",
    security(
        ("jwt_auth" = [])
    )
)]
pub async fn delete_blog(
    State(server): State<Server>,
    Path(blog_id): Path<i32>,
    UserExtractor(user): UserExtractor,
) -> Result<StatusCode, AppError> {
    let blogs = server.database.blogs();

    let blog = blogs
        .find_by_id(blog_id)
        .await?
        .ok_or_else(|| AppError::NotFound("blog not found".to_string()))?;

    if !blog.is_owned_by(user.id) {
        return Err(AppError::Unauthorized(
            "lack of valid authentication credentials".to_string(),
        ));
    }

    blogs.delete(blog_id).await?;
    info!(blog_id = %blog_id, user_id = %user.id, "Blog deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Remove every blog (reset endpoint)
pub async fn delete_all_blogs(State(server): State<Server>) -> Result<StatusCode, AppError> {
    let removed = server.database.blogs().delete_all().await?;
    info!(removed = %removed, "All blogs deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_blog_routes(server: &Server) -> Router<Server> {
    let require_token = || middleware::from_fn_with_state(server.clone(), jwt_auth_middleware);

    let mut collection = get(list_blogs).merge(post(create_blog).route_layer(require_token()));
    if server.config.server.enable_reset_endpoints {
        collection = collection.merge(delete(delete_all_blogs));
    }

    let item = get(get_blog)
        .put(update_blog)
        .merge(delete(delete_blog).route_layer(require_token()));

    Router::new()
        .route("/blogs", collection)
        .route("/blogs/{id}", item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, url: &str, likes: Option<i64>) -> BlogRequest {
        BlogRequest {
            title: Some(title.to_string()),
            author: None,
            url: Some(url.to_string()),
            likes,
        }
    }

    #[test]
    fn test_likes_default_to_zero() {
        let changes = request("fifth", "telegram.com", None).into_changes().unwrap();
        assert_eq!(changes.likes, 0);
        assert_eq!(changes.author, "");
    }

    #[test]
    fn test_title_and_url_required() {
        assert!(request("", "youtube.com", Some(1)).into_changes().is_err());
        assert!(request("fourth", "  ", Some(1)).into_changes().is_err());
        assert!(BlogRequest::default().into_changes().is_err());
    }

    #[test]
    fn test_negative_likes_rejected() {
        let err = request("a", "b", Some(-1)).into_changes().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_response_without_owner_serializes_null_user() {
        let blog = BlogEntry {
            id: 1,
            title: "first".to_string(),
            author: "Aziz".to_string(),
            url: "facebook.com".to_string(),
            likes: 12,
            user_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let json = serde_json::to_value(BlogResponse::new(blog, None)).unwrap();
        assert_eq!(json["id"], 1);
        assert!(json["user"].is_null());
        assert!(json.get("_id").is_none());
    }
}
