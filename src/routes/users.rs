use crate::{
    database::{
        DatabaseError,
        entities::{BlogEntry, UserRecord},
    },
    error::AppError,
    routes::ApiErrorResponse,
    server::Server,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

const MIN_CREDENTIAL_LENGTH: usize = 3;

fn duplicate_username() -> AppError {
    AppError::BadRequest("expected `username` to be unique".to_string())
}

/// Blog summary embedded in user responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserBlog {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: i64,
}

impl From<BlogEntry> for UserBlog {
    fn from(blog: BlogEntry) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            author: blog.author,
            url: blog.url,
            likes: blog.likes,
        }
    }
}

/// User response model for API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// User ID
    pub id: i32,
    pub username: String,
    /// Display name
    pub name: Option<String>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Blogs created by this user
    pub blogs: Vec<UserBlog>,
}

impl UserResponse {
    pub fn new(user: UserRecord, blogs: Vec<BlogEntry>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            created_at: user.created_at,
            blogs: blogs.into_iter().map(UserBlog::from).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl CreateUserRequest {
    /// Returns `(username, password)` when both are present and long enough
    fn credentials(&self) -> Result<(&str, &str), AppError> {
        let (Some(username), Some(password)) = (non_empty(&self.username), non_empty(&self.password))
        else {
            return Err(AppError::BadRequest(
                "both username and password required".to_string(),
            ));
        };

        if username.chars().count() < MIN_CREDENTIAL_LENGTH
            || password.chars().count() < MIN_CREDENTIAL_LENGTH
        {
            return Err(AppError::BadRequest(
                "username and password length should be at least 3".to_string(),
            ));
        }

        Ok((username, password))
    }
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing, short or duplicate credentials", body = ApiErrorResponse)
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(server): State<Server>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let (username, password) = request.credentials()?;
    let users = server.database.users();

    if users.find_by_username(username).await?.is_some() {
        return Err(duplicate_username());
    }

    let password_hash = server.password_service.hash(password.to_string()).await?;
    let record = UserRecord::new(username, password_hash).with_name(request.name.clone());

    // A concurrent registration can still win the race to the unique index
    let user = users.create(&record).await.map_err(|e| match e {
        DatabaseError::Constraint(_) => duplicate_username(),
        other => AppError::Database(other),
    })?;

    info!(user_id = %user.id, username = %user.username, "User created");

    Ok((StatusCode::CREATED, Json(UserResponse::new(user, Vec::new()))))
}

/// List all users with the blogs they created
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 500, description = "Internal server error", body = ApiErrorResponse)
    ),
    tag = "Users"
)]
pub async fn list_users(State(server): State<Server>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = server.database.users().find_all_with_blogs().await?;

    Ok(Json(
        users
            .into_iter()
            .map(|(user, blogs)| UserResponse::new(user, blogs))
            .collect(),
    ))
}

/// Remove every user (reset endpoint)
pub async fn delete_all_users(State(server): State<Server>) -> Result<StatusCode, AppError> {
    let removed = server.database.users().delete_all().await?;
    info!(removed = %removed, "All users deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_user_routes(server: &Server) -> Router<Server> {
    let mut collection = get(list_users).post(create_user);
    if server.config.server.enable_reset_endpoints {
        collection = collection.merge(delete(delete_all_users));
    }

    Router::new().route("/users", collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: Option<&str>, password: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            username: username.map(str::to_string),
            name: None,
            password: password.map(str::to_string),
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::BadRequest(msg) => msg,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_credentials() {
        for req in [
            request(None, Some("sekret")),
            request(Some("root"), None),
            request(Some(""), Some("sekret")),
            CreateUserRequest::default(),
        ] {
            assert_eq!(
                message(req.credentials().unwrap_err()),
                "both username and password required"
            );
        }
    }

    #[test]
    fn test_short_credentials() {
        for req in [request(Some("ro"), Some("sekret")), request(Some("root"), Some("se"))] {
            assert_eq!(
                message(req.credentials().unwrap_err()),
                "username and password length should be at least 3"
            );
        }
    }

    #[test]
    fn test_valid_credentials() {
        let req = request(Some("mluukkai"), Some("salainen"));
        assert_eq!(req.credentials().unwrap(), ("mluukkai", "salainen"));
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let user = UserRecord::new("root", "$argon2id$hash").with_name(Some("Superuser".into()));
        let json = serde_json::to_value(UserResponse::new(user, Vec::new())).unwrap();

        assert_eq!(json["username"], "root");
        assert_eq!(json["name"], "Superuser");
        assert!(json["blogs"].as_array().unwrap().is_empty());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }
}
