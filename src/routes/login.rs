use crate::{
    auth::jwt::UserClaims, error::AppError, routes::ApiErrorResponse, server::Server,
};
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for protected routes
    pub token: String,
    pub username: String,
    pub name: Option<String>,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("invalid username or password".to_string())
}

/// Exchange username and password for a token
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid username or password", body = ApiErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(server): State<Server>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(invalid_credentials());
    };

    let Some(user) = server.database.users().find_by_username(&username).await? else {
        server.password_service.verify_dummy(password).await?;
        warn!(username = %username, "Login attempt for unknown user");
        return Err(invalid_credentials());
    };

    let password_correct = server
        .password_service
        .verify(password, user.password_hash.clone())
        .await?;
    if !password_correct {
        warn!(username = %username, "Login attempt with wrong password");
        return Err(invalid_credentials());
    }

    let claims = UserClaims::for_user(&user, server.config.jwt.token_expiry_seconds);
    let token = server.jwt_service.create_token(&claims)?;

    info!(user_id = %user.id, expires_at = %claims.expires_at(), "User logged in");

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        name: user.name,
    }))
}

pub fn create_login_routes() -> Router<Server> {
    Router::new().route("/login", post(login))
}
