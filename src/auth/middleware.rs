use crate::database::entities::UserRecord;
use crate::error::AppError;
use crate::server::Server;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{trace, warn};

fn token_invalid() -> AppError {
    AppError::Unauthorized("token invalid".to_string())
}

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Requires a valid login token and puts the matching user into request extensions
pub async fn jwt_auth_middleware(
    State(server): State<Server>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    let token = bearer_token(&parts).ok_or_else(|| {
        trace!(path = %parts.uri.path(), "Request without bearer token");
        token_invalid()
    })?;

    let claims = server.jwt_service.validate_token(token)?;

    let user = server
        .database
        .users()
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "Token refers to a user that no longer exists");
            token_invalid()
        })?;

    trace!(user_id = %user.id, username = %user.username, "User authentication successful");

    parts.extensions.insert(claims.clone());
    parts.extensions.insert(user);

    let mut response = next.run(Request::from_parts(parts, body)).await;
    response.extensions_mut().insert(claims);
    Ok(response)
}

/// The user authenticated by [`jwt_auth_middleware`]
pub struct UserExtractor(pub UserRecord);

impl<S> FromRequestParts<S> for UserExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserRecord>()
            .cloned()
            .map(UserExtractor)
            .ok_or_else(token_invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{JwtService, JwtServiceImpl, UserClaims};
    use crate::test_utils::TestServerBuilder;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
    };
    use jsonwebtoken::Algorithm;
    use tower::ServiceExt;

    async fn whoami(UserExtractor(user): UserExtractor) -> String {
        user.username
    }

    fn protected_app(server: &Server) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(
                server.clone(),
                jwt_auth_middleware,
            ))
    }

    fn request_with(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let server = TestServerBuilder::new().build().await;
        let user = crate::test_utils::create_test_user(&server, "root", "sekret").await;
        let token = crate::test_utils::token_for(&server, &user);

        let response = protected_app(&server)
            .oneshot(request_with(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"root");
    }

    #[tokio::test]
    async fn test_missing_header() {
        let server = TestServerBuilder::new().build().await;

        let response = protected_app(&server)
            .oneshot(request_with(None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_format() {
        let server = TestServerBuilder::new().build().await;

        let response = protected_app(&server)
            .oneshot(request_with(Some("Token abc")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_from_other_secret() {
        let server = TestServerBuilder::new().build().await;
        let user = crate::test_utils::create_test_user(&server, "root", "sekret").await;
        let forged = JwtServiceImpl::new("someone-else", Algorithm::HS256)
            .unwrap()
            .create_token(&UserClaims::for_user(&user, 3600))
            .unwrap();

        let response = protected_app(&server)
            .oneshot(request_with(Some(&format!("Bearer {}", forged))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_for_deleted_user() {
        let server = TestServerBuilder::new().build().await;
        let token = server
            .jwt_service
            .create_token(&UserClaims::new(9999, "ghost", 3600))
            .unwrap();

        let response = protected_app(&server)
            .oneshot(request_with(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_bearer_token_parsing() {
        let (parts, _) = Request::builder()
            .header("Authorization", "Bearer abc.def")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts), Some("abc.def"));

        let (parts, _) = Request::builder()
            .header("Authorization", "Bearer ")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts), None);
    }
}
