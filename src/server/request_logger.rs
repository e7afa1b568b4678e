use crate::auth::jwt::UserClaims;
use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::{net::SocketAddr, time::Instant};
use tracing::info;

fn is_logged_route(path: &str) -> bool {
    path.starts_with("/api") || path.starts_with("/health")
}

/// Logs one line per API request and one per response
pub async fn request_response_logger(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if !is_logged_route(&path) {
        return next.run(req).await;
    }

    let method = req.method().to_string();
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|connect_info| connect_info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    info!(method = %method, path = %path, ip = %ip, "API request");

    let start = Instant::now();
    let response = next.run(req).await;

    // Set by jwt_auth_middleware on authenticated responses
    let user = response
        .extensions()
        .get::<UserClaims>()
        .map(|claims| claims.username.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    info!(
        method = %method,
        path = %path,
        user = %user,
        status = %response.status().as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        "API response"
    );

    response
}
