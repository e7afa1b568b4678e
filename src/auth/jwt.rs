use crate::database::entities::UserRecord;
use crate::error::AppError;
use crate::health::{HealthCheckResult, HealthChecker};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

fn config_error(message: String) -> AppError {
    AppError::Config(::config::ConfigError::Message(message))
}

fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

/// Parse the configured signing algorithm. Tokens are issued and verified by
/// this service with one shared secret, so only the HMAC family is accepted.
pub fn parse_algorithm(alg: &str) -> Result<Algorithm, AppError> {
    let algorithm = Algorithm::from_str(alg)
        .map_err(|_| config_error(format!("Unsupported JWT algorithm: {}", alg)))?;

    if !is_hmac(algorithm) {
        return Err(config_error(format!(
            "JWT algorithm {} needs a key pair, use HS256, HS384 or HS512",
            alg
        )));
    }
    Ok(algorithm)
}

/// Claims carried by login tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: i32, // Database user ID
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

impl UserClaims {
    pub fn new(user_id: i32, username: impl Into<String>, expires_in_seconds: u64) -> Self {
        let now = Utc::now().timestamp() as usize;
        Self {
            sub: user_id,
            username: username.into(),
            iat: now,
            exp: now + expires_in_seconds as usize,
        }
    }

    pub fn for_user(user: &UserRecord, expires_in_seconds: u64) -> Self {
        Self::new(user.id, user.username.clone(), expires_in_seconds)
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as usize;
        self.exp <= now
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp as i64, 0).unwrap_or_else(Utc::now)
    }
}

/// JWT service trait for dependency injection and testing
pub trait JwtService: Send + Sync {
    fn create_token(&self, claims: &UserClaims) -> Result<String, AppError>;

    /// Validate signature and expiry, returning the embedded claims
    fn validate_token(&self, token: &str) -> Result<UserClaims, AppError>;

    fn algorithm(&self) -> Algorithm;
}

#[derive(Clone)]
pub struct JwtServiceImpl {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtServiceImpl {
    pub fn new(secret: &str, algorithm: Algorithm) -> Result<Self, AppError> {
        if !is_hmac(algorithm) {
            return Err(config_error(format!(
                "JWT algorithm {:?} is not an HMAC algorithm",
                algorithm
            )));
        }
        if secret.is_empty() {
            return Err(config_error("JWT secret must not be empty".to_string()));
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn health_checker(&self) -> Arc<JwtHealthChecker> {
        Arc::new(JwtHealthChecker {
            service: self.clone(),
        })
    }
}

impl JwtService for JwtServiceImpl {
    fn create_token(&self, claims: &UserClaims) -> Result<String, AppError> {
        let header = Header::new(self.algorithm);
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn validate_token(&self, token: &str) -> Result<UserClaims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<UserClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::Unauthorized("token invalid".to_string()))?;

        Ok(token_data.claims)
    }

    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

/// Signs and verifies a short-lived token to prove the key material works
pub struct JwtHealthChecker {
    service: JwtServiceImpl,
}

#[async_trait]
impl HealthChecker for JwtHealthChecker {
    fn name(&self) -> &str {
        "jwt"
    }

    async fn check(&self) -> HealthCheckResult {
        let algorithm = format!("{:?}", self.service.algorithm);
        let sample = UserClaims::new(0, "health-check", 60);

        let outcome = self
            .service
            .create_token(&sample)
            .and_then(|token| self.service.validate_token(&token));

        match outcome {
            Ok(claims) if claims.username == sample.username => {
                HealthCheckResult::healthy_with_details(serde_json::json!({
                    "algorithm": algorithm,
                    "round_trip": "success"
                }))
            }
            Ok(_) => HealthCheckResult::unhealthy_with_details(
                "Token validation returned incorrect claims".to_string(),
                serde_json::json!({ "algorithm": algorithm }),
            ),
            Err(err) => HealthCheckResult::unhealthy_with_details(
                "JWT round trip failed".to_string(),
                serde_json::json!({
                    "algorithm": algorithm,
                    "error": err.to_string()
                }),
            ),
        }
    }
}
