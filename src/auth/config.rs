use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_jwt_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_token_expiry_seconds")]
    pub token_expiry_seconds: u64,
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_token_expiry_seconds() -> u64 {
    3600 // 1 hour
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            algorithm: default_jwt_algorithm(),
            token_expiry_seconds: default_token_expiry_seconds(),
        }
    }
}
