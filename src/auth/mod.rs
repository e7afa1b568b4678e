pub mod config;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use config::JwtConfig;
pub use jwt::{JwtService, JwtServiceImpl, UserClaims, parse_algorithm};
pub use middleware::{UserExtractor, jwt_auth_middleware};
pub use password::PasswordService;
