use crate::{
    auth::{
        jwt::{JwtService, UserClaims},
        password::PasswordService,
    },
    config::Config,
    database::entities::UserRecord,
    server::Server,
};

/// Builds a [`Server`] backed by a migrated in-memory SQLite database
pub struct TestServerBuilder {
    config: Config,
    jwt_secret: String,
    reset_endpoints: bool,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            jwt_secret: "test-secret".to_string(),
            reset_endpoints: true,
        }
    }

    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }

    pub fn with_reset_endpoints(mut self, enabled: bool) -> Self {
        self.reset_endpoints = enabled;
        self
    }

    /// Start from a custom configuration. Database, JWT and reset settings are still overridden.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> Server {
        let mut config = self.config;
        config.database.url = "sqlite::memory:".to_string();
        config.jwt.secret = self.jwt_secret;
        config.jwt.algorithm = "HS256".to_string();
        config.server.enable_reset_endpoints = self.reset_endpoints;
        config.logging.log_request = false;

        let server = Server::new(config)
            .await
            .unwrap()
            .with_password_service(PasswordService::with_params(1024, 1, 1).unwrap());

        server.database.migrate().await.unwrap();
        server
    }
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Store a user with the given credentials
pub async fn create_test_user(server: &Server, username: &str, password: &str) -> UserRecord {
    let password_hash = server
        .password_service
        .hash(password.to_string())
        .await
        .unwrap();

    server
        .database
        .users()
        .create(&UserRecord::new(username, password_hash))
        .await
        .unwrap()
}

/// A valid login token for `user`
pub fn token_for(server: &Server, user: &UserRecord) -> String {
    let claims = UserClaims::for_user(user, server.config.jwt.token_expiry_seconds);
    server.jwt_service.create_token(&claims).unwrap()
}

/// Canonical sample records shared by every test suite
pub mod fixtures {
    use crate::aggregator::BlogRecord;

    pub fn list_with_one_blog() -> Vec<BlogRecord> {
        vec![
            BlogRecord::new(
                "Go To Statement Considered Harmful",
                "Edsger W. Dijkstra",
                5,
            )
            .with_url(
                "https://homepages.cwi.nl/~storm/teaching/reader/Dijkstra68.pdf",
            ),
        ]
    }

    pub fn list_with_many_blogs() -> Vec<BlogRecord> {
        vec![
            BlogRecord::new("React patterns", "Michael Chan", 7)
                .with_url("https://reactpatterns.com/"),
            BlogRecord::new(
                "Go To Statement Considered Harmful",
                "Edsger W. Dijkstra",
                5,
            )
            .with_url(
                "https://homepages.cwi.nl/~storm/teaching/reader/Dijkstra68.pdf",
            ),
            BlogRecord::new("Canonical string reduction", "Edsger W. Dijkstra", 12)
                .with_url("http://www.cs.utexas.edu/~EWD/transcriptions/EWD08xx/EWD808.html"),
            BlogRecord::new("First class tests", "Robert C. Martin", 10).with_url(
                "http://blog.cleancoder.com/uncle-bob/2017/05/05/TestDefinitions.htmll",
            ),
            BlogRecord::new("TDD harms architecture", "Robert C. Martin", 0).with_url(
                "http://blog.cleancoder.com/uncle-bob/2017/03/03/TDD-Harms-Architecture.html",
            ),
            BlogRecord::new("Type wars", "Robert C. Martin", 2)
                .with_url("http://blog.cleancoder.com/uncle-bob/2016/05/01/TypeWars.html"),
        ]
    }

    pub fn list_with_repeat_author() -> Vec<BlogRecord> {
        vec![
            BlogRecord::new("first", "Aziz", 23).with_url("facebook.com"),
            BlogRecord::new("second", "Sahib", 129).with_url("instagram.com"),
            BlogRecord::new("third", "Said", 222).with_url("linkedin.com"),
            BlogRecord::new("fourth", "Aziz", 3333).with_url("youtube.com"),
        ]
    }

    /// Blogs seeded into the database before each API test
    pub fn initial_blogs() -> Vec<BlogRecord> {
        vec![
            BlogRecord::new("first", "Aziz", 12).with_url("facebook.com"),
            BlogRecord::new("second", "Said", 40).with_url("instagram.com"),
            BlogRecord::new("third", "Vaqif", 23).with_url("linkedin.com"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_builder_default() {
        let server = TestServerBuilder::new().build().await;

        assert_eq!(server.config.database.url, "sqlite::memory:");
        assert_eq!(server.config.jwt.secret, "test-secret");
        assert!(server.config.server.enable_reset_endpoints);
        assert!(!server.config.logging.log_request);
    }

    #[tokio::test]
    async fn test_server_builder_with_custom_jwt_secret() {
        let server = TestServerBuilder::new()
            .with_jwt_secret("custom-test-secret")
            .build()
            .await;

        assert_eq!(server.config.jwt.secret, "custom-test-secret");
    }

    #[tokio::test]
    async fn test_create_test_user_and_token() {
        let server = TestServerBuilder::new().build().await;
        let user = create_test_user(&server, "root", "sekret").await;
        assert!(user.id > 0);

        let claims = server
            .jwt_service
            .validate_token(&token_for(&server, &user))
            .unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "root");
    }

    #[test]
    fn test_fixture_totals() {
        let likes: u64 = fixtures::initial_blogs().iter().map(|b| b.likes).sum();
        assert_eq!(likes, 75);
        assert_eq!(fixtures::list_with_many_blogs().len(), 6);
    }
}
