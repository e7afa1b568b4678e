use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use bloglist::{
    Server,
    database::{NewBlog, entities::UserRecord},
    test_utils::{TestServerBuilder, create_test_user, fixtures, token_for},
};
use serde_json::Value;
use tower::ServiceExt;

#[allow(dead_code)]
pub const ROOT_USERNAME: &str = "root";
#[allow(dead_code)]
pub const ROOT_PASSWORD: &str = "sekret";

/// A migrated in-memory server seeded with one user who owns the initial blogs
pub struct TestHarness {
    pub server: Server,
    pub app: Router,
    pub root: UserRecord,
    pub root_token: String,
}

impl TestHarness {
    pub async fn new() -> Self {
        let server = TestServerBuilder::new().build().await;
        let root = create_test_user(&server, ROOT_USERNAME, ROOT_PASSWORD).await;
        let root_token = token_for(&server, &root);

        for blog in fixtures::initial_blogs() {
            server
                .database
                .blogs()
                .create(NewBlog {
                    title: blog.title,
                    author: blog.author,
                    url: blog.url,
                    likes: blog.likes as i64,
                    user_id: Some(root.id),
                })
                .await
                .unwrap();
        }

        let app = server.create_app();
        Self {
            server,
            app,
            root,
            root_token,
        }
    }

    /// Send a request and return status plus parsed JSON body (`Value::Null` when empty)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    #[allow(dead_code)]
    pub async fn blogs(&self) -> Vec<Value> {
        let (status, json) = self.get("/api/blogs").await;
        assert_eq!(status, StatusCode::OK);
        json.as_array().unwrap().clone()
    }

    #[allow(dead_code)]
    pub async fn users(&self) -> Vec<Value> {
        let (status, json) = self.get("/api/users").await;
        assert_eq!(status, StatusCode::OK);
        json.as_array().unwrap().clone()
    }

    /// Register a user through the API and log them in, returning the token
    #[allow(dead_code)]
    pub async fn signup_and_login(&self, username: &str, password: &str) -> String {
        let credentials = serde_json::json!({ "username": username, "password": password });

        let (status, _) = self
            .request(Method::POST, "/api/users", None, Some(credentials.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, json) = self
            .request(Method::POST, "/api/login", None, Some(credentials))
            .await;
        assert_eq!(status, StatusCode::OK);
        json["token"].as_str().unwrap().to_string()
    }
}
