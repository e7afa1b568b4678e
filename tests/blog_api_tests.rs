mod common;

use axum::http::{Method, StatusCode};
use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn test_blogs_are_returned_as_json() {
    let harness = TestHarness::new().await;
    let blogs = harness.blogs().await;

    assert_eq!(blogs.len(), 3);
    assert_eq!(blogs[0]["title"], "first");
    assert_eq!(blogs[2]["author"], "Vaqif");
}

#[tokio::test]
async fn test_blogs_have_id_and_populated_creator() {
    let harness = TestHarness::new().await;

    for blog in harness.blogs().await {
        assert!(blog["id"].is_i64());
        assert!(blog.get("_id").is_none());
        assert_eq!(blog["user"]["username"], "root");
        assert!(blog["user"].get("password_hash").is_none());
    }
}

#[tokio::test]
async fn test_get_single_blog() {
    let harness = TestHarness::new().await;
    let id = harness.blogs().await[1]["id"].as_i64().unwrap();

    let (status, json) = harness.get(&format!("/api/blogs/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "second");
    assert_eq!(json["likes"], 40);
}

#[tokio::test]
async fn test_get_missing_blog() {
    let harness = TestHarness::new().await;
    let (status, json) = harness.get("/api/blogs/9999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_create_blog_with_token() {
    let harness = TestHarness::new().await;
    let new_blog = json!({
        "title": "fourth",
        "author": "Sahib",
        "url": "youtube.com",
        "likes": 34
    });

    let (status, json) = harness
        .request(
            Method::POST,
            "/api/blogs",
            Some(&harness.root_token),
            Some(new_blog),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["title"], "fourth");
    assert_eq!(json["user"]["id"], harness.root.id);

    let blogs = harness.blogs().await;
    assert_eq!(blogs.len(), 4);
    assert!(blogs.iter().any(|blog| blog["title"] == "fourth"));

    let users = harness.users().await;
    assert_eq!(users[0]["blogs"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_create_blog_without_token() {
    let harness = TestHarness::new().await;
    let new_blog = json!({ "title": "fourth", "author": "Sahib", "url": "youtube.com" });

    let (status, json) = harness
        .request(Method::POST, "/api/blogs", None, Some(new_blog))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "token invalid");
    assert_eq!(harness.blogs().await.len(), 3);
}

#[tokio::test]
async fn test_create_blog_with_garbage_token() {
    let harness = TestHarness::new().await;
    let new_blog = json!({ "title": "fourth", "url": "youtube.com" });

    let (status, json) = harness
        .request(Method::POST, "/api/blogs", Some("not.a.token"), Some(new_blog))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "token invalid");
}

#[tokio::test]
async fn test_likes_default_to_zero() {
    let harness = TestHarness::new().await;
    let new_blog = json!({ "title": "fifth", "author": "Vali", "url": "telegram.com" });

    let (status, json) = harness
        .request(
            Method::POST,
            "/api/blogs",
            Some(&harness.root_token),
            Some(new_blog),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["likes"], 0);
}

#[tokio::test]
async fn test_missing_title_or_url_is_bad_request() {
    let harness = TestHarness::new().await;

    for body in [
        json!({ "author": "Sahib", "url": "youtube.com", "likes": 1 }),
        json!({ "title": "fourth", "author": "Sahib", "likes": 1 }),
    ] {
        let (status, _) = harness
            .request(
                Method::POST,
                "/api/blogs",
                Some(&harness.root_token),
                Some(body),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    assert_eq!(harness.blogs().await.len(), 3);
}

#[tokio::test]
async fn test_delete_blog_by_creator() {
    let harness = TestHarness::new().await;
    let id = harness.blogs().await[0]["id"].as_i64().unwrap();

    let (status, _) = harness
        .request(
            Method::DELETE,
            &format!("/api/blogs/{}", id),
            Some(&harness.root_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let blogs = harness.blogs().await;
    assert_eq!(blogs.len(), 2);
    assert!(blogs.iter().all(|blog| blog["title"] != "first"));
}

#[tokio::test]
async fn test_delete_blog_by_other_user() {
    let harness = TestHarness::new().await;
    let id = harness.blogs().await[0]["id"].as_i64().unwrap();
    let token = harness.signup_and_login("mluukkai", "salainen").await;

    let (status, json) = harness
        .request(
            Method::DELETE,
            &format!("/api/blogs/{}", id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "lack of valid authentication credentials");
    assert_eq!(harness.blogs().await.len(), 3);
}

#[tokio::test]
async fn test_delete_blog_without_token() {
    let harness = TestHarness::new().await;
    let id = harness.blogs().await[0]["id"].as_i64().unwrap();

    let (status, _) = harness
        .request(Method::DELETE, &format!("/api/blogs/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(harness.blogs().await.len(), 3);
}

#[tokio::test]
async fn test_delete_missing_blog() {
    let harness = TestHarness::new().await;

    let (status, _) = harness
        .request(
            Method::DELETE,
            "/api/blogs/9999",
            Some(&harness.root_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_blog() {
    let harness = TestHarness::new().await;
    let id = harness.blogs().await[2]["id"].as_i64().unwrap();
    let changes = json!({
        "title": "third, revised",
        "author": "Vaqif",
        "url": "linkedin.com",
        "likes": 24
    });

    let (status, json) = harness
        .request(Method::PUT, &format!("/api/blogs/{}", id), None, Some(changes))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["likes"], 24);
    assert_eq!(json["title"], "third, revised");
    assert_eq!(json["user"]["username"], "root");

    let (_, stored) = harness.get(&format!("/api/blogs/{}", id)).await;
    assert_eq!(stored["likes"], 24);
}

#[tokio::test]
async fn test_update_missing_blog() {
    let harness = TestHarness::new().await;
    let changes = json!({ "title": "x", "url": "y", "likes": 1 });

    let (status, _) = harness
        .request(Method::PUT, "/api/blogs/9999", None, Some(changes))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_removes_all_blogs() {
    let harness = TestHarness::new().await;

    let (status, _) = harness
        .request(Method::DELETE, "/api/blogs", None, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(harness.blogs().await.is_empty());
}
