use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use uuid::Uuid;

use quire::application::admin::comments::AdminCommentService;
use quire::application::repos::{
    AccessToken, HealthRepo, PostDraft, PostsRepo, PostsWriteRepo, PublishedQuery, RepoError,
    SessionRepo,
};
use quire::config::ApiSettings;
use quire::domain::types::{CommentStatus, PostStatus};
use quire::infra::remote::RemoteApi;

fn client(server: &MockServer) -> RemoteApi {
    let base = format!("{}/api/v1/", server.base_url());
    RemoteApi::new(&ApiSettings {
        base_url: base.parse().expect("base url"),
        timeout: Duration::from_secs(5),
    })
    .expect("client")
}

#[tokio::test]
async fn published_listing_decodes_wrapped_envelope() -> Result<(), RepoError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/v1/public/posts")
            .query_param("page", "2")
            .query_param("limit", "9")
            .query_param("category", "rust");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{"data":{"posts":[{"id":"6f1c8d1e-2b0c-4f55-9a5e-3f7b8c9d0e1f","title":"Hello","slug":"hello","status":"published","tags":"rust, web","category":"Rust","created_at":"2024-05-01T10:00:00Z"}],"total":10}}"#,
            );
    });

    let mut query = PublishedQuery::page(2, 9);
    query.category = Some("rust".into());
    let page = client(&server).list_published(&query).await?;

    mock.assert();
    assert_eq!(page.total, 10);
    assert_eq!(page.posts.len(), 1);
    let post = &page.posts[0];
    assert_eq!(post.slug, "hello");
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
    assert_eq!(post.categories[0].name, "Rust");
    assert!(post.created_at.is_some());
    Ok(())
}

#[tokio::test]
async fn missing_post_maps_to_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/v1/public/posts/nope");
        then.status(404)
            .header("content-type", "application/json")
            .body(r#"{"error":"Post not found"}"#);
    });

    let err = client(&server)
        .find_published("nope")
        .await
        .expect_err("missing post");
    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn login_then_bearer_token_on_current_user() -> Result<(), RepoError> {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method("POST")
            .path("/api/v1/auth/login")
            .json_body_includes(r#"{"email":"ed@example.com","password":"secret"}"#);
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{"token":"abc123","user":{"id":"0b9a3f5e-8d2c-4e1f-a7b6-c5d4e3f2a1b0","username":"ed","email":"ed@example.com","role":"admin","is_active":true}}"#,
            );
    });
    let me = server.mock(|when, then| {
        when.method("GET")
            .path("/api/v1/users/me")
            .header("authorization", "Bearer abc123");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{"user":{"id":"0b9a3f5e-8d2c-4e1f-a7b6-c5d4e3f2a1b0","username":"ed","email":"ed@example.com","role":"admin","is_active":true}}"#,
            );
    });

    let api = client(&server);
    let session = api.login("ed@example.com", "secret").await?;
    assert_eq!(session.token.expose(), "abc123");
    assert!(session.user.is_active);

    let user = api.current_user(&session.token).await?;
    assert_eq!(user.username, "ed");

    login.assert();
    me.assert();
    Ok(())
}

#[tokio::test]
async fn rejected_write_carries_upstream_message() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path("/api/v1/posts/")
            .header("authorization", "Bearer tok")
            .json_body_includes(r#"{"title":"Draft","category":"Rust","tags":"rust,web","status":"draft"}"#);
        then.status(400)
            .header("content-type", "application/json")
            .body(r#"{"error":"Slug already exists"}"#);
    });

    let draft = PostDraft {
        title: "Draft".into(),
        slug: Some("draft".into()),
        body_markdown: "Body".into(),
        status: Some(PostStatus::Draft),
        category: "Rust".into(),
        tags: vec!["rust".into(), "web".into()],
        ..PostDraft::default()
    };
    let err = client(&server)
        .create_post(&AccessToken::new("tok"), &draft)
        .await
        .expect_err("rejected write");

    mock.assert();
    match err {
        RepoError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Slug already exists");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn expired_token_maps_to_unauthorized() {
    let server = MockServer::start();
    let id = Uuid::new_v4();
    server.mock(|when, then| {
        when.method("POST")
            .path(format!("/api/v1/posts/{id}/publish"));
        then.status(401);
    });

    let err = client(&server)
        .publish_post(&AccessToken::new("stale"), id)
        .await
        .expect_err("expired token");
    assert!(matches!(err, RepoError::Unauthorized));
}

#[tokio::test]
async fn health_check_hits_api_origin() -> Result<(), RepoError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/health");
        then.status(200);
    });

    client(&server).ping().await?;
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn unreachable_api_is_unavailable() {
    let api = RemoteApi::new(&ApiSettings {
        base_url: "http://127.0.0.1:9/api/v1/".parse().expect("base url"),
        timeout: Duration::from_secs(2),
    })
    .expect("client");

    let err = api.ping().await.expect_err("nothing listens on port 9");
    assert!(matches!(err, RepoError::Unavailable(_)));
}

#[tokio::test]
async fn moderation_counts_come_from_comment_statuses() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/v1/comments/")
            .query_param("offset", "0")
            .header("authorization", "Bearer tok");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{"comments":[
                    {"id":"11111111-1111-4111-8111-111111111111","name":"A","content":"Pending one here","status":"pending"},
                    {"id":"22222222-2222-4222-8222-222222222222","name":"B","content":"Approved one here","status":"approved"},
                    {"id":"33333333-3333-4333-8333-333333333333","name":"C","content":"Approved two here","status":"approved"}
                ],"total":3,"limit":100,"offset":0}"#,
            );
    });

    let service = AdminCommentService::new(Arc::new(client(&server)));
    let token = AccessToken::new("tok");

    let counts = service.counts(&token).await.expect("counts");
    assert_eq!(counts.all, 3);
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.approved, 2);

    let queue = service
        .list(&token, Some(CommentStatus::Pending), 0)
        .await
        .expect("pending queue");
    assert_eq!(queue.page.total, 1);
    assert_eq!(queue.page.comments.len(), 1);
    assert_eq!(queue.page.comments[0].name, "A");

    mock.assert_calls(2);
}
