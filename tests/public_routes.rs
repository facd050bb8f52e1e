mod support;

use axum::http::StatusCode;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

use quire::application::feed::{CategoriesQuery, FeedService};
use quire::domain::types::PostStatus;

use support::{FakeApi, body_text, category, get, location, post, post_form, public_router};

/// Four Rust posts a day apart, with "Rust Part 4" the newest, plus an empty Go category.
fn category_catalogue() -> std::sync::Arc<FakeApi> {
    let api = FakeApi::seeded();
    let rust = api.categories.lock().expect("categories lock")[0].clone();
    let now = OffsetDateTime::now_utc();
    {
        let mut posts = api.posts.lock().expect("posts lock");
        posts.clear();
        for day in 1..=4 {
            let mut record = post(
                &format!("rust-{day}"),
                &format!("Rust Part {day}"),
                PostStatus::Published,
            );
            record.categories = vec![rust.clone()];
            record.created_at = Some(now - Duration::days(10 - day));
            posts.push(record);
        }
    }
    api.categories
        .lock()
        .expect("categories lock")
        .push(category("Go", "#00ADD8"));
    api
}

#[tokio::test]
async fn home_lists_published_posts_only() {
    let api = FakeApi::seeded();
    let response = public_router(api)
        .oneshot(get("/"))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Hello World"));
    assert!(body.contains("Second Post"));
    assert!(!body.contains("Work In Progress"));
}

#[tokio::test]
async fn blog_filters_by_category() {
    let api = FakeApi::seeded();
    let response = public_router(api)
        .oneshot(get("/blog?category=rust"))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Hello World"));
    assert!(!body.contains("Second Post"));
}

#[tokio::test]
async fn post_page_renders_markdown_and_approved_comments() {
    let api = FakeApi::seeded();
    let response = public_router(api)
        .oneshot(get("/blog/hello-world"))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<strong>post</strong>"));
    assert!(body.contains("Lovely write-up, thanks!"));
    assert!(!body.contains("Buy cheap watches now"));
}

#[tokio::test]
async fn drafts_and_unknown_slugs_are_not_found() {
    let api = FakeApi::seeded();
    let router = public_router(api);

    for uri in ["/blog/work-in-progress", "/blog/missing", "/no-such-page"] {
        let response = router
            .clone()
            .oneshot(get(uri))
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert!(body_text(response).await.contains("Page Not Found"));
    }
}

#[tokio::test]
async fn unreachable_api_renders_unavailable_page() {
    let api = FakeApi::seeded();
    api.set_unavailable(true);
    let response = public_router(api)
        .oneshot(get("/"))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_text(response).await.contains("Temporarily Unavailable"));
}

#[tokio::test]
async fn valid_comment_is_forwarded_and_redirects() {
    let api = FakeApi::seeded();
    let response = public_router(api.clone())
        .oneshot(post_form(
            "/blog/hello-world/comments",
            "name=Grace&email=grace%40example.com&website=&content=A+thoughtful+reply+here",
        ))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/blog/hello-world?comment=submitted#comments"
    );

    let submissions = api.submissions.lock().expect("submissions lock");
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].comment.name, "Grace");
    assert_eq!(submissions[0].parent_id, None);
}

#[tokio::test]
async fn invalid_comment_rerenders_form_with_errors() {
    let api = FakeApi::seeded();
    let response = public_router(api.clone())
        .oneshot(post_form(
            "/blog/hello-world/comments",
            "name=&email=nope&content=short",
        ))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("Name is required"));
    assert!(body.contains("Please enter a valid email address"));
    assert!(body.contains("Comment must be at least 10 characters long"));
    assert!(api.submissions.lock().expect("submissions lock").is_empty());
}

#[tokio::test]
async fn newsletter_subscribe_redirects_back_with_outcome() {
    let api = FakeApi::seeded();
    let router = public_router(api.clone());

    let response = router
        .clone()
        .oneshot(post_form(
            "/newsletter/subscribe",
            "email=reader%40example.com&return_to=%2Fblog%3Fpage%3D2",
        ))
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/blog?page=2&newsletter=subscribed#newsletter"
    );
    assert_eq!(
        api.subscribed.lock().expect("subscribed lock").as_slice(),
        ["reader@example.com".to_string()]
    );

    let response = router
        .oneshot(post_form("/newsletter/subscribe", "email=nope&return_to=%2F"))
        .await
        .expect("router should respond");
    assert_eq!(location(&response), "/?newsletter=invalid#newsletter");
}

#[tokio::test]
async fn unsubscribe_distinguishes_unknown_tokens() {
    let api = FakeApi::seeded();
    let router = public_router(api);

    let ok = router
        .clone()
        .oneshot(get("/newsletter/unsubscribe/known-token"))
        .await
        .expect("router should respond");
    assert_eq!(ok.status(), StatusCode::OK);

    let unknown = router
        .oneshot(get("/newsletter/unsubscribe/stale"))
        .await
        .expect("router should respond");
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_redirects_to_blog_listing() {
    let api = FakeApi::seeded();
    let response = public_router(api)
        .oneshot(get("/search?q=hello"))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/blog?"));
    assert!(location(&response).contains("q=hello"));
}

#[tokio::test]
async fn health_reflects_upstream() {
    let api = FakeApi::seeded();
    let router = public_router(api.clone());

    let healthy = router
        .clone()
        .oneshot(get("/_health"))
        .await
        .expect("router should respond");
    assert_eq!(healthy.status(), StatusCode::NO_CONTENT);

    api.set_unavailable(true);
    let down = router
        .oneshot(get("/_health"))
        .await
        .expect("router should respond");
    assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn static_assets_are_served() {
    let api = FakeApi::seeded();
    let response = public_router(api)
        .oneshot(get("/static/public/site.css"))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/css"));
}

#[tokio::test]
async fn category_overview_keeps_newest_three_and_skips_empty() {
    let api = category_catalogue();
    let feed = FeedService::new(api.clone(), api, "http://localhost:8080");
    let overview = feed
        .categories(&CategoriesQuery {
            page: 1,
            ..CategoriesQuery::default()
        })
        .await
        .expect("categories");

    assert!(overview.is_overview);
    assert_eq!(overview.groups.len(), 1);
    let group = &overview.groups[0];
    assert_eq!(group.category.slug, "rust");
    assert_eq!(group.total, 4);
    let titles: Vec<_> = group.posts.iter().map(|card| card.title.as_str()).collect();
    assert_eq!(titles, vec!["Rust Part 4", "Rust Part 3", "Rust Part 2"]);
}

#[tokio::test]
async fn categories_page_renders_groups_and_filters() {
    let router = public_router(category_catalogue());

    let overview = router
        .clone()
        .oneshot(get("/categories"))
        .await
        .expect("router should respond");
    assert_eq!(overview.status(), StatusCode::OK);
    let body = body_text(overview).await;
    assert!(body.contains("View all 4"));
    assert!(body.contains("Rust Part 4"));
    assert!(!body.contains("Rust Part 1"));
    assert!(!body.contains("Posts about Go"));

    let search = router
        .oneshot(get("/categories?search=part+1&sort=oldest"))
        .await
        .expect("router should respond");
    assert_eq!(search.status(), StatusCode::OK);
    let body = body_text(search).await;
    assert!(body.contains("1 posts"));
    assert!(body.contains("Rust Part 1"));
    assert!(!body.contains("Rust Part 2"));
}

#[tokio::test]
async fn blog_page_past_the_end_shows_empty_state() {
    let response = public_router(FakeApi::seeded())
        .oneshot(get("/blog?page=99"))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("No posts found."));
    assert!(!body.contains("Hello World"));
}

#[tokio::test]
async fn card_and_post_page_agree_on_reading_time() {
    let api = FakeApi::seeded();
    {
        let mut posts = api.posts.lock().expect("posts lock");
        let record = posts
            .iter_mut()
            .find(|post| post.slug == "hello-world")
            .expect("seeded post");
        record.body_markdown = format!(
            "{}\n\n```rust\n{}\n```\n",
            "word ".repeat(150),
            "let x = 1; ".repeat(100)
        );
    }
    let router = public_router(api);

    let listing = body_text(
        router
            .clone()
            .oneshot(get("/blog?category=rust"))
            .await
            .expect("router should respond"),
    )
    .await;
    let detail = body_text(
        router
            .oneshot(get("/blog/hello-world"))
            .await
            .expect("router should respond"),
    )
    .await;

    for body in [&listing, &detail] {
        assert!(body.contains("1 min read"));
        assert!(!body.contains("2 min read"));
    }
}
