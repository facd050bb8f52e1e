use axum::http::StatusCode;

use crate::application::admin::{
    comments::AdminCommentService, posts::AdminPostService, subscribers::AdminSubscriberService,
};
use crate::application::error::HttpError;
use crate::application::repos::AccessToken;
use crate::domain::entities::PostRecord;
use crate::domain::posts::{ADMIN_TIMESTAMP_FORMAT, format_date};
use crate::presentation::admin::views::{
    AdminDashboardView, AdminMetricView, AdminRecentPostView,
};

const SOURCE: &str = "application::admin::dashboard::AdminDashboardService";
const RECENT_POSTS: usize = 5;

#[derive(Clone)]
pub struct AdminDashboardService {
    posts: AdminPostService,
    comments: AdminCommentService,
    subscribers: AdminSubscriberService,
}

impl AdminDashboardService {
    pub fn new(
        posts: AdminPostService,
        comments: AdminCommentService,
        subscribers: AdminSubscriberService,
    ) -> Self {
        Self {
            posts,
            comments,
            subscribers,
        }
    }

    pub async fn overview(&self, token: &AccessToken) -> Result<AdminDashboardView, HttpError> {
        let posts = async {
            self.posts
                .status_counts(token)
                .await
                .map_err(|err| failure("Failed to count posts", &err))
        };
        let recent = async {
            self.posts
                .recent(token, RECENT_POSTS)
                .await
                .map_err(|err| failure("Failed to load recent posts", &err))
        };
        let comments = async {
            self.comments
                .counts(token)
                .await
                .map_err(|err| failure("Failed to count comments", &err))
        };
        let subscribers = async {
            self.subscribers
                .list(token)
                .await
                .map_err(|err| failure("Failed to count subscribers", &err))
        };

        let (counts, recent, comments, subscribers) =
            futures::try_join!(posts, recent, comments, subscribers)?;

        let mut pending_metric = metric(
            "Pending comments",
            comments.pending,
            "/comments?status=pending",
        );
        if comments.pending > 0 {
            pending_metric.hint = Some("Awaiting moderation".to_string());
        }

        let metrics = vec![
            metric("Total posts", counts.all, "/posts"),
            metric("Published", counts.published, "/posts?status=published"),
            metric("Drafts", counts.draft, "/posts?status=draft"),
            pending_metric,
            metric(
                "Approved comments",
                comments.approved,
                "/comments?status=approved",
            ),
            metric("Subscribers", subscribers.len() as u64, "/subscribers"),
        ];

        Ok(AdminDashboardView {
            title: "Dashboard".to_string(),
            metrics,
            recent_posts: recent.iter().map(recent_post).collect(),
            new_post_href: "/posts/new".to_string(),
            empty_message: "No posts yet. Write your first one.".to_string(),
        })
    }
}

fn metric(label: &str, value: u64, href: &str) -> AdminMetricView {
    AdminMetricView {
        label: label.to_string(),
        value,
        hint: None,
        href: href.to_string(),
    }
}

fn recent_post(post: &PostRecord) -> AdminRecentPostView {
    AdminRecentPostView {
        title: post.title.clone(),
        status_key: post.status.as_str().to_string(),
        status_label: post.status.label().to_string(),
        updated: format_date(post.updated_at.or(post.created_at), ADMIN_TIMESTAMP_FORMAT),
        edit_href: format!("/posts/{}/edit", post.id),
    }
}

fn failure(message: &'static str, err: &dyn std::error::Error) -> HttpError {
    HttpError::from_error(SOURCE, StatusCode::BAD_GATEWAY, message, err)
}
