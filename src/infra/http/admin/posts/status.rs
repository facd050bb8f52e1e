use std::str::FromStr;

use axum::http::StatusCode;

use crate::{
    application::{admin::posts::AdminPostStatusCounts, error::HttpError},
    domain::types::PostStatus,
    presentation::admin::views as admin_views,
};

pub(super) fn parse_post_status(value: Option<&str>) -> Result<Option<PostStatus>, HttpError> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    PostStatus::from_str(raw).map(Some).map_err(|_| {
        HttpError::new(
            "infra::http::parse_post_status",
            StatusCode::BAD_REQUEST,
            "Unknown status filter",
            format!("Status `{raw}` is not recognised"),
        )
    })
}

pub(super) fn status_filters(
    counts: &AdminPostStatusCounts,
    active: Option<PostStatus>,
) -> Vec<admin_views::AdminStatusFilterView> {
    let mut filters = vec![admin_views::AdminStatusFilterView {
        value: String::new(),
        label: "All".to_string(),
        count: Some(counts.all),
        is_active: active.is_none(),
    }];

    filters.extend(PostStatus::ALL.iter().map(|status| admin_views::AdminStatusFilterView {
        value: status.as_str().to_string(),
        label: status.label().to_string(),
        count: Some(counts.for_status(Some(*status))),
        is_active: active == Some(*status),
    }));

    filters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_status_means_all() {
        assert_eq!(parse_post_status(None).expect("none"), None);
        assert_eq!(parse_post_status(Some("  ")).expect("blank"), None);
        assert_eq!(
            parse_post_status(Some("Published")).expect("published"),
            Some(PostStatus::Published)
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = parse_post_status(Some("pinned")).expect_err("unknown");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn filters_mark_the_active_tab() {
        let counts = AdminPostStatusCounts {
            all: 7,
            draft: 3,
            published: 4,
            archived: 0,
        };
        let filters = status_filters(&counts, Some(PostStatus::Draft));
        assert_eq!(filters.len(), 1 + PostStatus::ALL.len());
        let active: Vec<_> = filters.iter().filter(|f| f.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].value, "draft");
        assert_eq!(active[0].count, Some(3));
        assert_eq!(filters[0].count, Some(7));
    }
}
