mod support;

use std::collections::HashSet;
use std::time::Duration;

use httpmock::MockServer;
use metrics_util::debugging::DebuggingRecorder;
use uuid::Uuid;

use quire::application::comments::CommentService;
use quire::application::repos::HealthRepo;
use quire::config::ApiSettings;
use quire::domain::comments::CommentDraft;
use quire::infra::remote::RemoteApi;
use quire::infra::telemetry::{
    COMMENT_SUBMISSIONS_TOTAL, UPSTREAM_REQUEST_MS, UPSTREAM_REQUESTS_TOTAL,
};
use support::FakeApi;

#[tokio::test]
async fn upstream_calls_and_comments_emit_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/health");
        then.status(200);
    });
    let remote = RemoteApi::new(&ApiSettings {
        base_url: format!("{}/api/v1/", server.base_url())
            .parse()
            .expect("base url"),
        timeout: Duration::from_secs(5),
    })
    .expect("client");
    remote.ping().await.expect("health check");

    let comments = CommentService::new(FakeApi::seeded());
    let invalid = CommentDraft::default();
    assert!(comments.submit(Uuid::new_v4(), &invalid).await.is_err());
    let valid = CommentDraft {
        name: "Grace".into(),
        email: "grace@example.com".into(),
        website: String::new(),
        content: "Counting every submission".into(),
    };
    comments
        .submit(Uuid::new_v4(), &valid)
        .await
        .expect("accepted comment");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for metric in [
        UPSTREAM_REQUESTS_TOTAL,
        UPSTREAM_REQUEST_MS,
        COMMENT_SUBMISSIONS_TOTAL,
    ] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
