use std::{process, sync::Arc};

use quire::{
    application::{
        admin::{
            chrome::AdminChromeService, comments::AdminCommentService,
            dashboard::AdminDashboardService, posts::AdminPostService,
            subscribers::AdminSubscriberService, taxonomy::AdminTaxonomyService,
        },
        auth::AuthService,
        autosave::Autosaver,
        chrome::ChromeService,
        comments::CommentService,
        error::AppError,
        feed::FeedService,
        newsletter::NewsletterService,
        repos::{
            CommentsRepo, HealthRepo, NewsletterRepo, PostsRepo, PostsWriteRepo, SessionRepo,
            TaxonomyRepo,
        },
    },
    config,
    infra::{
        error::InfraError,
        http::{self, AdminState, HttpState},
        remote::RemoteApi,
        telemetry,
    },
};
use tokio::try_join;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::CheckApi(_) => run_check_api(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let remote = Arc::new(RemoteApi::new(&settings.api).map_err(AppError::from)?);
    info!(
        target = "quire::serve",
        api = %remote.base_url(),
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        "starting listeners"
    );

    let (http_state, admin_state) = build_application_context(remote, &settings);
    serve_http(&settings, http_state, admin_state).await
}

async fn run_check_api(settings: config::Settings) -> Result<(), AppError> {
    let remote = RemoteApi::new(&settings.api).map_err(AppError::from)?;

    match remote.ping().await {
        Ok(()) => {
            info!(
                target = "quire::check_api",
                api = %remote.base_url(),
                "upstream api is reachable"
            );
            Ok(())
        }
        Err(err) => Err(AppError::from(InfraError::upstream(format!(
            "{} is not reachable: {err}",
            remote.base_url()
        )))),
    }
}

fn build_application_context(
    remote: Arc<RemoteApi>,
    settings: &config::Settings,
) -> (HttpState, AdminState) {
    let posts_repo: Arc<dyn PostsRepo> = remote.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = remote.clone();
    let taxonomy_repo: Arc<dyn TaxonomyRepo> = remote.clone();
    let comments_repo: Arc<dyn CommentsRepo> = remote.clone();
    let newsletter_repo: Arc<dyn NewsletterRepo> = remote.clone();
    let session_repo: Arc<dyn SessionRepo> = remote.clone();
    let health_repo: Arc<dyn HealthRepo> = remote;

    let api_origin = settings.api.origin();

    let http_state = HttpState {
        feed: Arc::new(FeedService::new(
            posts_repo.clone(),
            taxonomy_repo.clone(),
            api_origin.clone(),
        )),
        chrome: Arc::new(ChromeService::new(settings.site.clone())),
        comments: Arc::new(CommentService::new(comments_repo.clone())),
        newsletter: Arc::new(NewsletterService::new(newsletter_repo.clone())),
        health: health_repo.clone(),
    };

    let admin_posts = AdminPostService::new(posts_repo, posts_write_repo);
    let admin_comments = AdminCommentService::new(comments_repo);
    let admin_subscribers = AdminSubscriberService::new(newsletter_repo);

    let admin_state = AdminState {
        chrome: Arc::new(AdminChromeService::new(settings.site.clone())),
        auth: Arc::new(AuthService::new(session_repo)),
        dashboard: Arc::new(AdminDashboardService::new(
            admin_posts.clone(),
            admin_comments.clone(),
            admin_subscribers.clone(),
        )),
        autosave: Arc::new(Autosaver::new(
            admin_posts.clone(),
            settings.editor.autosave_debounce,
        )),
        posts: Arc::new(admin_posts),
        comments: Arc::new(admin_comments),
        taxonomy: Arc::new(AdminTaxonomyService::new(taxonomy_repo)),
        subscribers: Arc::new(admin_subscribers),
        health: health_repo,
        session: settings.session.clone(),
        api_origin,
    };

    (http_state, admin_state)
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_router(http_state);
    let upload_body_limit = settings.uploads.max_request_bytes.get() as usize;
    let admin_router = http::build_admin_router(admin_state, upload_body_limit);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    let public_server = axum::serve(public_listener, public_router.into_make_service());
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service());

    try_join!(public_server, admin_server)
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
