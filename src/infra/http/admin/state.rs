use std::sync::Arc;

use crate::application::admin::{
    chrome::AdminChromeService, comments::AdminCommentService, dashboard::AdminDashboardService,
    posts::AdminPostService, subscribers::AdminSubscriberService, taxonomy::AdminTaxonomyService,
};
use crate::application::{auth::AuthService, autosave::Autosaver, repos::HealthRepo};
use crate::config::SessionSettings;

#[derive(Clone)]
pub struct AdminState {
    pub chrome: Arc<AdminChromeService>,
    pub auth: Arc<AuthService>,
    pub dashboard: Arc<AdminDashboardService>,
    pub posts: Arc<AdminPostService>,
    pub autosave: Arc<Autosaver>,
    pub comments: Arc<AdminCommentService>,
    pub taxonomy: Arc<AdminTaxonomyService>,
    pub subscribers: Arc<AdminSubscriberService>,
    pub health: Arc<dyn HealthRepo>,
    pub session: SessionSettings,
    /// Origin used to resolve relative featured image paths for previews.
    pub api_origin: String,
}
