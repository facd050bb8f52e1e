//! Cookie-backed editor sessions.
//!
//! The cookie carries the upstream access token and nothing else. Every gated request re-checks it
//! against the current-user endpoint before the handler runs.

use axum::{
    extract::{Form, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    application::{
        auth::AuthError,
        error::HttpError,
        repos::{AccessToken, Session},
        stream::StreamBuilder,
    },
    infra::http::is_local_path,
    presentation::{
        admin::views::{self as admin_views, asset_version},
        views::render_template_response,
    },
};

use super::{AdminState, shared::is_datastar_request};

const LOGIN_PATH: &str = "/login";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LoginQuery {
    next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LoginForm {
    email: String,
    password: String,
    next: Option<String>,
}

/// Gate for every admin route except the login page and static assets.
///
/// A verified session is stored as a [`Session`] request extension for the handlers.
pub(super) async fn require_session(
    State(state): State<AdminState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let is_datastar = is_datastar_request(request.headers());
    let return_to = request
        .uri()
        .path_and_query()
        .map(|value| value.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let Some(token) = session_token(&state, &jar) else {
        return login_redirect(&return_to, is_datastar);
    };

    match state.auth.verify(&token).await {
        Ok(user) => {
            request.extensions_mut().insert(Session { token, user });
            next.run(request).await
        }
        Err(AuthError::Repo(err)) => HttpError::from_error(
            "infra::http::admin::require_session",
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable",
            &err,
        )
        .into_response(),
        Err(err) => {
            info!(
                target = "quire::http::admin::session",
                reason = %err,
                "session rejected"
            );
            let jar = jar.remove(removal_cookie(&state));
            (jar, login_redirect(&return_to, is_datastar)).into_response()
        }
    }
}

pub(super) async fn admin_login_page(
    State(state): State<AdminState>,
    Query(query): Query<LoginQuery>,
) -> Response {
    let view = login_view(&state, String::new(), None, query.next.as_deref());
    render_template_response(admin_views::AdminLoginTemplate { view }, StatusCode::OK)
}

pub(super) async fn admin_login(
    State(state): State<AdminState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.login(&form.email, &form.password).await {
        Ok(session) => {
            let jar = jar.add(session_cookie(&state, session.token.expose().to_string()));
            let target = safe_next(form.next.as_deref());
            (jar, Redirect::to(&target)).into_response()
        }
        Err(err) => {
            let status = match &err {
                AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
                AuthError::Repo(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::UNAUTHORIZED,
            };
            warn!(
                target = "quire::http::admin::session",
                email = %form.email.trim(),
                reason = %err,
                "login failed"
            );
            let view = login_view(
                &state,
                form.email.trim().to_string(),
                Some(err.login_message().to_string()),
                form.next.as_deref(),
            );
            render_template_response(admin_views::AdminLoginTemplate { view }, status)
        }
    }
}

pub(super) async fn admin_logout(State(state): State<AdminState>, jar: CookieJar) -> Response {
    let jar = jar.remove(removal_cookie(&state));
    (jar, Redirect::to(LOGIN_PATH)).into_response()
}

/// Exchange the current token for a fresh one and re-issue the cookie.
pub(super) async fn admin_session_refresh(
    State(state): State<AdminState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let Some(token) = session_token(&state, &jar) else {
        return login_redirect(LOGIN_PATH, is_datastar_request(&headers));
    };

    match state.auth.refresh(&token).await {
        Ok(fresh) => {
            let jar = jar.add(session_cookie(&state, fresh.expose().to_string()));
            (jar, StatusCode::NO_CONTENT).into_response()
        }
        Err(AuthError::Repo(err)) => HttpError::from_error(
            "infra::http::admin::admin_session_refresh",
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable",
            &err,
        )
        .into_response(),
        Err(_) => {
            let jar = jar.remove(removal_cookie(&state));
            (jar, login_redirect(LOGIN_PATH, is_datastar_request(&headers))).into_response()
        }
    }
}

fn session_token(state: &AdminState, jar: &CookieJar) -> Option<AccessToken> {
    jar.get(&state.session.cookie_name)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|value| !value.is_empty())
        .map(AccessToken::new)
}

fn session_cookie(state: &AdminState, token: String) -> Cookie<'static> {
    Cookie::build((state.session.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.session.secure)
        .max_age(state.session.max_age())
        .build()
}

fn removal_cookie(state: &AdminState) -> Cookie<'static> {
    Cookie::build(state.session.cookie_name.clone())
        .path("/")
        .build()
}

fn login_redirect(return_to: &str, is_datastar: bool) -> Response {
    let target = login_href(return_to);
    if is_datastar {
        let mut stream = StreamBuilder::new();
        stream.push_redirect(&target);
        stream.into_response()
    } else {
        Redirect::to(&target).into_response()
    }
}

fn login_href(return_to: &str) -> String {
    let next = safe_next(Some(return_to));
    if next == "/" {
        LOGIN_PATH.to_string()
    } else {
        let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
        format!("{LOGIN_PATH}?next={encoded}")
    }
}

/// Post-login target. Only local paths are honoured, and never the login page itself.
fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path)
            if is_local_path(path) && !path.starts_with(LOGIN_PATH) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

fn login_view(
    state: &AdminState,
    email: String,
    error: Option<String>,
    next: Option<&str>,
) -> admin_views::AdminLoginView {
    admin_views::AdminLoginView {
        title: format!("Sign in · {}", state.chrome.brand_title()),
        email,
        error,
        form_action: LOGIN_PATH.to_string(),
        next: safe_next(next),
        asset_version: asset_version(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_targets_stay_local() {
        assert_eq!(safe_next(Some("/posts?status=draft")), "/posts?status=draft");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(Some("/\\/evil.example")), "/");
        assert_eq!(safe_next(Some("/login?next=/")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn login_href_carries_return_path() {
        assert_eq!(login_href("/"), "/login");
        assert_eq!(login_href("/posts/new"), "/login?next=%2Fposts%2Fnew");
    }
}
