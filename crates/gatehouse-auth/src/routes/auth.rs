use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::middleware::auth::{clear_session_cookie, session_cookie, AppState};
use crate::session::SESSION_COOKIE;

#[derive(Deserialize)]
struct LoginQuery {
    redirect_uri: Option<String>,
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

pub fn routes(_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(handle_login))
        .route("/auth/callback", get(handle_callback))
        .route("/auth/logout", get(handle_logout))
}

/// Starts the authentication challenge: stores the redirect-target
/// property bag and sends the browser to the provider's authorize URL.
async fn handle_login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Response {
    let target = sanitize_redirect_target(query.redirect_uri.as_deref());
    let (authorizeUrl, pending) = state.authority.begin_authorization(target);
    let sessionId = state.sessions.begin_login(pending).await;

    info!("login challenge issued");
    redirect_with_cookie(authorizeUrl.as_str(), &session_cookie(&sessionId))
}

/// Finishes the challenge: consumes the pending entry, lets the protocol
/// layer exchange and verify, then rotates the session cookie.
async fn handle_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Response {
    let sessionId = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            warn!("callback without session cookie");
            return Redirect::to("/").into_response();
        }
    };

    let pending = match state.sessions.take_pending(&sessionId).await {
        Some(p) => p,
        None => {
            warn!("callback for unknown or expired login attempt");
            return Redirect::to("/").into_response();
        }
    };

    if let Some(error) = query.error {
        warn!(
            "provider declined the challenge: {error}: {}",
            query.error_description.unwrap_or_default()
        );
        return redirect_with_cookie("/", &clear_session_cookie());
    }

    let (code, callbackState) = match (query.code, query.state) {
        (Some(c), Some(s)) => (c, s),
        _ => {
            warn!("callback missing code or state");
            return redirect_with_cookie("/", &clear_session_cookie());
        }
    };

    if callbackState != pending.csrf_state {
        warn!("callback state mismatch, dropping login attempt");
        return redirect_with_cookie("/", &clear_session_cookie());
    }

    let redirectTarget = pending.redirect_target.clone();
    let session = match state.authority.exchange(code, pending).await {
        Ok(s) => s,
        Err(e) => {
            warn!("{e}");
            return redirect_with_cookie("/", &clear_session_cookie());
        }
    };

    let newSessionId = state.sessions.establish(session).await;
    info!("session established");
    redirect_with_cookie(&redirectTarget, &session_cookie(&newSessionId))
}

/// Signs out of both schemes: drops the local session and cookie, then
/// hands the browser to the provider's logout endpoint.
async fn handle_logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let established = match jar.get(SESSION_COOKIE) {
        Some(cookie) => state.sessions.remove(cookie.value()).await,
        None => None,
    };

    // Logout is gated on an established session.
    if established.is_none() {
        return Redirect::to("/").into_response();
    }

    match state.authority.logout_url() {
        Ok(url) => {
            info!("signing out of local session and provider");
            redirect_with_cookie(url.as_str(), &clear_session_cookie())
        }
        Err(e) => {
            warn!("failed to build provider logout url: {e}");
            redirect_with_cookie("/", &clear_session_cookie())
        }
    }
}

/// Only same-site absolute paths survive; anything else falls back to `/`.
fn sanitize_redirect_target(raw: Option<&str>) -> String {
    match raw {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}

fn redirect_with_cookie(location: &str, cookie: &str) -> Response {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .header(header::SET_COOKIE, cookie)
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_site_paths_pass_through() {
        assert_eq!(sanitize_redirect_target(Some("/profile")), "/profile");
        assert_eq!(sanitize_redirect_target(Some("/a/b?c=d")), "/a/b?c=d");
    }

    #[test]
    fn absolute_urls_fall_back_to_root() {
        assert_eq!(sanitize_redirect_target(Some("https://evil.example")), "/");
        assert_eq!(sanitize_redirect_target(Some("//evil.example")), "/");
    }

    #[test]
    fn missing_or_empty_target_falls_back_to_root() {
        assert_eq!(sanitize_redirect_target(None), "/");
        assert_eq!(sanitize_redirect_target(Some("")), "/");
        assert_eq!(sanitize_redirect_target(Some("profile")), "/");
    }

    #[test]
    fn redirect_response_sets_cookie_and_location() {
        let response = redirect_with_cookie("/after", "k=v; Path=/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/after"
        );
        assert_eq!(
            response.headers().get(header::SET_COOKIE).unwrap(),
            "k=v; Path=/"
        );
    }
}
