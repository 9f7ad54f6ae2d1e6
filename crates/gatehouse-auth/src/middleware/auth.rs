use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::oidc::OidcAuthority;
use crate::session::{SessionStore, SESSION_COOKIE};

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub authority: Arc<OidcAuthority>,
}

/// Pages that require an established session.
const PROTECTED_PATHS: &[&str] = &["/profile"];

/// Middleware for page routes: unauthenticated requests to a protected
/// page are sent through the login challenge, carrying the original path
/// as the redirect target.
pub async fn require_page_auth(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let isProtected = PROTECTED_PATHS
        .iter()
        .any(|p| path == *p || path.starts_with(&format!("{p}/")));
    if !isProtected {
        return next.run(request).await;
    }

    let cookieHeader = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let authenticated = match extract_cookie_value(cookieHeader, SESSION_COOKIE) {
        Some(sessionId) => state.sessions.get(&sessionId).await.is_some(),
        None => false,
    };

    if !authenticated {
        return Redirect::to(&format!("/auth/login?redirect_uri={path}")).into_response();
    }

    next.run(request).await
}

/// Session cookie for an authenticated or pending session. `SameSite=Lax`
/// so the cookie survives the cross-site redirect back from the provider.
pub fn session_cookie(session_id: &str) -> String {
    format!(
        "{SESSION_COOKIE}={session_id}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=604800"
    )
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0")
}

pub fn extract_cookie_value(cookieHeader: &str, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for part in cookieHeader.split(';') {
        let trimmed = part.trim();
        if trimmed.starts_with(&prefix) {
            return Some(trimmed[prefix.len()..].to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_is_found_among_others() {
        let header = "theme=dark; gatehouse_session=abc123; lang=en";
        assert_eq!(
            extract_cookie_value(header, SESSION_COOKIE),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn absent_cookie_is_none() {
        assert_eq!(extract_cookie_value("", SESSION_COOKIE), None);
        assert_eq!(extract_cookie_value("theme=dark", SESSION_COOKIE), None);
    }

    #[test]
    fn cookie_name_must_match_exactly() {
        let header = "not_gatehouse_session=evil";
        assert_eq!(extract_cookie_value(header, SESSION_COOKIE), None);
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
