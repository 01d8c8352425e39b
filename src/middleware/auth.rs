use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{config::Settings, error::GatewayError, AppState};

fn bearer(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = raw.trim().split_once(char::is_whitespace)?;
    let token = token.trim();
    if scheme != "Bearer" || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

fn query_token(uri: &Uri) -> Option<String> {
    uri.query()?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, v)| *k == "token" && !v.is_empty())
        .map(|(_, v)| v.to_string())
}

/// Authorization header first, then `?token=`, then the session cookie.
pub fn lookup_token(settings: &Settings, headers: &HeaderMap, uri: &Uri) -> Option<String> {
    bearer(headers).or_else(|| query_token(uri)).or_else(|| {
        CookieJar::from_headers(headers)
            .get(&settings.jwt_cookie_name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// 401 carrying the realm challenge.
pub fn unauthorized(settings: &Settings, err: GatewayError) -> Response {
    let mut res = err.into_response();
    let challenge = format!("JWT realm=\"{}\"", settings.jwt_realm);
    if let Ok(v) = HeaderValue::from_str(&challenge) {
        res.headers_mut().insert(header::WWW_AUTHENTICATE, v);
    }
    res
}

fn is_public_path(path: &str) -> bool {
    path == "/health" || path == "/api/v1/auth/login" || path == "/api/v1/auth/refresh_token"
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if is_public_path(req.uri().path()) {
        return next.run(req).await;
    }

    let Some(token) = lookup_token(&state.settings, req.headers(), req.uri()) else {
        return unauthorized(
            &state.settings,
            GatewayError::Authentication("auth token is empty".to_string()),
        );
    };

    match state.sessions.verify(&token) {
        Ok(user) => {
            // handlers read the identity from request extensions
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(path = req.uri().path(), error = %e, "rejected session token");
            unauthorized(&state.settings, e)
        }
    }
}
