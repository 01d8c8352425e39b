use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth,
    error::GatewayError,
    models::{LoginUser, UserLoginResponse},
    services::session_service::{self, SessionToken},
    AppState,
};

fn session_response(state: &AppState, jar: CookieJar, session: SessionToken) -> Response {
    let jar = if state.settings.jwt_send_cookie {
        jar.add(session_service::auth_cookie(&state.settings, &session))
    } else {
        jar
    };

    let body = UserLoginResponse {
        code: StatusCode::OK.as_u16(),
        token: session.token,
        expire: session.expire.to_rfc3339(),
    };

    (jar, Json(body)).into_response()
}

// POST /api/v1/auth/login
pub async fn post_login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginUser>, JsonRejection>,
) -> Response {
    let missing = || {
        auth::unauthorized(
            &state.settings,
            GatewayError::Authentication("missing login or password".to_string()),
        )
    };

    let Ok(Json(form)) = payload else {
        return missing();
    };
    let (Some(login), Some(password)) = (form.login, form.password) else {
        return missing();
    };
    if password.is_empty() {
        return missing();
    }

    match state
        .sessions
        .authenticate(state.credentials.as_ref(), login, &password)
        .await
    {
        Ok(session) => {
            tracing::info!(login, "session issued");
            session_response(&state, jar, session)
        }
        Err(e @ GatewayError::Authentication(_)) => auth::unauthorized(&state.settings, e),
        Err(e) => e.into_response(),
    }
}

// GET /api/v1/auth/refresh_token
pub async fn get_refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    jar: CookieJar,
) -> Response {
    let Some(token) = auth::lookup_token(&state.settings, &headers, &uri) else {
        return auth::unauthorized(
            &state.settings,
            GatewayError::Authentication("auth token is empty".to_string()),
        );
    };

    match state.sessions.refresh(&token) {
        Ok(session) => session_response(&state, jar, session),
        Err(e @ GatewayError::Authentication(_)) => auth::unauthorized(&state.settings, e),
        Err(e) => e.into_response(),
    }
}
