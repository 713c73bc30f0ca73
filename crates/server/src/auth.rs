//! Login, logout and the current caller.

use api_types::{
    Ack,
    auth::{Login, LoginResponse, Me},
};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use chrono::{DateTime, Utc};
use engine::Caller;
use time::OffsetDateTime;

use crate::{
    ServerError,
    server::{SESSION_COOKIE, ServerState},
};

fn session_cookie(
    token: String,
    expires_at: DateTime<Utc>,
    secure: bool,
) -> Result<Cookie<'static>, ServerError> {
    let expires = OffsetDateTime::from_unix_timestamp(expires_at.timestamp())
        .map_err(|err| ServerError::Generic(format!("invalid session expiry: {err}")))?;

    Ok(Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .expires(expires)
        .secure(secure)
        .build())
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    payload: Result<Json<Login>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), ServerError> {
    let Json(payload) = payload.map_err(|_| ServerError::Generic("invalid json".to_string()))?;

    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;
    let session = state
        .engine
        .create_session(&user.id, state.config.session_ttl_days)
        .await?;

    let cookie = session_cookie(
        session.token,
        session.expires_at,
        state.config.secure_cookies,
    )?;
    tracing::info!("user {} logged in", user.id);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            id: user.id,
            name: user.name,
        }),
    ))
}

pub async fn logout(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Ack>), ServerError> {
    if let Some(token) = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string()) {
        state.engine.destroy_session(&token).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(Ack { ok: true })))
}

pub async fn me(Extension(caller): Extension<Caller>) -> Json<Me> {
    Json(Me {
        user_id: caller.user_id,
        name: caller.name,
    })
}
