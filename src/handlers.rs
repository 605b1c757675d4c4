//! HTTP handlers for the login flow, profile and recommendations pages.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::profile::{fetch_user_bundle, fetch_user_with_top_artists};
use crate::recommend::recommend as recommend_for;
use crate::session::{self, Session, SessionStore};
use crate::spotify::SpotifyClient;
use crate::views;

/// Shared router state.
#[derive(Clone)]
pub struct AppState {
    pub spotify: SpotifyClient,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(spotify: SpotifyClient, sessions: Arc<dyn SessionStore>) -> Self {
        Self { spotify, sessions }
    }

    /// The access token of the requesting browser, if it has one.
    fn access_token(&self, headers: &HeaderMap) -> Option<String> {
        let id = session::session_id(headers)?;
        let session = self.sessions.load(&id)?;
        session.access_token().map(str::to_string)
    }
}

/// Query parameters Spotify appends when redirecting back.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// GET /health - Health check.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET / - Landing page.
pub async fn home() -> Html<String> {
    Html(views::home())
}

/// GET /login - Send the browser to Spotify's consent page.
pub async fn login(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.spotify.authorize_url())
}

/// GET /callback - Exchange the authorization code and start a session.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(reason) = params.error {
        tracing::info!(%reason, "authorization denied by provider");
        return Err(AppError::AuthorizationDenied(reason));
    }
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AppError::MissingAuthorizationCode)?;

    let tokens = state.spotify.exchange_code(&code).await?;

    // A browser holds one session; logging in again replaces it.
    if let Some(old) = session::session_id(&headers) {
        state.sessions.remove(&old);
    }
    let id = session::new_session_id();
    state.sessions.save(
        &id,
        Session {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        },
    );
    tracing::info!("user logged in");

    Ok((
        [(header::SET_COOKIE, session::set_cookie(&id))],
        Redirect::to("/profile"),
    )
        .into_response())
}

/// GET /profile - User profile with top artists and tracks.
pub async fn profile(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let Some(token) = state.access_token(&headers) else {
        return Ok(Redirect::to("/login").into_response());
    };

    let user = fetch_user_bundle(&state.spotify, &token).await?;
    Ok(Html(views::profile(&user)).into_response())
}

/// GET /recommend - Up to ten shuffled recommendations.
pub async fn recommend(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let Some(token) = state.access_token(&headers) else {
        return Ok(Redirect::to("/login").into_response());
    };

    let user = fetch_user_with_top_artists(&state.spotify, &token).await?;
    let items = recommend_for(&state.spotify, &user, &token).await;
    Ok(Html(views::recommendations(&items)).into_response())
}

/// GET /logout - Drop the session and return to the landing page.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session::session_id(&headers) {
        state.sessions.remove(&id);
        tracing::info!("user logged out");
    }
    (
        [(header::SET_COOKIE, session::clear_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

/// Build the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/profile", get(profile))
        .route("/recommend", get(recommend))
        .route("/logout", get(logout))
}
