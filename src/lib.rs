//! Log in with Spotify, look at your listening profile, get recommendations.

pub mod config;
pub mod error;
pub mod handlers;
pub mod profile;
pub mod recommend;
pub mod session;
pub mod spotify;
mod views;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers::AppState;
use crate::session::MemoryStore;
use crate::spotify::SpotifyClient;

/// The full application with tracing, ready to serve.
pub fn app(state: AppState) -> Router {
    handlers::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// State for a production run: configured client and an in-memory session store.
pub fn state_from_config(config: &Config) -> anyhow::Result<AppState> {
    let spotify = SpotifyClient::new(
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
        config.spotify_redirect_uri.clone(),
        config.http_timeout,
    )?
    .with_base_urls(config.api_base.clone(), config.accounts_base.clone());

    Ok(AppState::new(spotify, Arc::new(MemoryStore::new())))
}
