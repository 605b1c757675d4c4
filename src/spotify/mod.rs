//! Spotify Web API client.
//!
//! Uses the Authorization Code flow: every API call is made on behalf of a
//! user with the bearer token obtained in [`auth`].

pub mod auth;

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Failure of a single upstream call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Spotify API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Spotify API client. Cheap to clone; the connection pool is shared.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    api_base: String,
    accounts_base: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl SpotifyClient {
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.into(),
            accounts_base: DEFAULT_ACCOUNTS_BASE.into(),
            client_id,
            client_secret,
            redirect_uri,
        })
    }

    /// Points the client at different hosts, e.g. a local fixture server.
    pub fn with_base_urls(mut self, api_base: impl Into<String>, accounts_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.accounts_base = accounts_base.into();
        self
    }

    /// GET `{api_base}{path}` with the user's bearer token.
    ///
    /// Non-success statuses are logged with their body and returned as
    /// [`ApiError::Status`]; nothing is retried.
    pub async fn get_json(
        &self,
        path: &str,
        token: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.api_base, path);
        tracing::debug!(%url, "spotify request");

        let res = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%url, error = %e, "spotify request failed");
                ApiError::Transport(e)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(%url, %status, %body, "spotify API returned an error");
            return Err(ApiError::Status { status, body });
        }

        let bytes = res.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(%url, error = %e, "spotify response is not JSON");
            ApiError::Decode(e)
        })
    }

    /// Like [`get_json`](Self::get_json), decoding the body into `T`.
    pub async fn get<T>(&self, path: &str, token: &str, query: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self.get_json(path, token, query).await?;
        serde_json::from_value(value).map_err(|e| {
            tracing::warn!(path, error = %e, "spotify response did not match expected shape");
            ApiError::Decode(e)
        })
    }
}

/// Popularity score assigned by Spotify, always within `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u8")]
pub struct Popularity(u8);

impl Popularity {
    pub const MAX: u8 = 100;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for Popularity {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value <= u32::from(Self::MAX) {
            Ok(Self(value as u8))
        } else {
            Err(format!("popularity {} is outside 0..=100", value))
        }
    }
}

impl From<Popularity> for u8 {
    fn from(p: Popularity) -> u8 {
        p.0
    }
}

/// An artist as returned by top-artists and related-artists.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArtistSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub popularity: Popularity,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AlbumRef {
    pub name: String,
}

/// A full track object (top tracks, recommendations).
#[derive(Clone, Debug, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: AlbumRef,
    pub popularity: Popularity,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl Track {
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }
}

#[derive(Deserialize)]
pub(crate) struct Paging<T> {
    pub items: Vec<T>,
}

#[derive(Deserialize)]
pub(crate) struct RelatedArtistsResponse {
    pub artists: Vec<ArtistSummary>,
}

#[derive(Deserialize)]
pub(crate) struct RecommendationsResponse {
    pub tracks: Vec<Track>,
}
