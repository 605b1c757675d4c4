//! Profile and listening statistics for the signed-in user.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::spotify::{ApiError, ArtistSummary, Paging, SpotifyClient, Track};

/// Which call of the bundle failed. The first failure aborts the whole fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Error fetching user profile.")]
    Profile(#[source] ApiError),
    #[error("Error fetching top artists.")]
    TopArtists(#[source] ApiError),
    #[error("Error fetching top tracks.")]
    TopTracks(#[source] ApiError),
}

/// Everything known about the user for the duration of one request.
#[derive(Clone, Debug, Default)]
pub struct UserData {
    /// Raw `/me` object.
    pub profile: Map<String, Value>,
    pub top_artists: Vec<ArtistSummary>,
    pub top_tracks: Vec<Track>,
    /// Seed genres for hidden gems. Nothing fills this yet.
    pub genres: Option<Vec<String>>,
}

impl UserData {
    fn profile_str(&self, key: &str) -> Option<&str> {
        self.profile.get(key).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.profile_str("id")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.profile_str("display_name")
    }

    pub fn country(&self) -> Option<&str> {
        self.profile_str("country")
    }

    pub fn followers(&self) -> Option<u64> {
        self.profile
            .get("followers")
            .and_then(|f| f.get("total"))
            .and_then(Value::as_u64)
    }
}

async fn fetch_profile(client: &SpotifyClient, token: &str) -> Result<Map<String, Value>, FetchError> {
    client.get("/me", token, &[]).await.map_err(FetchError::Profile)
}

async fn fetch_top_artists(client: &SpotifyClient, token: &str) -> Result<Vec<ArtistSummary>, FetchError> {
    let page: Paging<ArtistSummary> = client
        .get("/me/top/artists", token, &[])
        .await
        .map_err(FetchError::TopArtists)?;
    Ok(page.items)
}

async fn fetch_top_tracks(client: &SpotifyClient, token: &str) -> Result<Vec<Track>, FetchError> {
    let page: Paging<Track> = client
        .get("/me/top/tracks", token, &[])
        .await
        .map_err(FetchError::TopTracks)?;
    Ok(page.items)
}

/// Profile plus top artists; the input to recommendation assembly.
pub async fn fetch_user_with_top_artists(
    client: &SpotifyClient,
    token: &str,
) -> Result<UserData, FetchError> {
    let profile = fetch_profile(client, token).await?;
    let top_artists = fetch_top_artists(client, token).await?;
    Ok(UserData {
        profile,
        top_artists,
        ..UserData::default()
    })
}

/// Profile, top artists and top tracks, fetched in that order.
pub async fn fetch_user_bundle(client: &SpotifyClient, token: &str) -> Result<UserData, FetchError> {
    let mut user = fetch_user_with_top_artists(client, token).await?;
    user.top_tracks = fetch_top_tracks(client, token).await?;
    tracing::debug!(
        user = user.id().unwrap_or_default(),
        artists = user.top_artists.len(),
        tracks = user.top_tracks.len(),
        "fetched user bundle"
    );
    Ok(user)
}
