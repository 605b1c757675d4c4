//! Recommendation assembly: related artists plus low-popularity tracks.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::profile::UserData;
use crate::spotify::{ArtistSummary, Popularity, RecommendationsResponse, RelatedArtistsResponse, SpotifyClient};

/// Tracks at or above this popularity are not hidden gems.
pub const HIDDEN_GEM_MAX_POPULARITY: u8 = 50;
/// How many tracks to ask the recommendations endpoint for per genre.
pub const RECOMMENDATION_POOL: u32 = 50;
pub const DEFAULT_GEMS_PER_GENRE: usize = 5;
pub const MAX_RECOMMENDATIONS: usize = 10;

/// One recommended item, tagged by the strategy that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Recommendation {
    Artist {
        name: String,
        genres: Vec<String>,
        popularity: Popularity,
    },
    Track {
        name: String,
        artist: String,
        album: String,
        popularity: Popularity,
        preview_url: Option<String>,
    },
}

impl Recommendation {
    pub fn name(&self) -> &str {
        match self {
            Recommendation::Artist { name, .. } | Recommendation::Track { name, .. } => name,
        }
    }

    pub fn popularity(&self) -> Popularity {
        match self {
            Recommendation::Artist { popularity, .. } | Recommendation::Track { popularity, .. } => {
                *popularity
            }
        }
    }
}

impl From<ArtistSummary> for Recommendation {
    fn from(a: ArtistSummary) -> Self {
        Recommendation::Artist {
            name: a.name,
            genres: a.genres,
            popularity: a.popularity,
        }
    }
}

/// Related artists for one artist id. Failures are tolerated and yield an
/// empty list.
pub async fn similar_artists(client: &SpotifyClient, artist_id: &str, token: &str) -> Vec<ArtistSummary> {
    let path = format!("/artists/{}/related-artists", urlencoding::encode(artist_id));
    match client.get::<RelatedArtistsResponse>(&path, token, &[]).await {
        Ok(body) => body.artists,
        Err(e) => {
            tracing::debug!(artist_id, error = %e, "no related artists");
            Vec::new()
        }
    }
}

/// Up to `max_results` recommended tracks for `genre` with popularity below
/// [`HIDDEN_GEM_MAX_POPULARITY`], in upstream order.
pub async fn hidden_gems(
    client: &SpotifyClient,
    genre: &str,
    token: &str,
    max_results: usize,
) -> Vec<Recommendation> {
    let limit = RECOMMENDATION_POOL.to_string();
    let query = [("seed_genres", genre), ("limit", limit.as_str())];
    let body = match client.get::<RecommendationsResponse>("/recommendations", token, &query).await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(genre, error = %e, "no hidden gems");
            return Vec::new();
        }
    };

    body.tracks
        .into_iter()
        .filter(|t| t.popularity.value() < HIDDEN_GEM_MAX_POPULARITY)
        .filter_map(|t| {
            let artist = t.primary_artist()?.to_string();
            Some(Recommendation::Track {
                name: t.name,
                artist,
                album: t.album.name,
                popularity: t.popularity,
                preview_url: t.preview_url,
            })
        })
        .take(max_results)
        .collect()
}

/// Every candidate before shuffling: related artists of each top artist,
/// then hidden gems of each genre.
pub async fn collect_candidates(client: &SpotifyClient, user: &UserData, token: &str) -> Vec<Recommendation> {
    let mut candidates = Vec::new();

    for artist in &user.top_artists {
        let related = similar_artists(client, &artist.id, token).await;
        candidates.extend(related.into_iter().map(Recommendation::from));
    }

    for genre in user.genres.iter().flatten() {
        candidates.extend(hidden_gems(client, genre, token, DEFAULT_GEMS_PER_GENRE).await);
    }

    candidates
}

/// Uniformly shuffles and keeps the first [`MAX_RECOMMENDATIONS`].
pub fn assemble<R: Rng + ?Sized>(mut candidates: Vec<Recommendation>, rng: &mut R) -> Vec<Recommendation> {
    candidates.shuffle(rng);
    candidates.truncate(MAX_RECOMMENDATIONS);
    candidates
}

/// Recommendations for the user, freshly shuffled on every call.
pub async fn recommend(client: &SpotifyClient, user: &UserData, token: &str) -> Vec<Recommendation> {
    let candidates = collect_candidates(client, user, token).await;
    tracing::debug!(candidates = candidates.len(), "assembling recommendations");
    assemble(candidates, &mut rand::rng())
}
