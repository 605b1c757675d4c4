//! Shared fixtures: a fake Spotify on an ephemeral port and the app wired to it.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};

use spotify_discover::handlers::AppState;
use spotify_discover::session::MemoryStore;
use spotify_discover::spotify::SpotifyClient;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const REDIRECT_URI: &str = "http://localhost:8081/callback";

/// How long the fake stalls for `slow-token`.
pub const SLOW_RESPONSE: Duration = Duration::from_secs(2);

/// Popularities of the `indie` recommendations, in upstream order.
pub const INDIE_POPULARITIES: [u32; 10] = [10, 60, 20, 70, 30, 80, 40, 90, 49, 51];

pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "status": 401, "message": "Invalid access token" } })),
    )
        .into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": { "status": 500, "message": "Server error" } })),
    )
        .into_response()
}

/// Tokens the fake accepts: `good-token` sees everything, `no-tracks-token`
/// fails on top tracks, `no-profile-token` fails on `/me`, `slow-token`
/// answers only after [`SLOW_RESPONSE`].
fn known_token(token: Option<&str>) -> Option<&str> {
    token.filter(|t| {
        matches!(
            *t,
            "good-token" | "no-tracks-token" | "no-profile-token" | "slow-token"
        )
    })
}

async fn stall_if_slow(token: Option<&str>) {
    if token == Some("slow-token") {
        tokio::time::sleep(SLOW_RESPONSE).await;
    }
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    let field = |k: &str| form.get(k).map(String::as_str);
    if field("client_id") != Some(CLIENT_ID)
        || field("client_secret") != Some(CLIENT_SECRET)
        || field("redirect_uri") != Some(REDIRECT_URI)
    {
        return (StatusCode::UNAUTHORIZED, r#"{"error":"invalid_client"}"#).into_response();
    }
    if field("grant_type") != Some("authorization_code") {
        return (StatusCode::BAD_REQUEST, r#"{"error":"unsupported_grant_type"}"#).into_response();
    }
    let access = match field("code") {
        Some("good") => "good-token",
        Some("no-tracks") => "no-tracks-token",
        Some("no-profile") => "no-profile-token",
        Some("slow") => "slow-token",
        Some("garbled") => return (StatusCode::OK, "<html>maintenance</html>").into_response(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#,
            )
                .into_response()
        }
    };
    Json(json!({
        "access_token": access,
        "token_type": "Bearer",
        "scope": "user-read-private user-top-read",
        "expires_in": 3600,
        "refresh_token": format!("refresh-{}", access),
    }))
    .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    stall_if_slow(bearer(&headers)).await;
    match known_token(bearer(&headers)) {
        None => unauthorized(),
        Some("no-profile-token") => server_error(),
        Some(_) => Json(json!({
            "id": "listener42",
            "display_name": "Test Listener",
            "country": "SE",
            "followers": { "href": null, "total": 7 },
            "product": "premium"
        }))
        .into_response(),
    }
}

fn artist_json(id: &str, name: &str, genres: &[&str], popularity: u32) -> Value {
    json!({ "id": id, "name": name, "genres": genres, "popularity": popularity, "type": "artist" })
}

async fn top_artists(headers: HeaderMap) -> Response {
    if known_token(bearer(&headers)).is_none() {
        return unauthorized();
    }
    Json(json!({
        "items": [
            artist_json("a1", "Alpha", &["indie"], 70),
            artist_json("a2", "Beta", &["shoegaze", "dream pop"], 55),
            artist_json("a3", "Gamma", &[], 30),
        ],
        "total": 3,
        "limit": 20,
        "offset": 0
    }))
    .into_response()
}

fn track_json(name: &str, artist: &str, popularity: u32) -> Value {
    json!({
        "name": name,
        "artists": [{ "id": "x", "name": artist }],
        "album": { "name": format!("{} LP", name) },
        "popularity": popularity,
        "preview_url": format!("https://p.scdn.co/mp3-preview/{}", name),
    })
}

async fn top_tracks(headers: HeaderMap) -> Response {
    match known_token(bearer(&headers)) {
        None => unauthorized(),
        Some("no-tracks-token") => server_error(),
        Some(_) => Json(json!({
            "items": [track_json("Anthem", "Alpha", 80), track_json("Lullaby", "Beta", 45)]
        }))
        .into_response(),
    }
}

async fn related_artists(Path(id): Path<String>, headers: HeaderMap) -> Response {
    stall_if_slow(bearer(&headers)).await;
    if known_token(bearer(&headers)).is_none() {
        return unauthorized();
    }
    if !id.starts_with('a') {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "status": 404, "message": "non existing id" } })),
        )
            .into_response();
    }
    let artists: Vec<Value> = (0..6)
        .map(|n| artist_json(&format!("{}-r{}", id, n), &format!("{} related {}", id, n), &["indie"], 40 + n * 10))
        .collect();
    Json(json!({ "artists": artists })).into_response()
}

async fn recommendations(Query(q): Query<HashMap<String, String>>, headers: HeaderMap) -> Response {
    if known_token(bearer(&headers)).is_none() {
        return unauthorized();
    }
    if q.get("limit").map(String::as_str) != Some("50") {
        return (StatusCode::BAD_REQUEST, "limit must be 50").into_response();
    }
    let tracks: Vec<Value> = match q.get("seed_genres").map(String::as_str) {
        Some("indie") => INDIE_POPULARITIES
            .iter()
            .enumerate()
            .map(|(i, p)| track_json(&format!("indie-{}", i), "Someone", *p))
            .collect(),
        Some("jazz") => (0..20)
            .map(|i| track_json(&format!("jazz-{}", i), "Trio", 5))
            .collect(),
        Some("garbled") => return (StatusCode::OK, "<html>maintenance</html>").into_response(),
        Some("orphans") => vec![
            json!({ "name": "no-artist", "artists": [], "album": { "name": "x" }, "popularity": 1, "preview_url": null }),
            json!({ "name": "has-artist", "artists": [{ "name": "Solo" }], "album": { "name": "y" }, "popularity": 2, "preview_url": null }),
        ],
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": { "status": 400, "message": "invalid request" } })),
            )
                .into_response()
        }
    };
    Json(json!({ "tracks": tracks, "seeds": [] })).into_response()
}

/// A fake of the accounts service and Web API, rooted at `/` and `/v1`.
pub fn fake_spotify() -> Router {
    Router::new()
        .route("/api/token", post(token))
        .route("/v1/me", get(me))
        .route("/v1/me/top/artists", get(top_artists))
        .route("/v1/me/top/tracks", get(top_tracks))
        .route("/v1/artists/:id/related-artists", get(related_artists))
        .route("/v1/recommendations", get(recommendations))
}

pub async fn spotify_client() -> SpotifyClient {
    spotify_client_with_timeout(Duration::from_secs(5)).await
}

pub async fn spotify_client_with_timeout(timeout: Duration) -> SpotifyClient {
    let upstream = serve(fake_spotify()).await;
    SpotifyClient::new(CLIENT_ID.into(), CLIENT_SECRET.into(), REDIRECT_URI.into(), timeout)
    .unwrap()
    .with_base_urls(format!("http://{}/v1", upstream), format!("http://{}", upstream))
}

/// The application served against the fake, plus a browser that does not
/// follow redirects.
pub struct TestApp {
    pub base: String,
    pub sessions: Arc<MemoryStore>,
    pub browser: reqwest::Client,
}

impl TestApp {
    pub async fn start() -> Self {
        Self::start_with_timeout(Duration::from_secs(5)).await
    }

    /// Like [`start`](Self::start) with a custom upstream timeout.
    pub async fn start_with_timeout(timeout: Duration) -> Self {
        let sessions = Arc::new(MemoryStore::new());
        let state = AppState::new(spotify_client_with_timeout(timeout).await, sessions.clone());
        let addr = serve(spotify_discover::app(state)).await;
        let browser = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();
        Self {
            base: format!("http://{}", addr),
            sessions,
            browser,
        }
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut req = self.browser.get(format!("{}{}", self.base, path));
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE.as_str(), cookie);
        }
        req.send().await.unwrap()
    }

    /// Completes `/callback` with `code` and returns the `sid=…` cookie pair.
    pub async fn login_with(&self, code: &str) -> String {
        let res = self.get(&format!("/callback?code={}", code), None).await;
        assert!(res.status().is_redirection(), "callback status {}", res.status());
        set_cookie_pair(&res).expect("callback sets a session cookie")
    }
}

pub fn location(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get(header::LOCATION.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The `name=value` part of the response's Set-Cookie header.
pub fn set_cookie_pair(res: &reqwest::Response) -> Option<String> {
    let raw = res.headers().get(header::SET_COOKIE.as_str())?.to_str().ok()?;
    raw.split(';').next().map(|s| s.trim().to_string())
}

pub fn sid(cookie_pair: &str) -> &str {
    cookie_pair.strip_prefix("sid=").unwrap_or(cookie_pair)
}
