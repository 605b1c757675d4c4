//! HTML pages. Kept deliberately plain; every interpolated value is escaped.

use std::fmt::Write;

use crate::profile::UserData;
use crate::recommend::Recommendation;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body></html>\n",
        escape(title),
        body
    )
}

pub fn home() -> String {
    page(
        "Spotify Discover",
        "<h1>Spotify Discover</h1>\n<p><a href=\"/login\">Login with Spotify</a></p>",
    )
}

pub fn profile(user: &UserData) -> String {
    let mut body = String::new();
    let name = user.display_name().or(user.id()).unwrap_or("Spotify user");
    let _ = writeln!(body, "<h1>{}</h1>", escape(name));
    if let Some(id) = user.id() {
        let _ = writeln!(body, "<p>User id: {}</p>", escape(id));
    }
    if let Some(country) = user.country() {
        let _ = writeln!(body, "<p>Country: {}</p>", escape(country));
    }
    if let Some(followers) = user.followers() {
        let _ = writeln!(body, "<p>Followers: {}</p>", followers);
    }

    body.push_str("<h2>Top artists</h2>\n<ol>\n");
    for artist in &user.top_artists {
        let _ = writeln!(
            body,
            "<li>{} <small>({}; popularity {})</small></li>",
            escape(&artist.name),
            escape(&artist.genres.join(", ")),
            artist.popularity.value()
        );
    }
    body.push_str("</ol>\n<h2>Top tracks</h2>\n<ol>\n");
    for track in &user.top_tracks {
        let _ = writeln!(
            body,
            "<li>{} by {} <small>({})</small></li>",
            escape(&track.name),
            escape(track.primary_artist().unwrap_or("unknown artist")),
            escape(&track.album.name)
        );
    }
    body.push_str("</ol>\n<p><a href=\"/recommend\">Get recommendations</a> | <a href=\"/logout\">Logout</a></p>");

    page("Your profile", &body)
}

pub fn recommendations(items: &[Recommendation]) -> String {
    let mut body = String::from("<h1>Recommended for you</h1>\n");
    if items.is_empty() {
        body.push_str("<p>No recommendations right now.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for item in items {
            match item {
                Recommendation::Artist { name, genres, popularity } => {
                    let _ = writeln!(
                        body,
                        "<li class=\"artist\">Artist: {} <small>({}; popularity {})</small></li>",
                        escape(name),
                        escape(&genres.join(", ")),
                        popularity.value()
                    );
                }
                Recommendation::Track { name, artist, album, popularity, preview_url } => {
                    let _ = write!(
                        body,
                        "<li class=\"track\">Track: {} by {} from {} <small>(popularity {})</small>",
                        escape(name),
                        escape(artist),
                        escape(album),
                        popularity.value()
                    );
                    if let Some(url) = preview_url {
                        let _ = write!(body, " <a href=\"{}\">preview</a>", escape(url));
                    }
                    body.push_str("</li>\n");
                }
            }
        }
        body.push_str("</ul>\n");
    }
    body.push_str("<p><a href=\"/profile\">Back to profile</a> | <a href=\"/logout\">Logout</a></p>");

    page("Recommendations", &body)
}
