//! Authorization Code flow: authorize URL and code-for-token exchange.

use serde::Deserialize;
use thiserror::Error;

use super::SpotifyClient;

/// Scopes requested at login.
pub const SCOPES: [&str; 2] = ["user-read-private", "user-top-read"];

#[derive(Debug, Error)]
pub enum TokenExchangeError {
    /// The token endpoint answered with something other than 200; `body` is
    /// passed through verbatim.
    #[error("token endpoint returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected token response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Tokens granted for one user.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SpotifyClient {
    /// The provider URL `/login` redirects to.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/authorize?response_type=code&client_id={}&redirect_uri={}&scope={}",
            self.accounts_base,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
        )
    }

    /// Exchanges an authorization code for tokens, sending the client
    /// credentials in the form body.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenPair, TokenExchangeError> {
        let url = format!("{}/api/token", self.accounts_base);
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let res = self
            .client
            .post(&url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(&params)
            .send()
            .await?;

        let status = res.status();
        if status != reqwest::StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "token exchange rejected");
            return Err(TokenExchangeError::Rejected { status, body });
        }

        let bytes = res.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(error = %e, "token response is not valid JSON");
            TokenExchangeError::Decode(e)
        })
    }
}
