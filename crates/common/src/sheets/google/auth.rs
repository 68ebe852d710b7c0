//! Service-account authentication for the Google APIs.
//!
//! A signed RS256 assertion is exchanged at the token endpoint for a
//! short-lived access token, which is cached until shortly before expiry.

use crate::errors::{AppError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::RwLock;
use tracing::debug;

/// Read/write access to spreadsheets
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion
const ASSERTION_TTL_SECS: i64 = 3600;

/// Tokens are refreshed this long before they actually expire
const REFRESH_MARGIN_SECS: i64 = 60;

/// Claims of the service-account assertion
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Service account email
    pub iss: String,
    pub scope: String,
    /// Token endpoint
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Last issued token, shared by concurrent callers
#[derive(Default)]
struct TokenCache {
    slot: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    /// The cached token while fresh, otherwise the result of `refresh`
    async fn get_or_refresh<F, Fut>(&self, now: DateTime<Utc>, refresh: F) -> Result<String>
    where
        F: FnOnce(DateTime<Utc>) -> Fut,
        Fut: Future<Output = Result<CachedToken>>,
    {
        if let Some(token) = self.slot.read().await.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let mut slot = self.slot.write().await;
        // another caller may have refreshed while we waited for the lock
        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let token = refresh(now).await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }
}

/// Issues and caches access tokens for one service account
pub struct TokenSource {
    client: reqwest::Client,
    client_email: String,
    encoding_key: EncodingKey,
    token_uri: String,
    cache: TokenCache,
}

impl TokenSource {
    /// Create a token source from a PEM private key
    pub fn new(
        client: reqwest::Client,
        client_email: String,
        private_key_pem: &str,
        token_uri: String,
    ) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?;

        Ok(Self {
            client,
            client_email,
            encoding_key,
            token_uri,
            cache: TokenCache::default(),
        })
    }

    /// Build the signed assertion for `now`
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: SPREADSHEETS_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_TTL_SECS)).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?)
    }

    /// A valid access token, fetching a new one when needed
    pub async fn access_token(&self) -> Result<String> {
        self.cache.get_or_refresh(Utc::now(), |now| self.fetch(now)).await
    }

    async fn fetch(&self, now: DateTime<Utc>) -> Result<CachedToken> {
        let assertion = self.assertion(now)?;

        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "Token endpoint rejected service account ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Failed to parse token response: {}", e)))?;

        debug!(expires_in = token.expires_in, "Access token refreshed");

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
