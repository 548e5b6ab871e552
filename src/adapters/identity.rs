//! Google OAuth2 identity adapter.
//!
//! Implements the interactive sign-in boundary with the device
//! authorization flow: the user visits a verification URL, enters a
//! short code, and this client polls the token endpoint until the grant
//! completes. The resulting access token is shared with the catalog
//! gateway through a [`TokenStore`].
//!
//! Nothing is persisted across processes; `initialize` therefore always
//! restores to a signed-out session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;

use super::{IdentityError, IdentityProvider};
use crate::config::Credentials;

const DEVICE_CODE_URL: &str = "https://oauth2.googleapis.com/device/code";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";
const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Read-only catalog access, the only scope this client ever requests.
pub const CATALOG_SCOPE: &str = "https://www.googleapis.com/auth/youtube.readonly";

/// Shared holder for the current OAuth access token.
///
/// The identity adapter writes it on sign-in and clears it on sign-out;
/// the catalog gateway reads it to attach bearer authorization.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn set(&self, token: String) {
        *self.token.write() = Some(token);
    }

    pub fn clear(&self) {
        *self.token.write() = None;
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().clone()
    }
}

/// Response from the device-code endpoint
#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    /// Google spells this `verification_url`; the RFC says `_uri`
    #[serde(alias = "verification_uri")]
    verification_url: String,
    /// Polling interval in seconds
    #[serde(default = "default_poll_interval")]
    interval: u64,
}

fn default_poll_interval() -> u64 {
    5
}

/// Response from the token endpoint while polling
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// OAuth2 device-flow client for the Google identity service.
pub struct GoogleIdentity {
    client: reqwest::Client,
    client_id: String,
    scope: String,
    tokens: TokenStore,
}

impl GoogleIdentity {
    /// Create an identity adapter for the given credentials, sharing
    /// `tokens` with the catalog gateway.
    pub fn new(credentials: &Credentials, tokens: TokenStore) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: credentials.client_id.clone(),
            scope: credentials.scope.clone(),
            tokens,
        }
    }

    async fn request_device_code(&self) -> Result<DeviceCodeResponse, IdentityError> {
        let response = self
            .client
            .post(DEVICE_CODE_URL)
            .form(&[("client_id", self.client_id.as_str()), ("scope", self.scope.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::SignIn(format!(
                "device code request failed with status {}: {}",
                status,
                body.trim()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IdentityError::SignIn(format!("malformed device code response: {}", e)))
    }

    /// Poll the token endpoint until the user completes the grant, the
    /// code expires, or the user denies access.
    async fn poll_for_token(&self, device_code: &str, interval: u64) -> Result<String, IdentityError> {
        let mut wait = Duration::from_secs(interval);

        loop {
            tokio::time::sleep(wait).await;

            let response = self
                .client
                .post(TOKEN_URL)
                .form(&[
                    ("client_id", self.client_id.as_str()),
                    ("device_code", device_code),
                    ("grant_type", DEVICE_GRANT_TYPE),
                ])
                .send()
                .await?;

            let body: TokenResponse = response
                .json()
                .await
                .map_err(|e| IdentityError::SignIn(format!("malformed token response: {}", e)))?;

            if let Some(token) = body.access_token {
                return Ok(token);
            }

            match body.error.as_deref() {
                Some("authorization_pending") => continue,
                Some("slow_down") => {
                    wait += Duration::from_secs(5);
                    continue;
                }
                Some("expired_token") => {
                    return Err(IdentityError::SignIn(
                        "the device code expired before the grant completed".to_string(),
                    ));
                }
                Some("access_denied") => {
                    return Err(IdentityError::SignIn(
                        "access was denied by the user".to_string(),
                    ));
                }
                Some(other) => {
                    let detail = body.error_description.unwrap_or_default();
                    return Err(IdentityError::SignIn(format!("{}: {}", other, detail)));
                }
                None => {
                    return Err(IdentityError::SignIn(
                        "token endpoint returned neither a token nor an error".to_string(),
                    ));
                }
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn initialize(&self) -> Result<bool, IdentityError> {
        if self.client_id.trim().is_empty() {
            return Err(IdentityError::Config("client id is empty".to_string()));
        }
        if self.scope.trim().is_empty() {
            return Err(IdentityError::Config("scope is empty".to_string()));
        }

        // No session persistence: a fresh process always starts signed out.
        Ok(false)
    }

    async fn sign_in(&self) -> Result<(), IdentityError> {
        let device = self.request_device_code().await?;

        // The interactive flow is inherently user-facing; the prompt goes
        // straight to stderr like the rest of the CLI status output.
        eprintln!("To sign in, visit: {}", device.verification_url);
        eprintln!("and enter the code: {}", device.user_code);

        let token = self.poll_for_token(&device.device_code, device.interval).await?;
        self.tokens.set(token);

        tracing::info!("sign-in completed");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let token = self.tokens.get();

        // Revoke remotely when a token exists, but always drop it locally.
        if let Some(token) = token {
            let response = self
                .client
                .post(REVOKE_URL)
                .form(&[("token", token.as_str())])
                .send()
                .await;
            self.tokens.clear();

            let response = response?;
            if !response.status().is_success() {
                let status = response.status();
                return Err(IdentityError::SignOut(format!(
                    "token revocation failed with status {}",
                    status
                )));
            }
        }

        tracing::info!("sign-out completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_store() {
        let store = TokenStore::default();
        assert!(store.get().is_none());

        store.set("ya29.token".to_string());
        assert_eq!(store.get().as_deref(), Some("ya29.token"));

        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_device_code_response_parsing() {
        let json = r#"{
            "device_code": "dc-123",
            "user_code": "ABCD-EFGH",
            "verification_url": "https://www.google.com/device",
            "expires_in": 1800,
            "interval": 5
        }"#;

        let parsed: DeviceCodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.device_code, "dc-123");
        assert_eq!(parsed.user_code, "ABCD-EFGH");
        assert_eq!(parsed.interval, 5);
    }

    #[test]
    fn test_device_code_response_rfc_field_name() {
        let json = r#"{
            "device_code": "dc-123",
            "user_code": "ABCD-EFGH",
            "verification_uri": "https://example.com/device"
        }"#;

        let parsed: DeviceCodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.verification_url, "https://example.com/device");
        assert_eq!(parsed.interval, 5); // default
    }

    #[test]
    fn test_token_response_variants() {
        let pending: TokenResponse =
            serde_json::from_str(r#"{"error": "authorization_pending"}"#).unwrap();
        assert_eq!(pending.error.as_deref(), Some("authorization_pending"));
        assert!(pending.access_token.is_none());

        let granted: TokenResponse =
            serde_json::from_str(r#"{"access_token": "ya29.x", "expires_in": 3599}"#).unwrap();
        assert_eq!(granted.access_token.as_deref(), Some("ya29.x"));
    }
}
