//! OAuth 2.0 device flow authentication
//!
//! Manages the stored credential for all API calls: loads it from disk,
//! refreshes it when expired, and runs the device authorization flow when
//! no usable credential exists.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{AuthError, GoogleMcpError, Result};

/// OAuth client credentials loaded from credentials.json
#[derive(Debug, Clone, Deserialize)]
pub struct ClientRegistration {
    pub client_id: String,
    pub client_secret: String,
}

/// Wrapper matching the Google credentials file layout
#[derive(Debug, Deserialize)]
struct ClientRegistrationFile {
    #[serde(alias = "web")]
    installed: Option<ClientRegistration>,
}

/// Credential persisted in token.json
///
/// `expiry` is unix seconds; a credential without one is treated as valid
/// until an API call rejects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    pub token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    pub token_uri: String,

    pub client_id: String,

    pub client_secret: String,

    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

impl StoredCredential {
    fn is_expired(&self, now: i64) -> bool {
        matches!(self.expiry, Some(expiry) if expiry <= now)
    }
}

/// Token endpoint success response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,

    #[serde(default)]
    refresh_token: Option<String>,

    #[serde(default)]
    expires_in: Option<i64>,
}

/// Device authorization endpoint response
#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_url: String,

    #[serde(default = "default_poll_interval")]
    interval: u64,
}

fn default_poll_interval() -> u64 {
    5
}

/// Manages OAuth credentials for Gmail and Calendar access
pub struct Authenticator {
    config: Config,
    http_client: reqwest::Client,
    credential: Arc<RwLock<Option<StoredCredential>>>,
}

impl Authenticator {
    /// Create a new authenticator
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            credential: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a valid access token for API calls
    pub async fn access_token(&self) -> Result<String> {
        Ok(self.ensure_credential().await?.token)
    }

    /// Return a usable credential, going to disk or to Google as needed.
    ///
    /// An unexpired credential is returned as is. An expired one with a
    /// refresh token gets exactly one refresh attempt; if that fails, or no
    /// credential exists at all, the device flow starts.
    pub async fn ensure_credential(&self) -> Result<StoredCredential> {
        {
            let cached = self.credential.read().await;
            if let Some(ref credential) = *cached {
                if !credential.is_expired(unix_now()) {
                    return Ok(credential.clone());
                }
            }
        }

        let credential = self.acquire_credential().await?;
        *self.credential.write().await = Some(credential.clone());
        Ok(credential)
    }

    async fn acquire_credential(&self) -> Result<StoredCredential> {
        if self.config.token_path.exists() {
            match self.load_credential().await {
                Ok(credential) => {
                    if !credential.is_expired(unix_now()) {
                        return Ok(credential);
                    }
                    if let Some(refresh_token) = credential.refresh_token.clone() {
                        match self.refresh_credential(&credential, &refresh_token).await {
                            Ok(refreshed) => {
                                self.save_credential(&refreshed).await?;
                                return Ok(refreshed);
                            }
                            Err(e) => {
                                tracing::warn!("Token refresh failed: {}", e);
                                eprintln!("Token-Refresh fehlgeschlagen, starte neue Authentifizierung...");
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to load stored token: {}", e);
                }
            }
        }

        self.device_flow().await
    }

    /// Load the stored credential from disk
    async fn load_credential(&self) -> Result<StoredCredential> {
        let content = tokio::fs::read_to_string(&self.config.token_path).await?;
        let credential: StoredCredential = serde_json::from_str(&content)?;
        Ok(credential)
    }

    /// Save a credential to disk
    async fn save_credential(&self, credential: &StoredCredential) -> Result<()> {
        if let Some(parent) = self.config.token_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(credential)?;
        tokio::fs::write(&self.config.token_path, content).await?;
        Ok(())
    }

    /// Exchange a refresh token for a new access token
    async fn refresh_credential(
        &self,
        credential: &StoredCredential,
        refresh_token: &str,
    ) -> Result<StoredCredential> {
        tracing::info!("Refreshing access token");

        let params = [
            ("client_id", credential.client_id.as_str()),
            ("client_secret", credential.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&credential.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleMcpError::Auth(AuthError::TokenRefreshFailed {
                message: text,
            }));
        }

        let token: TokenResponse = response.json().await?;
        let now = unix_now();

        Ok(StoredCredential {
            token: token.access_token,
            // Google usually omits the refresh token here; keep the old one
            refresh_token: token.refresh_token.or_else(|| Some(refresh_token.to_string())),
            token_uri: credential.token_uri.clone(),
            client_id: credential.client_id.clone(),
            client_secret: credential.client_secret.clone(),
            scopes: credential.scopes.clone(),
            expiry: token.expires_in.map(|s| now + s),
        })
    }

    /// Run the full device authorization flow and persist the result
    async fn device_flow(&self) -> Result<StoredCredential> {
        let registration = self.load_client_registration()?;

        tracing::info!("Starting device authorization flow");
        let device = self.request_device_code(&registration).await?;

        eprintln!();
        eprintln!("============================================================");
        eprintln!("GOOGLE AUTHENTIFIZIERUNG ERFORDERLICH");
        eprintln!("============================================================");
        eprintln!();
        eprintln!("1. Öffne: {}", device.verification_url);
        eprintln!("2. Gib diesen Code ein: {}", device.user_code);
        eprintln!();
        eprintln!("3. Autorisiere den Zugriff auf Gmail & Calendar");
        eprintln!();
        eprintln!("Warte auf Autorisierung...");

        let token = self.poll_for_token(&registration, &device).await?;
        let now = unix_now();

        let credential = StoredCredential {
            token: token.access_token,
            refresh_token: token.refresh_token,
            token_uri: self.config.token_url.clone(),
            client_id: registration.client_id,
            client_secret: registration.client_secret,
            scopes: self.config.scopes.clone(),
            expiry: token.expires_in.map(|s| now + s),
        };
        self.save_credential(&credential).await?;

        eprintln!();
        eprintln!("Authentifizierung erfolgreich!");
        eprintln!("Token gespeichert: {}", self.config.token_path.display());

        Ok(credential)
    }

    /// Read the OAuth client registration from credentials.json
    fn load_client_registration(&self) -> Result<ClientRegistration> {
        let path = &self.config.credentials_path;
        if !path.exists() {
            return Err(GoogleMcpError::Auth(AuthError::ClientCredentialsNotFound {
                path: path.display().to_string(),
            }));
        }

        let content = std::fs::read_to_string(path)?;
        let file: ClientRegistrationFile = serde_json::from_str(&content)?;
        file.installed
            .ok_or(GoogleMcpError::Auth(AuthError::InvalidClientCredentials))
    }

    /// Ask Google for a device code and user code
    async fn request_device_code(
        &self,
        registration: &ClientRegistration,
    ) -> Result<DeviceCodeResponse> {
        let scope = self.config.scopes.join(" ");
        let params = [
            ("client_id", registration.client_id.as_str()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.config.device_auth_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleMcpError::Auth(AuthError::DeviceAuthorizationFailed {
                message: text,
            }));
        }

        Ok(response.json().await?)
    }

    /// Poll the token endpoint until the user grants or denies access.
    ///
    /// Waits one interval before every poll. `authorization_pending` keeps
    /// the current pace, `slow_down` stretches the interval by a second,
    /// any other error code is terminal.
    async fn poll_for_token(
        &self,
        registration: &ClientRegistration,
        device: &DeviceCodeResponse,
    ) -> Result<TokenResponse> {
        let mut interval = device.interval;
        let mut attempts: u32 = 0;

        loop {
            if let Some(limit) = self.config.device_poll_limit {
                if attempts >= limit {
                    return Err(GoogleMcpError::Auth(AuthError::PollLimitExceeded {
                        attempts,
                    }));
                }
            }

            tokio::time::sleep(Duration::from_secs(interval)).await;
            attempts += 1;

            let params = [
                ("client_id", registration.client_id.as_str()),
                ("client_secret", registration.client_secret.as_str()),
                ("device_code", device.device_code.as_str()),
                ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
            ];

            let response = self
                .http_client
                .post(&self.config.token_url)
                .form(&params)
                .send()
                .await?;

            let payload: Value = response.json().await?;

            if let Some(code) = payload.get("error").and_then(|e| e.as_str()) {
                match code {
                    "authorization_pending" => continue,
                    "slow_down" => {
                        interval += 1;
                        continue;
                    }
                    _ => {
                        return Err(GoogleMcpError::Auth(AuthError::DeviceFlowDenied {
                            code: code.to_string(),
                        }))
                    }
                }
            }

            return Ok(serde_json::from_value(payload)?);
        }
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_registration_deserialization() {
        let json = r#"{
            "installed": {
                "client_id": "test_client_id",
                "client_secret": "test_secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;

        let file: ClientRegistrationFile = serde_json::from_str(json).unwrap();
        let registration = file.installed.unwrap();
        assert_eq!(registration.client_id, "test_client_id");
        assert_eq!(registration.client_secret, "test_secret");
    }

    #[test]
    fn test_client_registration_web_alias() {
        let json = r#"{"web": {"client_id": "id", "client_secret": "secret"}}"#;
        let file: ClientRegistrationFile = serde_json::from_str(json).unwrap();
        assert!(file.installed.is_some());
    }

    #[test]
    fn test_stored_credential_field_names() {
        let credential = StoredCredential {
            token: "at".to_string(),
            refresh_token: Some("rt".to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            client_id: "cid".to_string(),
            client_secret: "cs".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/gmail.send".to_string()],
            expiry: None,
        };
        let value = serde_json::to_value(&credential).unwrap();
        let object = value.as_object().unwrap();
        for field in [
            "token",
            "refresh_token",
            "token_uri",
            "client_id",
            "client_secret",
            "scopes",
        ] {
            assert!(object.contains_key(field), "missing field {}", field);
        }
        // a credential without an expiry must not write one
        assert!(!object.contains_key("expiry"));
    }

    #[test]
    fn test_credential_expiry() {
        let mut credential = StoredCredential {
            token: "at".to_string(),
            refresh_token: None,
            token_uri: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            scopes: Vec::new(),
            expiry: None,
        };

        // no expiry means valid
        assert!(!credential.is_expired(1_000_000));

        credential.expiry = Some(999);
        assert!(credential.is_expired(1000));

        credential.expiry = Some(1001);
        assert!(!credential.is_expired(1000));
    }

    #[test]
    fn test_device_code_response_default_interval() {
        let json = r#"{
            "device_code": "dc",
            "user_code": "ABCD-EFGH",
            "verification_url": "https://www.google.com/device"
        }"#;
        let device: DeviceCodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(device.interval, 5);
    }
}
