//! Configuration management for the Google MCP Server
//!
//! Handles paths, environment variables, and OAuth endpoint constants.

use std::path::PathBuf;

use crate::error::{ConfigError, GoogleMcpError, Result};

/// Configuration for the Google MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for storing configuration files
    pub config_dir: PathBuf,

    /// Path to the stored credential (access/refresh tokens)
    pub token_path: PathBuf,

    /// Path to the OAuth client credentials file
    pub credentials_path: PathBuf,

    /// Device authorization endpoint
    pub device_auth_url: String,

    /// Token endpoint for device polling and refresh
    pub token_url: String,

    /// Requested OAuth scopes, in declaration order
    pub scopes: Vec<String>,

    /// Optional ceiling on device flow token polls
    pub device_poll_limit: Option<u32>,
}

impl Config {
    /// Create a new configuration with default paths
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;

        let token_path = std::env::var("GOOGLE_MCP_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir.join("token.json"));

        let credentials_path = std::env::var("GOOGLE_MCP_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir.join("credentials.json"));

        let device_poll_limit = std::env::var("GOOGLE_MCP_DEVICE_POLL_LIMIT")
            .ok()
            .and_then(|p| p.parse().ok());

        Ok(Self {
            config_dir,
            token_path,
            credentials_path,
            device_auth_url: google::DEVICE_AUTH_URL.to_string(),
            token_url: google::TOKEN_URL.to_string(),
            scopes: vec![
                "https://www.googleapis.com/auth/gmail.send".to_string(),
                "https://www.googleapis.com/auth/gmail.readonly".to_string(),
                "https://www.googleapis.com/auth/gmail.compose".to_string(),
                "https://www.googleapis.com/auth/calendar".to_string(),
                "https://www.googleapis.com/auth/calendar.events".to_string(),
            ],
            device_poll_limit,
        })
    }

    /// Get the configuration directory, creating it if necessary
    fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| {
                GoogleMcpError::Config(ConfigError::DirNotFound {
                    path: "~".to_string(),
                })
            })?
            .join(".config")
            .join("google-mcp");

        // Create directory if it doesn't exist
        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|_| {
                GoogleMcpError::Config(ConfigError::DirCreationFailed {
                    path: config_dir.display().to_string(),
                })
            })?;
        }

        Ok(config_dir)
    }
}

/// Google API constants
pub mod google {
    /// Base URL for the Gmail API
    pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

    /// Base URL for the Calendar API
    pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

    /// User ID for the authenticated user
    pub const USER_ID: &str = "me";

    /// Calendar used when a tool call names none
    pub const DEFAULT_CALENDAR_ID: &str = "primary";

    /// Time zone attached to created event times
    pub const TIME_ZONE: &str = "Europe/Berlin";

    /// Device authorization endpoint
    pub const DEVICE_AUTH_URL: &str = "https://oauth2.googleapis.com/device/code";

    /// Token endpoint
    pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = Config::new();
        assert!(config.is_ok());
    }

    #[test]
    fn test_default_scopes() {
        let config = Config::new().unwrap();
        assert_eq!(config.scopes.len(), 5);
        assert!(config.scopes[0].contains("gmail.send"));
        assert!(config.scopes.iter().any(|s| s.contains("gmail.readonly")));
        assert!(config.scopes.iter().any(|s| s.contains("calendar.events")));
    }

    #[test]
    fn test_default_paths() {
        let config = Config::new().unwrap();
        assert!(config.token_path.ends_with("token.json")
            || std::env::var("GOOGLE_MCP_TOKEN_PATH").is_ok());
        assert_eq!(config.token_url, "https://oauth2.googleapis.com/token");
        assert!(config.device_poll_limit.is_none()
            || std::env::var("GOOGLE_MCP_DEVICE_POLL_LIMIT").is_ok());
    }
}
