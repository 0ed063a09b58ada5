//! Error types for the Google MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Google MCP Server
#[derive(Error, Debug)]
pub enum GoogleMcpError {
    /// OAuth authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Gmail and Calendar API errors
    #[error("Upstream API error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Tool argument errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Tool dispatch to a name outside the registry
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// OAuth authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Client credentials file not found: {path}")]
    ClientCredentialsNotFound { path: String },

    #[error("Invalid client credentials format: expected 'installed' or 'web' credentials")]
    InvalidClientCredentials,

    #[error("Device authorization request failed: {message}")]
    DeviceAuthorizationFailed { message: String },

    #[error("Device authorization failed: {code}")]
    DeviceFlowDenied { code: String },

    #[error("Device authorization not granted after {attempts} polls")]
    PollLimitExceeded { attempts: u32 },

    #[error("Failed to refresh access token: {message}")]
    TokenRefreshFailed { message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found: {path}")]
    DirNotFound { path: String },

    #[error("Failed to create config directory: {path}")]
    DirCreationFailed { path: String },
}

/// Gmail and Calendar API errors
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("API request failed: {message}")]
    RequestFailed { message: String },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: String },
}

/// Tool argument errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
}

/// Result type alias for Google MCP operations
pub type Result<T> = std::result::Result<T, GoogleMcpError>;
