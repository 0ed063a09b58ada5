//! Gmail API client
//!
//! Sends composed messages and stores drafts through the Gmail REST API.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::google::{GMAIL_API_BASE, USER_ID};
use crate::error::{GoogleMcpError, Result, UpstreamError};
use crate::google::auth::Authenticator;
use crate::google::mail::RawMessage;
use crate::google::types::{CreateDraftRequest, Draft, SendMessageRequest, SentMessage};

/// Mail operations needed by the tools
#[async_trait]
pub trait MailApi: Send + Sync {
    async fn send_message(&self, raw: &RawMessage) -> Result<SentMessage>;

    async fn create_draft(&self, raw: &RawMessage) -> Result<Draft>;
}

/// Client for the Gmail API
pub struct GmailClient {
    http_client: reqwest::Client,
    authenticator: Arc<Authenticator>,
    base_url: String,
}

impl GmailClient {
    /// Create a new Gmail client
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self::with_base_url(authenticator, GMAIL_API_BASE.to_string())
    }

    /// Create a client against a non-default API endpoint
    pub fn with_base_url(authenticator: Arc<Authenticator>, base_url: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            authenticator,
            base_url,
        }
    }

    /// Get a valid access token
    async fn access_token(&self) -> Result<String> {
        self.authenticator.access_token().await
    }
}

#[async_trait]
impl MailApi for GmailClient {
    async fn send_message(&self, raw: &RawMessage) -> Result<SentMessage> {
        let token = self.access_token().await?;
        let url = format!("{}/users/{}/messages/send", self.base_url, USER_ID);
        let request = SendMessageRequest {
            raw: raw.as_str().to_string(),
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(GoogleMcpError::Upstream(UpstreamError::RequestFailed {
                message: format!("Failed to send email ({}): {}", status, text),
            }))
        }
    }

    async fn create_draft(&self, raw: &RawMessage) -> Result<Draft> {
        let token = self.access_token().await?;
        let url = format!("{}/users/{}/drafts", self.base_url, USER_ID);
        let request = CreateDraftRequest {
            message: SendMessageRequest {
                raw: raw.as_str().to_string(),
            },
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(GoogleMcpError::Upstream(UpstreamError::RequestFailed {
                message: format!("Failed to create draft ({}): {}", status, text),
            }))
        }
    }
}
