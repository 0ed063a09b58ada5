//! Calendar API client and event mapping
//!
//! Translates tool arguments into Calendar API payloads and performs the
//! event CRUD calls.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::google::{CALENDAR_API_BASE, TIME_ZONE};
use crate::error::{GoogleMcpError, Result, UpstreamError};
use crate::google::auth::Authenticator;
use crate::google::types::{Event, EventAttendee, EventTime};

/// Input for creating an event
#[derive(Debug, Clone)]
pub struct CalendarEventSpec {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Option<Vec<String>>,
}

/// Fields an update may overwrite; everything absent stays untouched
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub summary: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub description: Option<String>,
}

/// Build the API payload for a new event.
///
/// Start and end both get the server's fixed time zone; absent optionals
/// are left out of the payload entirely.
pub fn build_event(spec: &CalendarEventSpec) -> Event {
    Event {
        summary: Some(spec.summary.clone()),
        description: spec.description.clone(),
        location: spec.location.clone(),
        start: Some(event_time(&spec.start_time)),
        end: Some(event_time(&spec.end_time)),
        attendees: spec
            .attendees
            .as_ref()
            .map(|emails| {
                emails
                    .iter()
                    .map(|email| EventAttendee {
                        email: email.clone(),
                        extra: serde_json::Map::new(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        ..Default::default()
    }
}

/// Overlay a patch onto a fetched event.
///
/// Only supplied fields are overwritten. A patched start or end replaces
/// the dateTime alone, keeping the stored time zone.
pub fn merge_event(mut event: Event, patch: &EventPatch) -> Event {
    if let Some(ref summary) = patch.summary {
        event.summary = Some(summary.clone());
    }
    if let Some(ref start_time) = patch.start_time {
        event.start.get_or_insert_with(EventTime::default).date_time = Some(start_time.clone());
    }
    if let Some(ref end_time) = patch.end_time {
        event.end.get_or_insert_with(EventTime::default).date_time = Some(end_time.clone());
    }
    if let Some(ref description) = patch.description {
        event.description = Some(description.clone());
    }
    event
}

fn event_time(date_time: &str) -> EventTime {
    EventTime {
        date_time: Some(date_time.to_string()),
        time_zone: Some(TIME_ZONE.to_string()),
        extra: serde_json::Map::new(),
    }
}

/// Event operations needed by the tools
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn insert_event(&self, calendar_id: &str, event: &Event) -> Result<Event>;

    async fn get_event(&self, calendar_id: &str, event_id: &str) -> Result<Event>;

    async fn update_event(&self, calendar_id: &str, event_id: &str, event: &Event)
        -> Result<Event>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()>;
}

/// Client for the Calendar API
pub struct CalendarClient {
    http_client: reqwest::Client,
    authenticator: Arc<Authenticator>,
    base_url: String,
}

impl CalendarClient {
    /// Create a new Calendar client
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self::with_base_url(authenticator, CALENDAR_API_BASE.to_string())
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

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> String {
        format!(
            "{}/{}",
            self.events_url(calendar_id),
            urlencoding::encode(event_id)
        )
    }
}

#[async_trait]
impl CalendarApi for CalendarClient {
    async fn insert_event(&self, calendar_id: &str, event: &Event) -> Result<Event> {
        let token = self.access_token().await?;
        let url = self.events_url(calendar_id);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(event)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(GoogleMcpError::Upstream(UpstreamError::RequestFailed {
                message: format!("Failed to create event ({}): {}", status, text),
            }))
        }
    }

    async fn get_event(&self, calendar_id: &str, event_id: &str) -> Result<Event> {
        let token = self.access_token().await?;
        let url = self.event_url(calendar_id, event_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else if response.status() == reqwest::StatusCode::NOT_FOUND {
            Err(GoogleMcpError::Upstream(UpstreamError::EventNotFound {
                event_id: event_id.to_string(),
            }))
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(GoogleMcpError::Upstream(UpstreamError::RequestFailed {
                message: format!("Failed to get event ({}): {}", status, text),
            }))
        }
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &Event,
    ) -> Result<Event> {
        let token = self.access_token().await?;
        let url = self.event_url(calendar_id, event_id);

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(&token)
            .json(event)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else if response.status() == reqwest::StatusCode::NOT_FOUND {
            Err(GoogleMcpError::Upstream(UpstreamError::EventNotFound {
                event_id: event_id.to_string(),
            }))
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(GoogleMcpError::Upstream(UpstreamError::RequestFailed {
                message: format!("Failed to update event ({}): {}", status, text),
            }))
        }
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let token = self.access_token().await?;
        let url = self.event_url(calendar_id, event_id);

        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else if response.status() == reqwest::StatusCode::NOT_FOUND {
            Err(GoogleMcpError::Upstream(UpstreamError::EventNotFound {
                event_id: event_id.to_string(),
            }))
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(GoogleMcpError::Upstream(UpstreamError::RequestFailed {
                message: format!("Failed to delete event ({}): {}", status, text),
            }))
        }
    }
}
