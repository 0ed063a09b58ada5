//! Shared types for Gmail and Calendar API requests and responses

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response to sending a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    /// Message ID assigned by Gmail
    pub id: String,

    /// Thread the message belongs to
    pub thread_id: String,
}

/// A draft stored in the user's mailbox
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    /// Draft ID
    pub id: String,

    /// The message wrapped by the draft
    pub message: DraftMessage,
}

/// Message portion of a draft response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftMessage {
    /// Message ID assigned by Gmail
    pub id: String,
}

/// Request body for sending a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Encoded RFC 2822 message
    pub raw: String,
}

/// Request body for creating a draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDraftRequest {
    pub message: SendMessageRequest,
}

/// A Calendar event
///
/// Only the fields the tools read or write are typed; everything else the
/// API returns is kept in `extra` so a read-modify-write cycle does not
/// drop it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<EventAttendee>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,

    /// Last modification time, set by the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Start or end of an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// An event attendee
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventAttendee {
    pub email: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
