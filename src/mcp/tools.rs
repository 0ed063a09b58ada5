//! MCP Tool definitions and handlers
//!
//! Defines all available tools and dispatches calls to the Gmail and
//! Calendar clients.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::google::DEFAULT_CALENDAR_ID;
use crate::error::{GoogleMcpError, Result, ValidationError};
use crate::google::calendar::{build_event, merge_event, CalendarApi, CalendarEventSpec, EventPatch};
use crate::google::gmail::MailApi;
use crate::google::mail::{build_email, EmailSpec};
use crate::mcp::types::{CallToolResult, Tool};

/// The fixed set of callable tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    SendEmail,
    CreateDraft,
    CreateCalendarEvent,
    UpdateCalendarEvent,
    DeleteCalendarEvent,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::SendEmail,
        ToolName::CreateDraft,
        ToolName::CreateCalendarEvent,
        ToolName::UpdateCalendarEvent,
        ToolName::DeleteCalendarEvent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SendEmail => "send_email",
            ToolName::CreateDraft => "create_draft",
            ToolName::CreateCalendarEvent => "create_calendar_event",
            ToolName::UpdateCalendarEvent => "update_calendar_event",
            ToolName::DeleteCalendarEvent => "delete_calendar_event",
        }
    }

    pub fn parse(name: &str) -> Option<ToolName> {
        Self::ALL.iter().copied().find(|tool| tool.as_str() == name)
    }

    fn descriptor(&self) -> Tool {
        match self {
            ToolName::SendEmail => {
                tool_def(self.as_str(), "Email über Gmail senden", email_schema())
            }
            ToolName::CreateDraft => tool_def(
                self.as_str(),
                "Email als Entwurf in Gmail speichern",
                email_schema(),
            ),
            ToolName::CreateCalendarEvent => tool_def(
                self.as_str(),
                "Neues Calendar Event erstellen",
                create_event_schema(),
            ),
            ToolName::UpdateCalendarEvent => tool_def(
                self.as_str(),
                "Bestehendes Calendar Event aktualisieren",
                update_event_schema(),
            ),
            ToolName::DeleteCalendarEvent => tool_def(
                self.as_str(),
                "Calendar Event löschen",
                delete_event_schema(),
            ),
        }
    }
}

/// Descriptors for every registered tool
pub fn tool_descriptors() -> Vec<Tool> {
    ToolName::ALL.iter().map(ToolName::descriptor).collect()
}

/// Tool handler
///
/// Holds the API clients the tools call; errors stay typed here and are
/// turned into protocol text only in `call_tool`.
pub struct ToolHandler {
    mail: Arc<dyn MailApi>,
    calendar: Arc<dyn CalendarApi>,
    tools: Vec<Tool>,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(mail: Arc<dyn MailApi>, calendar: Arc<dyn CalendarApi>) -> Self {
        let tools = tool_descriptors();
        for (i, tool) in tools.iter().enumerate() {
            assert!(
                tools[..i].iter().all(|other| other.name != tool.name),
                "duplicate tool name: {}",
                tool.name
            );
        }
        Self {
            mail,
            calendar,
            tools,
        }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.clone()
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        match self.dispatch(name, args).await {
            Ok(payload) => match serde_json::to_string_pretty(&payload) {
                Ok(text) => CallToolResult::text(text),
                Err(e) => CallToolResult::error(e.to_string()),
            },
            Err(e) => CallToolResult::error(e.to_string()),
        }
    }

    async fn dispatch(&self, name: &str, args: Value) -> Result<Value> {
        let tool = ToolName::parse(name).ok_or_else(|| GoogleMcpError::UnknownTool {
            name: name.to_string(),
        })?;

        match tool {
            ToolName::SendEmail => self.handle_send_email(args, false).await,
            ToolName::CreateDraft => self.handle_send_email(args, true).await,
            ToolName::CreateCalendarEvent => self.handle_create_event(args).await,
            ToolName::UpdateCalendarEvent => self.handle_update_event(args).await,
            ToolName::DeleteCalendarEvent => self.handle_delete_event(args).await,
        }
    }

    // ==================== Tool Handlers ====================

    async fn handle_send_email(&self, args: Value, draft: bool) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            to: String,
            subject: String,
            body: String,
            #[serde(default)]
            cc: Option<String>,
        }

        let tool = if draft {
            ToolName::CreateDraft
        } else {
            ToolName::SendEmail
        };
        let args: Args = parse_args(tool, args)?;

        let raw = build_email(&EmailSpec {
            to: args.to,
            subject: args.subject,
            body: args.body,
            cc: args.cc,
        });

        if draft {
            let draft = self.mail.create_draft(&raw).await?;
            Ok(json!({
                "success": true,
                "draft_id": draft.id,
                "message_id": draft.message.id,
            }))
        } else {
            let sent = self.mail.send_message(&raw).await?;
            Ok(json!({
                "success": true,
                "message_id": sent.id,
                "thread_id": sent.thread_id,
            }))
        }
    }

    async fn handle_create_event(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            summary: String,
            start_time: String,
            end_time: String,
            #[serde(default)]
            description: Option<String>,
            #[serde(default)]
            location: Option<String>,
            #[serde(default)]
            attendees: Option<Vec<String>>,
            #[serde(default)]
            calendar_id: Option<String>,
        }

        let args: Args = parse_args(ToolName::CreateCalendarEvent, args)?;
        let calendar_id = args
            .calendar_id
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());

        let event = build_event(&CalendarEventSpec {
            summary: args.summary,
            start_time: args.start_time,
            end_time: args.end_time,
            description: args.description,
            location: args.location,
            attendees: args.attendees,
        });

        let created = self.calendar.insert_event(&calendar_id, &event).await?;
        Ok(json!({
            "success": true,
            "event_id": created.id,
            "html_link": created.html_link,
        }))
    }

    async fn handle_update_event(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            event_id: String,
            #[serde(default)]
            calendar_id: Option<String>,
            #[serde(default)]
            summary: Option<String>,
            #[serde(default)]
            start_time: Option<String>,
            #[serde(default)]
            end_time: Option<String>,
            #[serde(default)]
            description: Option<String>,
        }

        let args: Args = parse_args(ToolName::UpdateCalendarEvent, args)?;
        let calendar_id = args
            .calendar_id
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());

        let patch = EventPatch {
            summary: args.summary,
            start_time: args.start_time,
            end_time: args.end_time,
            description: args.description,
        };

        // Read-modify-write; a concurrent edit between the two calls loses
        let existing = self.calendar.get_event(&calendar_id, &args.event_id).await?;
        let merged = merge_event(existing, &patch);
        let updated = self
            .calendar
            .update_event(&calendar_id, &args.event_id, &merged)
            .await?;

        Ok(json!({
            "success": true,
            "event_id": updated.id,
            "updated": updated.updated,
        }))
    }

    async fn handle_delete_event(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            event_id: String,
            #[serde(default)]
            calendar_id: Option<String>,
        }

        let args: Args = parse_args(ToolName::DeleteCalendarEvent, args)?;
        let calendar_id = args
            .calendar_id
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());

        self.calendar
            .delete_event(&calendar_id, &args.event_id)
            .await?;

        Ok(json!({
            "success": true,
            "message": format!("Event {} gelöscht", args.event_id),
        }))
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(tool: ToolName, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| {
        GoogleMcpError::Validation(ValidationError::InvalidArguments {
            tool: tool.as_str().to_string(),
            message: e.to_string(),
        })
    })
}

// ==================== Schema Definitions ====================

fn tool_def(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

fn email_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "to": {
                "type": "string",
                "description": "Empfänger Email"
            },
            "subject": {
                "type": "string",
                "description": "Betreff"
            },
            "body": {
                "type": "string",
                "description": "Email Text"
            },
            "cc": {
                "type": "string",
                "description": "CC Empfänger (optional)"
            }
        },
        "required": ["to", "subject", "body"]
    })
}

fn create_event_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "Event Titel"
            },
            "start_time": {
                "type": "string",
                "description": "Start (ISO 8601, z.B. 2025-10-10T10:00:00)"
            },
            "end_time": {
                "type": "string",
                "description": "Ende (ISO 8601)"
            },
            "description": {
                "type": "string",
                "description": "Beschreibung (optional)"
            },
            "location": {
                "type": "string",
                "description": "Ort (optional)"
            },
            "attendees": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Teilnehmer Emails (optional)"
            },
            "calendar_id": {
                "type": "string",
                "description": "Calendar ID (default: primary)"
            }
        },
        "required": ["summary", "start_time", "end_time"]
    })
}

fn update_event_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "event_id": {
                "type": "string",
                "description": "Event ID"
            },
            "calendar_id": {
                "type": "string",
                "description": "Calendar ID (default: primary)"
            },
            "summary": {
                "type": "string",
                "description": "Neuer Titel (optional)"
            },
            "start_time": {
                "type": "string",
                "description": "Neue Startzeit (optional)"
            },
            "end_time": {
                "type": "string",
                "description": "Neue Endzeit (optional)"
            },
            "description": {
                "type": "string",
                "description": "Neue Beschreibung (optional)"
            }
        },
        "required": ["event_id"]
    })
}

fn delete_event_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "event_id": {
                "type": "string",
                "description": "Event ID"
            },
            "calendar_id": {
                "type": "string",
                "description": "Calendar ID (default: primary)"
            }
        },
        "required": ["event_id"]
    })
}
