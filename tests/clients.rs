//! HTTP client tests against mock Gmail and Calendar endpoints

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::Path;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use google_mcp_server::config::Config;
use google_mcp_server::error::{GoogleMcpError, UpstreamError};
use google_mcp_server::google::auth::Authenticator;
use google_mcp_server::google::calendar::{
    build_event, CalendarApi, CalendarClient, CalendarEventSpec,
};
use google_mcp_server::google::gmail::{GmailClient, MailApi};
use google_mcp_server::google::mail::{build_email, EmailSpec};

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some("Bearer cached-token")
}

async fn send_message(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if body["raw"].as_str().map(str::is_empty).unwrap_or(true) {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(json!({"id": "m-1", "threadId": "t-1"})))
}

async fn create_draft(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if body["message"]["raw"].as_str().map(str::is_empty).unwrap_or(true) {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(json!({"id": "d-1", "message": {"id": "m-2"}})))
}

async fn insert_event(
    Path(_calendar_id): Path<String>,
    headers: HeaderMap,
    Json(mut event): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    event["id"] = json!("created-1");
    event["htmlLink"] = json!("https://calendar.google.com/event?eid=xyz");
    Ok(Json(event))
}

async fn get_event(
    Path((_calendar_id, event_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if event_id == "missing" {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "id": event_id,
        "summary": "Standup",
        "etag": "\"5\"",
        "start": {"dateTime": "2025-10-10T10:00:00", "timeZone": "Europe/Berlin"},
        "end": {"dateTime": "2025-10-10T10:15:00", "timeZone": "Europe/Berlin"},
    })))
}

async fn update_event(
    Path((_calendar_id, event_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(mut event): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if event_id == "missing" {
        return Err(StatusCode::NOT_FOUND);
    }
    event["id"] = json!(event_id);
    event["updated"] = json!("2025-10-10T12:00:00.000Z");
    Ok(Json(event))
}

async fn delete_event(
    Path((_calendar_id, event_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if event_id == "missing" {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Serves mock Gmail and Calendar trees under one base URL
async fn start_api_server() -> String {
    let app = Router::new()
        .route("/gmail/users/me/messages/send", post(send_message))
        .route("/gmail/users/me/drafts", post(create_draft))
        .route("/calendar/calendars/:calendar_id/events", post(insert_event))
        .route(
            "/calendar/calendars/:calendar_id/events/:event_id",
            get(get_event).put(update_event).delete(delete_event),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Authenticator backed by a stored, unexpired token; any OAuth traffic
/// would hit an unroutable port and fail the test.
fn seeded_authenticator(dir: &TempDir) -> Arc<Authenticator> {
    let config = Config {
        config_dir: dir.path().to_path_buf(),
        token_path: dir.path().join("token.json"),
        credentials_path: dir.path().join("credentials.json"),
        device_auth_url: "http://127.0.0.1:9/device".to_string(),
        token_url: "http://127.0.0.1:9/token".to_string(),
        scopes: vec!["https://www.googleapis.com/auth/gmail.send".to_string()],
        device_poll_limit: None,
    };

    let expiry = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
        + 3600;
    let record = json!({
        "token": "cached-token",
        "refresh_token": "r1",
        "token_uri": config.token_url,
        "client_id": "cid",
        "client_secret": "cs",
        "scopes": config.scopes,
        "expiry": expiry,
    });
    std::fs::write(&config.token_path, record.to_string()).unwrap();

    Arc::new(Authenticator::new(config))
}

fn email() -> EmailSpec {
    EmailSpec {
        to: "anna@example.com".to_string(),
        subject: "Hallo".to_string(),
        body: "Text".to_string(),
        cc: None,
    }
}

fn event_spec() -> CalendarEventSpec {
    CalendarEventSpec {
        summary: "Planung".to_string(),
        start_time: "2025-10-10T10:00:00".to_string(),
        end_time: "2025-10-10T11:00:00".to_string(),
        description: None,
        location: None,
        attendees: None,
    }
}

#[tokio::test]
async fn gmail_client_sends_with_the_stored_token() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_api_server().await;
    let authenticator = seeded_authenticator(&dir);
    let gmail = GmailClient::with_base_url(authenticator, format!("{}/gmail", base));

    let sent = gmail.send_message(&build_email(&email())).await.unwrap();
    assert_eq!(sent.id, "m-1");
    assert_eq!(sent.thread_id, "t-1");
}

#[tokio::test]
async fn gmail_client_creates_drafts() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_api_server().await;
    let gmail = GmailClient::with_base_url(seeded_authenticator(&dir), format!("{}/gmail", base));

    let draft = gmail.create_draft(&build_email(&email())).await.unwrap();
    assert_eq!(draft.id, "d-1");
    assert_eq!(draft.message.id, "m-2");
}

#[tokio::test]
async fn calendar_client_round_trips_events() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_api_server().await;
    let calendar =
        CalendarClient::with_base_url(seeded_authenticator(&dir), format!("{}/calendar", base));

    let created = calendar
        .insert_event("primary", &build_event(&event_spec()))
        .await
        .unwrap();
    assert_eq!(created.id.as_deref(), Some("created-1"));
    assert_eq!(created.summary.as_deref(), Some("Planung"));
    assert!(created.html_link.is_some());
    // the payload crossed the wire in camelCase and came back intact
    assert_eq!(
        created.start.unwrap().time_zone.as_deref(),
        Some("Europe/Berlin")
    );

    let fetched = calendar.get_event("primary", "ev9").await.unwrap();
    assert_eq!(fetched.summary.as_deref(), Some("Standup"));
    assert_eq!(fetched.extra["etag"], "\"5\"");

    let updated = calendar
        .update_event("primary", "ev9", &fetched)
        .await
        .unwrap();
    assert_eq!(updated.id.as_deref(), Some("ev9"));
    assert_eq!(updated.updated.as_deref(), Some("2025-10-10T12:00:00.000Z"));
}

#[tokio::test]
async fn calendar_client_maps_404_to_event_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_api_server().await;
    let calendar =
        CalendarClient::with_base_url(seeded_authenticator(&dir), format!("{}/calendar", base));

    let error = calendar.get_event("primary", "missing").await.unwrap_err();
    match error {
        GoogleMcpError::Upstream(UpstreamError::EventNotFound { event_id }) => {
            assert_eq!(event_id, "missing");
        }
        other => panic!("unexpected error: {}", other),
    }

    let error = calendar
        .delete_event("primary", "missing")
        .await
        .unwrap_err();
    assert!(error.to_string().contains("Event not found: missing"));
}

#[tokio::test]
async fn calendar_client_treats_no_content_as_success() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_api_server().await;
    let calendar =
        CalendarClient::with_base_url(seeded_authenticator(&dir), format!("{}/calendar", base));

    calendar.delete_event("primary", "ev9").await.unwrap();
}
