//! MIME message composition
//!
//! Builds the multipart/alternative messages that the Gmail API accepts in
//! its `raw` field.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

/// Input for composing an outgoing email
#[derive(Debug, Clone)]
pub struct EmailSpec {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub cc: Option<String>,
}

/// An encoded MIME message, ready for the Gmail API
#[derive(Debug, Clone)]
pub struct RawMessage(String);

impl RawMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Compose a multipart/alternative message from the given parts.
///
/// The plain text part carries the body verbatim; the HTML part is the same
/// text with every newline turned into a `<br>` tag. Header values are used
/// as given.
pub fn build_email(spec: &EmailSpec) -> RawMessage {
    let boundary = format!("----=_NextPart_{}", generate_boundary());
    let html_body = spec.body.replace('\n', "<br>\n");

    let mut lines = Vec::new();

    lines.push(format!("To: {}", spec.to));
    if let Some(ref cc) = spec.cc {
        lines.push(format!("Cc: {}", cc));
    }
    lines.push(format!("Subject: {}", spec.subject));
    lines.push("MIME-Version: 1.0".to_string());
    lines.push(format!(
        "Content-Type: multipart/alternative; boundary=\"{}\"",
        boundary
    ));
    lines.push(String::new());

    lines.push(format!("--{}", boundary));
    lines.push("Content-Type: text/plain; charset=UTF-8".to_string());
    lines.push("Content-Transfer-Encoding: 7bit".to_string());
    lines.push(String::new());
    lines.push(spec.body.clone());
    lines.push(String::new());

    lines.push(format!("--{}", boundary));
    lines.push("Content-Type: text/html; charset=UTF-8".to_string());
    lines.push("Content-Transfer-Encoding: 7bit".to_string());
    lines.push(String::new());
    lines.push(html_body);
    lines.push(String::new());

    lines.push(format!("--{}--", boundary));

    RawMessage(URL_SAFE_NO_PAD.encode(lines.join("\r\n")))
}

/// Generate a unique boundary string based on timestamp
fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{:x}", timestamp)
}
