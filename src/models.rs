use serde::{Deserialize, Serialize};

use crate::utils::title_case;

#[derive(Deserialize)]
pub struct GravatarParams {
    pub email: String,
}

#[derive(Deserialize)]
pub struct CodeFormatRequest {
    pub code: String,
}

#[derive(Serialize)]
pub struct CodeFormatResponse {
    pub code: String,
}

#[derive(Deserialize)]
pub struct MarkdownForm {
    pub md: String,
}

#[derive(Serialize)]
pub struct HtmlResponse {
    pub html: String,
}

#[derive(Deserialize)]
pub struct ChatExportRequest {
    pub title: String,
    pub messages: Vec<ChatMessage>,
}

/// One transcript entry. Every field is optional on the wire so a sloppy
/// client never makes the export fail.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Seconds since the epoch. Kept as raw JSON; see `utils::format_timestamp`.
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Role {
    #[default]
    User,
    Assistant,
    System,
    Other(String),
}

impl Role {
    pub fn label(&self) -> String {
        match self {
            Role::User => "User".to_string(),
            Role::Assistant => "Assistant".to_string(),
            Role::System => "System".to_string(),
            Role::Other(name) => title_case(name),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "system" => Role::System,
            _ => Role::Other(value),
        }
    }
}
