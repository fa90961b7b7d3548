use chrono::{DateTime, Utc};

use crate::domain::{MessageRef, UserId};

/// Who sent a suggestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submitter {
    pub user_id: UserId,
    /// Full name plus ` (@handle)` when the user has one, e.g. `Alice (@alice)`.
    pub display_name: String,
}

impl Submitter {
    pub fn new(user_id: UserId, full_name: &str, username: Option<&str>) -> Self {
        Self {
            user_id,
            display_name: display_name(full_name, username),
        }
    }
}

pub fn display_name(full_name: &str, username: Option<&str>) -> String {
    let name = full_name.trim();
    let name = if name.is_empty() { "Anonymous" } else { name };
    match username.map(str::trim).filter(|u| !u.is_empty()) {
        Some(handle) => format!("{name} (@{handle})"),
        None => name.to_string(),
    }
}

/// The content of a suggestion. Media variants carry Telegram file ids, which
/// can be re-sent by the same bot without downloading anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    Text {
        text: String,
    },
    Photo {
        file_id: String,
        caption: Option<String>,
    },
    Video {
        file_id: String,
        caption: Option<String>,
    },
    Document {
        file_id: String,
        caption: Option<String>,
    },
}

impl Payload {
    /// Text body for `Text`, caption for media. Blank captions count as absent.
    pub fn body(&self) -> Option<&str> {
        let body = match self {
            Payload::Text { text } => Some(text.as_str()),
            Payload::Photo { caption, .. }
            | Payload::Video { caption, .. }
            | Payload::Document { caption, .. } => caption.as_deref(),
        };
        body.filter(|s| !s.trim().is_empty())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Text { .. } => "text",
            Payload::Photo { .. } => "photo",
            Payload::Video { .. } => "video",
            Payload::Document { .. } => "document",
        }
    }
}

/// One user's suggestion, immutable once received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// The private message the suggestion arrived in.
    pub origin: MessageRef,
    pub submitter: Submitter,
    pub payload: Payload,
    pub received_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(origin: MessageRef, submitter: Submitter, payload: Payload) -> Self {
        Self {
            origin,
            submitter,
            payload,
            received_at: Utc::now(),
        }
    }
}
