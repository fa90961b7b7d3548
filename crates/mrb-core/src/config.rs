use std::{env, fs, path::Path};

use crate::{domain::ChatId, errors::Error, Result};

pub const DEFAULT_NO_CAPTION_MARKER: &str = "(no caption)";
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// How approved suggestions are attributed in the public channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PublishStyle {
    /// `Suggested by Alice (@alice)\n\n<content>`
    #[default]
    SuggestedBy,
    /// `Alice (@alice):\n\n<content>`
    Attribution,
}

impl PublishStyle {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "suggested_by" | "suggested-by" => Some(Self::SuggestedBy),
            "attribution" | "plain" => Some(Self::Attribution),
            _ => None,
        }
    }
}

/// Which workflow the bot runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayMode {
    /// Forward suggestions verbatim to the admin group; nothing is published.
    ForwardOnly,
    /// Post suggestions with approve/reject buttons and publish approved ones.
    Review { channel_id: ChatId },
}

/// Typed configuration, read from the environment (and `.env` when present).
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub admin_group_id: ChatId,
    pub mode: RelayMode,
    pub publish_style: PublishStyle,
    pub no_caption_marker: String,
    pub inbox_capacity: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process env in `load`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = lookup("BOT_TOKEN").and_then(non_empty).ok_or_else(|| {
            Error::Config("BOT_TOKEN environment variable is required".to_string())
        })?;

        let admin_group_id = lookup("ADMIN_GROUP_ID")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("ADMIN_GROUP_ID environment variable is required".to_string())
            })
            .and_then(|raw| parse_chat_id("ADMIN_GROUP_ID", &raw))?;

        let mode = match lookup("CHANNEL_ID").and_then(non_empty) {
            Some(raw) => RelayMode::Review {
                channel_id: parse_chat_id("CHANNEL_ID", &raw)?,
            },
            None => RelayMode::ForwardOnly,
        };

        let publish_style = match lookup("PUBLISH_STYLE").and_then(non_empty) {
            Some(raw) => PublishStyle::parse(&raw).ok_or_else(|| {
                Error::Config(format!(
                    "PUBLISH_STYLE must be `suggested_by` or `attribution`, got `{raw}`"
                ))
            })?,
            None => PublishStyle::default(),
        };

        let no_caption_marker = lookup("NO_CAPTION_MARKER")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_NO_CAPTION_MARKER.to_string());

        let inbox_capacity = match lookup("INBOX_CAPACITY").and_then(non_empty) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "INBOX_CAPACITY must be a positive integer, got `{raw}`"
                    ))
                })?,
            None => DEFAULT_INBOX_CAPACITY,
        };

        Ok(Self {
            bot_token,
            admin_group_id,
            mode,
            publish_style,
            no_caption_marker,
            inbox_capacity,
        })
    }
}

fn parse_chat_id(key: &str, raw: &str) -> Result<ChatId> {
    raw.trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| Error::Config(format!("{key} must be a numeric chat id, got `{raw}`")))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = &val[1..val.len() - 1];
        }

        out.push((key.to_string(), val.to_string()));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
