use teloxide::types::Message;

use mrb_core::{
    domain::{ChatId, UserId},
    messaging::types::{Command, IncomingUpdate},
};

/// Command name without the leading slash or `@botname` suffix, lowercased.
pub(super) fn parse_command(text: &str) -> String {
    // Telegram may send `/cmd@botname arg1 ...`
    let first = text.split_whitespace().next().unwrap_or("");

    first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

pub(super) fn convert_command(msg: &Message, text: &str) -> Option<IncomingUpdate> {
    let user = msg.from()?;
    let name = parse_command(text);
    if name.is_empty() {
        return None;
    }
    Some(IncomingUpdate::Command(Command {
        chat_id: ChatId(msg.chat.id.0),
        user_id: UserId(user.id.0 as i64),
        name,
    }))
}
