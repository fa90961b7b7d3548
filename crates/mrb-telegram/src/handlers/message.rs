use teloxide::types::Message;

use mrb_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::{IncomingUpdate, PrivateMessage},
    submission::{Payload, Submitter},
};

use super::commands;

/// Convert a Telegram message into an update for the relay loop.
///
/// Group chatter (including the admin group itself) is never a suggestion.
pub(super) fn convert_message(msg: &Message) -> Option<IncomingUpdate> {
    if !msg.chat.is_private() {
        return None;
    }

    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::convert_command(msg, text);
        }
    }

    convert_private_message(msg)
}

fn convert_private_message(msg: &Message) -> Option<IncomingUpdate> {
    let user = msg.from()?;
    let sender = Submitter::new(
        UserId(user.id.0 as i64),
        &user.full_name(),
        user.username.as_deref(),
    );

    Some(IncomingUpdate::PrivateMessage(PrivateMessage {
        message: MessageRef::new(ChatId(msg.chat.id.0), MessageId(msg.id.0)),
        sender,
        payload: payload_of(msg),
        media_group_id: msg.media_group_id().map(str::to_string),
    }))
}

/// Map the relayable content types; anything else yields `None`.
fn payload_of(msg: &Message) -> Option<Payload> {
    let caption = msg.caption().map(str::to_string);

    if let Some(text) = msg.text() {
        return Some(Payload::Text {
            text: text.to_string(),
        });
    }
    // Telegram sends several sizes of the same photo; the last is the largest.
    if let Some(best) = msg.photo().and_then(|sizes| sizes.last()) {
        return Some(Payload::Photo {
            file_id: best.file.id.clone(),
            caption,
        });
    }
    if let Some(video) = msg.video() {
        return Some(Payload::Video {
            file_id: video.file.id.clone(),
            caption,
        });
    }
    if let Some(doc) = msg.document() {
        return Some(Payload::Document {
            file_id: doc.file.id.clone(),
            caption,
        });
    }
    None
}
