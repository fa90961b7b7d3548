use crate::{
    domain::{ChatId, MessageRef, UserId},
    submission::{Payload, Submitter},
};

/// Cross-messenger incoming update model.
///
/// Telegram-specific fields live in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    PrivateMessage(PrivateMessage),
    Callback(CallbackQuery),
}

#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub name: String,
}

/// A non-command message sent to the bot in a private chat.
#[derive(Clone, Debug)]
pub struct PrivateMessage {
    pub message: MessageRef,
    pub sender: Submitter,
    /// `None` when the content type cannot be relayed (stickers, voice, polls...).
    pub payload: Option<Payload>,
    /// Set when the message is one item of an album sent in one go.
    pub media_group_id: Option<String>,
}

/// A press on an inline button.
#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub callback_id: String,
    pub user_id: UserId,
    pub presser: String,
    pub data: String,
    /// The message the button is attached to, if Telegram still has it.
    pub message: Option<MessageRef>,
}

/// Inline keyboard attached to a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

impl InlineKeyboard {
    /// All buttons side by side.
    pub fn single_row(buttons: Vec<InlineButton>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

/// Capabilities / limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_message_len: usize,
    pub max_caption_len: usize,
}
