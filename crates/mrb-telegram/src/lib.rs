//! Telegram adapter (teloxide).
//!
//! This crate implements the `mrb-core` MessagingPort over the Telegram Bot API
//! and feeds Telegram updates into the core's event loop.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile},
};

pub mod handlers;
pub mod router;

use mrb_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MessagingCapabilities},
    },
    Result,
};

/// Telegram caps media captions at 1024 characters and messages at 4096.
const MAX_CAPTION_LEN: usize = 1024;
const MAX_MESSAGE_LEN: usize = 4096;

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn msg_ref(msg: &Message) -> MessageRef {
        MessageRef::new(ChatId(msg.chat.id.0), MessageId(msg.id.0))
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Transport(format!("telegram error: {e}"))
    }

    fn markup(keyboard: InlineKeyboard) -> InlineKeyboardMarkup {
        let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|b| InlineKeyboardButton::callback(b.label, b.callback_data))
                    .collect()
            })
            .collect();
        InlineKeyboardMarkup::new(rows)
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: MAX_MESSAGE_LEN,
            max_caption_len: MAX_CAPTION_LEN,
        }
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        let mut req = self.bot.send_message(Self::tg_chat(chat_id), text.to_string());
        if let Some(k) = keyboard {
            req = req.reply_markup(Self::markup(k));
        }
        let msg = req.await.map_err(Self::map_err)?;
        Ok(Self::msg_ref(&msg))
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        let mut req = self
            .bot
            .send_photo(Self::tg_chat(chat_id), InputFile::file_id(file_id))
            .caption(caption.to_string());
        if let Some(k) = keyboard {
            req = req.reply_markup(Self::markup(k));
        }
        let msg = req.await.map_err(Self::map_err)?;
        Ok(Self::msg_ref(&msg))
    }

    async fn send_video(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        let mut req = self
            .bot
            .send_video(Self::tg_chat(chat_id), InputFile::file_id(file_id))
            .caption(caption.to_string());
        if let Some(k) = keyboard {
            req = req.reply_markup(Self::markup(k));
        }
        let msg = req.await.map_err(Self::map_err)?;
        Ok(Self::msg_ref(&msg))
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        let mut req = self
            .bot
            .send_document(Self::tg_chat(chat_id), InputFile::file_id(file_id))
            .caption(caption.to_string());
        if let Some(k) = keyboard {
            req = req.reply_markup(Self::markup(k));
        }
        let msg = req.await.map_err(Self::map_err)?;
        Ok(Self::msg_ref(&msg))
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.bot
            .delete_message(Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg.message_id))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn forward_message(&self, to: ChatId, msg: MessageRef) -> Result<MessageRef> {
        let forwarded = self
            .bot
            .forward_message(
                Self::tg_chat(to),
                Self::tg_chat(msg.chat_id),
                Self::tg_msg_id(msg.message_id),
            )
            .await
            .map_err(Self::map_err)?;
        Ok(Self::msg_ref(&forwarded))
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let mut req = self.bot.answer_callback_query(callback_id.to_string());
        if let Some(t) = text {
            req = req.text(t.to_string());
        }
        req.await.map_err(Self::map_err)?;
        Ok(())
    }
}
