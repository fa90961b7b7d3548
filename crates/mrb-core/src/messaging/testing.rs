use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MessagingCapabilities},
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SentKind {
    Text,
    Photo,
    Video,
    Document,
}

#[derive(Clone, Debug)]
pub struct Sent {
    pub kind: SentKind,
    pub chat_id: ChatId,
    pub file_id: Option<String>,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
    pub msg: MessageRef,
}

/// In-memory `MessagingPort` that records every call.
#[derive(Default)]
pub struct RecordingMessenger {
    next_id: Mutex<i32>,
    sent: Mutex<Vec<Sent>>,
    deleted: Mutex<Vec<MessageRef>>,
    forwarded: Mutex<Vec<(ChatId, MessageRef)>>,
    answers: Mutex<Vec<(String, Option<String>)>>,
    failing_chats: Mutex<Vec<ChatId>>,
    held_chat: Mutex<Option<(ChatId, Arc<Notify>)>>,
    fail_deletes: Mutex<bool>,
    caption_limit: Mutex<Option<usize>>,
}

impl RecordingMessenger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every send into `chat_id` fails with a transport error.
    pub fn fail_sends_to(&self, chat_id: ChatId) {
        self.failing_chats.lock().unwrap().push(chat_id);
    }

    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().unwrap() = true;
    }

    pub fn set_caption_limit(&self, limit: usize) {
        *self.caption_limit.lock().unwrap() = Some(limit);
    }

    /// Sends into `chat_id` block until the returned `Notify` fires.
    pub fn hold_sends_to(&self, chat_id: ChatId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.held_chat.lock().unwrap() = Some((chat_id, gate.clone()));
        gate
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.chat_id == chat_id)
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageRef> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn forwarded(&self) -> Vec<(ChatId, MessageRef)> {
        self.forwarded.lock().unwrap().clone()
    }

    pub fn answers(&self) -> Vec<(String, Option<String>)> {
        self.answers.lock().unwrap().clone()
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        if *guard == 0 {
            *guard = 100;
        }
        let id = *guard;
        *guard += 1;
        MessageRef::new(chat_id, MessageId(id))
    }

    async fn record(
        &self,
        kind: SentKind,
        chat_id: ChatId,
        file_id: Option<&str>,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        let gate = self
            .held_chat
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(c, _)| *c == chat_id)
            .map(|(_, g)| g.clone());
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing_chats.lock().unwrap().contains(&chat_id) {
            return Err(Error::Transport(format!("chat {} unavailable", chat_id.0)));
        }

        let msg = self.alloc(chat_id);
        self.sent.lock().unwrap().push(Sent {
            kind,
            chat_id,
            file_id: file_id.map(str::to_string),
            text: text.to_string(),
            keyboard,
            msg,
        });
        Ok(msg)
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 4096,
            max_caption_len: (*self.caption_limit.lock().unwrap()).unwrap_or(1024),
        }
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        self.record(SentKind::Text, chat_id, None, text, keyboard)
            .await
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        self.record(SentKind::Photo, chat_id, Some(file_id), caption, keyboard)
            .await
    }

    async fn send_video(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        self.record(SentKind::Video, chat_id, Some(file_id), caption, keyboard)
            .await
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        self.record(SentKind::Document, chat_id, Some(file_id), caption, keyboard)
            .await
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        if *self.fail_deletes.lock().unwrap() {
            return Err(Error::Transport("message can't be deleted".to_string()));
        }
        self.deleted.lock().unwrap().push(msg);
        Ok(())
    }

    async fn forward_message(&self, to: ChatId, msg: MessageRef) -> Result<MessageRef> {
        if self.failing_chats.lock().unwrap().contains(&to) {
            return Err(Error::Transport(format!("chat {} unavailable", to.0)));
        }
        self.forwarded.lock().unwrap().push((to, msg));
        Ok(self.alloc(to))
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.answers
            .lock()
            .unwrap()
            .push((callback_id.to_string(), text.map(str::to_string)));
        Ok(())
    }
}
