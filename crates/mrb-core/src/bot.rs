use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use tokio::sync::mpsc;

use crate::{
    config::{Config, RelayMode},
    decision::{DecisionEvent, DecisionProcessor},
    domain::ChatId,
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate, PrivateMessage},
    },
    registry::SubmissionRegistry,
    relay::RelayEngine,
    submission::Submission,
};

pub const START_MESSAGE: &str =
    "Hi! Send me your suggestions and I'll forward them to the admins for review.";
pub const THANKS_MESSAGE: &str = "Thanks! Your suggestion has been sent to the admins for review.";
pub const DELIVERY_FAILED_MESSAGE: &str =
    "Sorry, your suggestion could not be delivered right now. Please try again later.";
pub const UNSUPPORTED_MESSAGE: &str =
    "Sorry, only text, photos, videos and documents can be suggested.";
pub const ACK_UNKNOWN_ACTION: &str = "Unknown action.";

/// How many recent album ids are remembered for thanking once per album.
const RECENT_ALBUMS: usize = 64;

/// Single consumer of inbound updates.
///
/// Updates are handled strictly one at a time in arrival order; the Telegram
/// dispatcher only converts and enqueues.
pub struct RelayBot {
    messenger: Arc<dyn MessagingPort>,
    registry: Arc<SubmissionRegistry>,
    relay: RelayEngine,
    /// `None` in forward-only mode.
    decisions: Option<DecisionProcessor>,
    /// Albums already thanked for, oldest first.
    thanked_albums: Mutex<VecDeque<String>>,
}

impl RelayBot {
    pub fn new(cfg: &Config, messenger: Arc<dyn MessagingPort>) -> Self {
        let registry = Arc::new(SubmissionRegistry::new());
        let relay = RelayEngine::new(
            messenger.clone(),
            registry.clone(),
            cfg.admin_group_id,
            cfg.no_caption_marker.clone(),
        );
        let decisions = match cfg.mode {
            RelayMode::Review { channel_id } => Some(DecisionProcessor::new(
                messenger.clone(),
                registry.clone(),
                cfg.admin_group_id,
                channel_id,
                cfg.publish_style,
            )),
            RelayMode::ForwardOnly => None,
        };

        Self {
            messenger,
            registry,
            relay,
            decisions,
            thanked_albums: Mutex::new(VecDeque::with_capacity(RECENT_ALBUMS)),
        }
    }

    pub fn registry(&self) -> &Arc<SubmissionRegistry> {
        &self.registry
    }

    /// Drain `inbox` until every sender is dropped.
    pub async fn run(self, mut inbox: mpsc::Receiver<IncomingUpdate>) {
        tracing::info!(
            review_flow = self.decisions.is_some(),
            "relay bot ready"
        );
        while let Some(update) = inbox.recv().await {
            self.handle(update).await;
        }
        tracing::info!(
            pending = self.registry.len(),
            "inbox closed; pending suggestions are dropped"
        );
    }

    pub async fn handle(&self, update: IncomingUpdate) {
        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::PrivateMessage(msg) => self.handle_private_message(msg).await,
            IncomingUpdate::Callback(q) => self.handle_callback(q).await,
        }
    }

    async fn handle_command(&self, cmd: Command) {
        match cmd.name.as_str() {
            "start" | "help" => self.reply(cmd.chat_id, START_MESSAGE).await,
            other => {
                tracing::debug!(command = other, user_id = cmd.user_id.0, "ignoring command")
            }
        }
    }

    async fn handle_private_message(&self, msg: PrivateMessage) {
        let chat_id = msg.message.chat_id;

        if self.decisions.is_none() {
            match self.relay.forward(msg.message).await {
                Ok(_) => self.thank(chat_id, msg.media_group_id.as_deref()).await,
                Err(e) => {
                    tracing::warn!(origin = %msg.message, error = %e, "failed to forward suggestion");
                    self.reply(chat_id, DELIVERY_FAILED_MESSAGE).await;
                }
            }
            return;
        }

        let Some(payload) = msg.payload else {
            self.reply(chat_id, UNSUPPORTED_MESSAGE).await;
            return;
        };

        let submission = Submission::new(msg.message, msg.sender, payload);
        match self.relay.submit(submission).await {
            Ok(_) => self.thank(chat_id, msg.media_group_id.as_deref()).await,
            Err(e @ Error::DuplicateKey(_)) => {
                tracing::error!(origin = %msg.message, error = %e, "review post id collision");
                self.reply(chat_id, DELIVERY_FAILED_MESSAGE).await;
            }
            Err(e) => {
                tracing::warn!(origin = %msg.message, error = %e, "failed to relay suggestion");
                self.reply(chat_id, DELIVERY_FAILED_MESSAGE).await;
            }
        }
    }

    async fn handle_callback(&self, q: CallbackQuery) {
        if let (Some(decisions), Some(event)) = (&self.decisions, DecisionEvent::from_callback(&q))
        {
            decisions.decide(event).await;
            return;
        }

        tracing::debug!(data = %q.data, user_id = q.user_id.0, "unrecognized callback");
        if let Err(e) = self
            .messenger
            .answer_callback_query(&q.callback_id, Some(ACK_UNKNOWN_ACTION))
            .await
        {
            tracing::warn!(callback_id = %q.callback_id, error = %e, "failed to answer callback");
        }
    }

    /// Thank the submitter once per message, or once per album for album items.
    async fn thank(&self, chat_id: ChatId, media_group_id: Option<&str>) {
        if let Some(album) = media_group_id {
            let mut recent = self
                .thanked_albums
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if recent.iter().any(|id| id == album) {
                tracing::debug!(album, "album already acknowledged");
                return;
            }
            if recent.len() == RECENT_ALBUMS {
                recent.pop_front();
            }
            recent.push_back(album.to_string());
        }
        self.reply(chat_id, THANKS_MESSAGE).await;
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.messenger.send_text(chat_id, text, None).await {
            tracing::warn!(chat_id = chat_id.0, error = %e, "failed to reply to user");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PublishStyle, DEFAULT_INBOX_CAPACITY};
    use crate::decision::{ACK_ALREADY_PROCESSED, ACK_PUBLISHED, ACK_REJECTED};
    use crate::domain::{MessageId, MessageRef, UserId};
    use crate::messaging::testing::{RecordingMessenger, SentKind};
    use crate::submission::{Payload, Submitter};

    const USER_CHAT: ChatId = ChatId(42);
    const ADMINS: ChatId = ChatId(-100);
    const CHANNEL: ChatId = ChatId(-200);

    fn config(mode: RelayMode) -> Config {
        Config {
            bot_token: "x".to_string(),
            admin_group_id: ADMINS,
            mode,
            publish_style: PublishStyle::SuggestedBy,
            no_caption_marker: "(no caption)".to_string(),
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }

    fn review_bot() -> (RelayBot, Arc<RecordingMessenger>) {
        let messenger = RecordingMessenger::new();
        let bot = RelayBot::new(
            &config(RelayMode::Review {
                channel_id: CHANNEL,
            }),
            messenger.clone(),
        );
        (bot, messenger)
    }

    fn private(id: i32, name: &str, handle: Option<&str>, payload: Option<Payload>) -> IncomingUpdate {
        IncomingUpdate::PrivateMessage(PrivateMessage {
            message: MessageRef::new(USER_CHAT, MessageId(id)),
            sender: Submitter::new(UserId(42), name, handle),
            payload,
            media_group_id: None,
        })
    }

    fn album_item(id: i32, album: &str, file_id: &str) -> IncomingUpdate {
        IncomingUpdate::PrivateMessage(PrivateMessage {
            message: MessageRef::new(USER_CHAT, MessageId(id)),
            sender: Submitter::new(UserId(42), "Alice", None),
            payload: Some(Payload::Photo {
                file_id: file_id.to_string(),
                caption: None,
            }),
            media_group_id: Some(album.to_string()),
        })
    }

    fn press(id: &str, data: String, review_post: MessageRef) -> IncomingUpdate {
        IncomingUpdate::Callback(CallbackQuery {
            callback_id: id.to_string(),
            user_id: UserId(5),
            presser: "mod".to_string(),
            data,
            message: Some(review_post),
        })
    }

    fn texts_to(messenger: &RecordingMessenger, chat_id: ChatId) -> Vec<String> {
        messenger
            .sent_to(chat_id)
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[tokio::test]
    async fn start_command_replies_with_usage() {
        let (bot, messenger) = review_bot();
        bot.handle(IncomingUpdate::Command(Command {
            chat_id: USER_CHAT,
            user_id: UserId(42),
            name: "start".to_string(),
        }))
        .await;
        assert_eq!(texts_to(&messenger, USER_CHAT), vec![START_MESSAGE]);
    }

    #[tokio::test]
    async fn text_suggestion_approved_end_to_end() {
        let (bot, messenger) = review_bot();

        bot.handle(private(
            7,
            "Alice",
            Some("alice"),
            Some(Payload::Text {
                text: "Buy more coffee".to_string(),
            }),
        ))
        .await;

        let review = messenger.sent_to(ADMINS);
        assert_eq!(review.len(), 1);
        assert_eq!(
            review[0].text,
            "Suggestion from Alice (@alice):\n\nBuy more coffee"
        );
        assert_eq!(texts_to(&messenger, USER_CHAT), vec![THANKS_MESSAGE]);
        assert_eq!(bot.registry().len(), 1);

        let approve = review[0].keyboard.as_ref().unwrap().rows[0][0]
            .callback_data
            .clone();
        bot.handle(press("cb", approve, review[0].msg)).await;

        assert_eq!(
            texts_to(&messenger, CHANNEL),
            vec!["Suggested by Alice (@alice)\n\nBuy more coffee"]
        );
        assert_eq!(messenger.deleted(), vec![review[0].msg]);
        assert!(bot.registry().is_empty());
        assert_eq!(
            messenger.answers(),
            vec![("cb".to_string(), Some(ACK_PUBLISHED.to_string()))]
        );
    }

    #[tokio::test]
    async fn photo_rejected_then_pressed_again() {
        let (bot, messenger) = review_bot();

        bot.handle(private(
            8,
            "Bob",
            None,
            Some(Payload::Photo {
                file_id: "ph".to_string(),
                caption: None,
            }),
        ))
        .await;
        let review = messenger.sent_to(ADMINS);
        assert_eq!(review[0].kind, SentKind::Photo);
        assert_eq!(review[0].text, "Suggestion from Bob:\n\n(no caption)");

        let reject = review[0].keyboard.as_ref().unwrap().rows[0][1]
            .callback_data
            .clone();
        bot.handle(press("r1", reject.clone(), review[0].msg)).await;
        bot.handle(press("r2", reject, review[0].msg)).await;

        assert!(messenger.sent_to(CHANNEL).is_empty());
        assert_eq!(messenger.deleted(), vec![review[0].msg]);
        assert_eq!(
            messenger.answers(),
            vec![
                ("r1".to_string(), Some(ACK_REJECTED.to_string())),
                ("r2".to_string(), Some(ACK_ALREADY_PROCESSED.to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn failed_relay_is_not_acknowledged_as_success() {
        let (bot, messenger) = review_bot();
        messenger.fail_sends_to(ADMINS);

        bot.handle(private(
            9,
            "Alice",
            None,
            Some(Payload::Text {
                text: "x".to_string(),
            }),
        ))
        .await;

        assert_eq!(texts_to(&messenger, USER_CHAT), vec![DELIVERY_FAILED_MESSAGE]);
        assert!(bot.registry().is_empty());
    }

    #[tokio::test]
    async fn unsupported_content_gets_a_notice() {
        let (bot, messenger) = review_bot();
        bot.handle(private(10, "Alice", None, None)).await;

        assert_eq!(texts_to(&messenger, USER_CHAT), vec![UNSUPPORTED_MESSAGE]);
        assert!(messenger.sent_to(ADMINS).is_empty());
    }

    #[tokio::test]
    async fn foreign_callbacks_are_answered() {
        let (bot, messenger) = review_bot();
        bot.handle(press(
            "cb",
            "askuser:1:2".to_string(),
            MessageRef::new(ADMINS, MessageId(1)),
        ))
        .await;
        assert_eq!(
            messenger.answers(),
            vec![("cb".to_string(), Some(ACK_UNKNOWN_ACTION.to_string()))]
        );
    }

    #[tokio::test]
    async fn press_without_message_is_unknown_action() {
        let (bot, messenger) = review_bot();
        bot.handle(IncomingUpdate::Callback(CallbackQuery {
            callback_id: "cb".to_string(),
            user_id: UserId(5),
            presser: "mod".to_string(),
            data: "approve:7".to_string(),
            message: None,
        }))
        .await;

        assert_eq!(
            messenger.answers(),
            vec![("cb".to_string(), Some(ACK_UNKNOWN_ACTION.to_string()))]
        );
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn album_is_relayed_per_item_and_thanked_once() {
        let (bot, messenger) = review_bot();

        bot.handle(album_item(20, "album-1", "p1")).await;
        bot.handle(album_item(21, "album-1", "p2")).await;
        bot.handle(album_item(22, "album-2", "p3")).await;

        let review: Vec<_> = messenger
            .sent_to(ADMINS)
            .into_iter()
            .map(|s| s.file_id.unwrap_or_default())
            .collect();
        assert_eq!(review, vec!["p1", "p2", "p3"]);
        assert_eq!(bot.registry().len(), 3);
        assert_eq!(
            texts_to(&messenger, USER_CHAT),
            vec![THANKS_MESSAGE, THANKS_MESSAGE]
        );
    }

    #[tokio::test]
    async fn forwarded_album_is_thanked_once() {
        let messenger = RecordingMessenger::new();
        let bot = RelayBot::new(&config(RelayMode::ForwardOnly), messenger.clone());

        bot.handle(album_item(30, "album-1", "p1")).await;
        bot.handle(album_item(31, "album-1", "p2")).await;

        assert_eq!(messenger.forwarded().len(), 2);
        assert_eq!(texts_to(&messenger, USER_CHAT), vec![THANKS_MESSAGE]);
    }

    #[tokio::test]
    async fn forward_only_mode_forwards_everything() {
        let messenger = RecordingMessenger::new();
        let bot = RelayBot::new(&config(RelayMode::ForwardOnly), messenger.clone());

        bot.handle(private(11, "Alice", None, None)).await;

        assert_eq!(
            messenger.forwarded(),
            vec![(ADMINS, MessageRef::new(USER_CHAT, MessageId(11)))]
        );
        assert_eq!(texts_to(&messenger, USER_CHAT), vec![THANKS_MESSAGE]);
        assert!(bot.registry().is_empty());

        bot.handle(press(
            "cb",
            "approve:11".to_string(),
            MessageRef::new(ADMINS, MessageId(100)),
        ))
        .await;
        assert_eq!(
            messenger.answers(),
            vec![("cb".to_string(), Some(ACK_UNKNOWN_ACTION.to_string()))]
        );
    }

    #[tokio::test]
    async fn run_drains_the_inbox_in_order() {
        let (bot, messenger) = review_bot();
        let (tx, rx) = mpsc::channel(DEFAULT_INBOX_CAPACITY);

        tx.send(private(
            1,
            "Alice",
            None,
            Some(Payload::Text {
                text: "first".to_string(),
            }),
        ))
        .await
        .unwrap();
        tx.send(private(
            2,
            "Alice",
            None,
            Some(Payload::Text {
                text: "second".to_string(),
            }),
        ))
        .await
        .unwrap();
        drop(tx);

        bot.run(rx).await;

        assert_eq!(
            texts_to(&messenger, ADMINS),
            vec![
                "Suggestion from Alice:\n\nfirst",
                "Suggestion from Alice:\n\nsecond"
            ]
        );
    }
}
