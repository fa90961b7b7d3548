use std::sync::Arc;

use crate::{
    captions::{review_caption, truncate_chars},
    decision::Verdict,
    domain::{ChatId, MessageRef},
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard},
    },
    registry::SubmissionRegistry,
    submission::{Payload, Submission},
    Result,
};

/// Approve / Reject buttons for one suggestion, tagged with its origin message id.
pub fn review_controls(origin: MessageRef) -> InlineKeyboard {
    InlineKeyboard::single_row(vec![
        InlineButton::new("✅ Approve", Verdict::Approve.callback_data(origin)),
        InlineButton::new("❌ Reject", Verdict::Reject.callback_data(origin)),
    ])
}

/// Send `payload` to `chat_id` as its native message type with `text` as the
/// message body (text) or caption (media), truncated to the messenger's limits.
pub async fn dispatch_payload(
    messenger: &dyn MessagingPort,
    chat_id: ChatId,
    payload: &Payload,
    text: &str,
    keyboard: Option<InlineKeyboard>,
) -> Result<MessageRef> {
    let caps = messenger.capabilities();
    match payload {
        Payload::Text { .. } => {
            let text = truncate_chars(text, caps.max_message_len);
            messenger.send_text(chat_id, &text, keyboard).await
        }
        Payload::Photo { file_id, .. } => {
            let caption = truncate_chars(text, caps.max_caption_len);
            messenger
                .send_photo(chat_id, file_id, &caption, keyboard)
                .await
        }
        Payload::Video { file_id, .. } => {
            let caption = truncate_chars(text, caps.max_caption_len);
            messenger
                .send_video(chat_id, file_id, &caption, keyboard)
                .await
        }
        Payload::Document { file_id, .. } => {
            let caption = truncate_chars(text, caps.max_caption_len);
            messenger
                .send_document(chat_id, file_id, &caption, keyboard)
                .await
        }
    }
}

/// Turns incoming suggestions into review posts in the admin group.
pub struct RelayEngine {
    messenger: Arc<dyn MessagingPort>,
    registry: Arc<SubmissionRegistry>,
    review_chat: ChatId,
    no_caption_marker: String,
}

impl RelayEngine {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        registry: Arc<SubmissionRegistry>,
        review_chat: ChatId,
        no_caption_marker: impl Into<String>,
    ) -> Self {
        Self {
            messenger,
            registry,
            review_chat,
            no_caption_marker: no_caption_marker.into(),
        }
    }

    /// Send the review post for `submission`. Nothing is registered here.
    pub async fn post_for_review(&self, submission: &Submission) -> Result<MessageRef> {
        let caption = review_caption(submission, &self.no_caption_marker);
        dispatch_payload(
            self.messenger.as_ref(),
            self.review_chat,
            &submission.payload,
            &caption,
            Some(review_controls(submission.origin)),
        )
        .await
    }

    /// Post `submission` for review and register it as pending.
    ///
    /// On `Err` the suggestion is not pending and the submitter must not be thanked.
    pub async fn submit(&self, submission: Submission) -> Result<MessageRef> {
        let review_post = self.post_for_review(&submission).await?;

        let kind = submission.payload.kind();
        let submitter = submission.submitter.display_name.clone();
        if let Err(e) = self.registry.put(review_post, submission) {
            // Buttons on an unregistered post could never resolve.
            if let Err(del) = self.messenger.delete_message(review_post).await {
                tracing::warn!(
                    review_post = %review_post,
                    error = %del,
                    "failed to delete orphaned review post"
                );
            }
            return Err(e);
        }

        tracing::info!(
            review_post = %review_post,
            kind,
            submitter = %submitter,
            pending = self.registry.len(),
            "suggestion posted for review"
        );
        Ok(review_post)
    }

    /// Forward-only flow: copy the user's message into the admin group as-is.
    pub async fn forward(&self, origin: MessageRef) -> Result<MessageRef> {
        let forwarded = self
            .messenger
            .forward_message(self.review_chat, origin)
            .await?;
        tracing::info!(origin = %origin, forwarded = %forwarded, "suggestion forwarded");
        Ok(forwarded)
    }
}
