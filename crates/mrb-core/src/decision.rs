use std::sync::Arc;

use chrono::Utc;

use crate::{
    captions::publish_caption,
    config::PublishStyle,
    domain::{ChatId, MessageId, MessageRef},
    messaging::{port::MessagingPort, types::CallbackQuery},
    registry::SubmissionRegistry,
    relay::dispatch_payload,
};

pub const ACK_PUBLISHED: &str = "Approved and published.";
pub const ACK_PUBLISH_FAILED: &str = "Approved, but publishing failed. Check the logs.";
pub const ACK_REJECTED: &str = "Rejected.";
pub const ACK_ALREADY_PROCESSED: &str = "This suggestion has already been processed.";
pub const ACK_UNAUTHORIZED: &str = "Only the review group can decide on suggestions.";

/// A reviewer's decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    fn as_str(self) -> &'static str {
        match self {
            Verdict::Approve => "approve",
            Verdict::Reject => "reject",
        }
    }

    /// Button payload: `approve:<origin message id>` / `reject:<origin message id>`.
    pub fn callback_data(self, origin: MessageRef) -> String {
        format!("{}:{}", self.as_str(), origin.message_id.0)
    }

    pub fn parse_callback_data(data: &str) -> Option<(Verdict, MessageId)> {
        let (verb, id) = data.split_once(':')?;
        let verdict = match verb {
            "approve" => Verdict::Approve,
            "reject" => Verdict::Reject,
            _ => return None,
        };
        let id = id.trim().parse::<i32>().ok()?;
        Some((verdict, MessageId(id)))
    }
}

/// A press on one of the review controls.
#[derive(Clone, Debug)]
pub struct DecisionEvent {
    pub callback_id: String,
    pub review_post: MessageRef,
    pub verdict: Verdict,
    /// Message id of the suggestion as carried in the button payload.
    pub origin_message_id: MessageId,
    pub reviewer: String,
}

impl DecisionEvent {
    /// `None` if the press isn't a review control or its message is gone.
    pub fn from_callback(q: &CallbackQuery) -> Option<Self> {
        let review_post = q.message?;
        let (verdict, origin_message_id) = Verdict::parse_callback_data(&q.data)?;
        Some(Self {
            callback_id: q.callback_id.clone(),
            review_post,
            verdict,
            origin_message_id,
            reviewer: q.presser.clone(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionOutcome {
    Published(MessageRef),
    PublishFailed,
    Discarded,
    AlreadyProcessed,
    Unauthorized,
}

impl DecisionOutcome {
    fn ack_text(self) -> &'static str {
        match self {
            DecisionOutcome::Published(_) => ACK_PUBLISHED,
            DecisionOutcome::PublishFailed => ACK_PUBLISH_FAILED,
            DecisionOutcome::Discarded => ACK_REJECTED,
            DecisionOutcome::AlreadyProcessed => ACK_ALREADY_PROCESSED,
            DecisionOutcome::Unauthorized => ACK_UNAUTHORIZED,
        }
    }
}

/// Resolves pending suggestions: publish or discard, then retire the review post.
pub struct DecisionProcessor {
    messenger: Arc<dyn MessagingPort>,
    registry: Arc<SubmissionRegistry>,
    review_chat: ChatId,
    channel: ChatId,
    style: PublishStyle,
}

impl DecisionProcessor {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        registry: Arc<SubmissionRegistry>,
        review_chat: ChatId,
        channel: ChatId,
        style: PublishStyle,
    ) -> Self {
        Self {
            messenger,
            registry,
            review_chat,
            channel,
            style,
        }
    }

    /// Apply `event` and acknowledge the button press.
    ///
    /// The correlation is claimed with `take_if_present` before any I/O, so a
    /// concurrent second press on the same post always lands on `AlreadyProcessed`.
    pub async fn decide(&self, event: DecisionEvent) -> DecisionOutcome {
        let outcome = self.resolve(&event).await;
        if let Err(e) = self
            .messenger
            .answer_callback_query(&event.callback_id, Some(outcome.ack_text()))
            .await
        {
            tracing::warn!(callback_id = %event.callback_id, error = %e, "failed to answer decision callback");
        }
        outcome
    }

    async fn resolve(&self, event: &DecisionEvent) -> DecisionOutcome {
        if event.review_post.chat_id != self.review_chat {
            tracing::warn!(
                review_post = %event.review_post,
                reviewer = %event.reviewer,
                "decision from outside the review group ignored"
            );
            return DecisionOutcome::Unauthorized;
        }

        let Some(correlation) = self.registry.take_if_present(event.review_post) else {
            tracing::info!(
                review_post = %event.review_post,
                reviewer = %event.reviewer,
                "decision for a suggestion that is no longer pending"
            );
            return DecisionOutcome::AlreadyProcessed;
        };
        let submission = correlation.submission;

        if submission.origin.message_id != event.origin_message_id {
            tracing::warn!(
                review_post = %event.review_post,
                expected = submission.origin.message_id.0,
                got = event.origin_message_id.0,
                "button payload does not match the pending suggestion"
            );
        }

        let outcome = match event.verdict {
            Verdict::Approve => {
                let caption = publish_caption(&submission, self.style);
                match dispatch_payload(
                    self.messenger.as_ref(),
                    self.channel,
                    &submission.payload,
                    &caption,
                    None,
                )
                .await
                {
                    Ok(published) => DecisionOutcome::Published(published),
                    Err(e) => {
                        tracing::error!(
                            review_post = %event.review_post,
                            channel = self.channel.0,
                            error = %e,
                            "failed to publish approved suggestion"
                        );
                        DecisionOutcome::PublishFailed
                    }
                }
            }
            Verdict::Reject => DecisionOutcome::Discarded,
        };

        if let Err(e) = self.messenger.delete_message(event.review_post).await {
            tracing::warn!(review_post = %event.review_post, error = %e, "failed to delete review post");
        }

        let waited = Utc::now().signed_duration_since(submission.received_at);
        tracing::info!(
            review_post = %event.review_post,
            verdict = event.verdict.as_str(),
            reviewer = %event.reviewer,
            submitter = %submission.submitter.display_name,
            outcome = ?outcome,
            pending_secs = waited.num_seconds(),
            "suggestion resolved"
        );
        outcome
    }
}
