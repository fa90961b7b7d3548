use teloxide::types::CallbackQuery;

use mrb_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::{self, IncomingUpdate},
    submission::display_name,
};

/// Every press is forwarded, even unparseable ones, so the core can answer it.
pub(super) fn convert_callback(q: &CallbackQuery) -> IncomingUpdate {
    let message = q
        .message
        .as_ref()
        .map(|m| MessageRef::new(ChatId(m.chat.id.0), MessageId(m.id.0)));

    IncomingUpdate::Callback(types::CallbackQuery {
        callback_id: q.id.clone(),
        user_id: UserId(q.from.id.0 as i64),
        presser: display_name(&q.from.full_name(), q.from.username.as_deref()),
        data: q.data.clone().unwrap_or_default(),
        message,
    })
}
