//! Telegram update handlers.
//!
//! Each handler only converts a teloxide update into an `IncomingUpdate` and
//! enqueues it; all decisions happen in the core's `RelayBot` loop.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use mrb_core::messaging::types::IncomingUpdate;

use crate::router::AppState;

mod callback;
mod commands;
mod message;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    enqueue(&state, callback::convert_callback(&q)).await;
    Ok(())
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(update) = message::convert_message(&msg) {
        enqueue(&state, update).await;
    }
    Ok(())
}

async fn enqueue(state: &AppState, update: IncomingUpdate) {
    if let Err(e) = state.inbox.send(update).await {
        tracing::error!(error = %e, "relay loop is gone; dropping update");
    }
}
