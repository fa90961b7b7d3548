use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tokio::sync::mpsc;

use mrb_core::{
    bot::RelayBot,
    config::{Config, RelayMode},
    messaging::{port::MessagingPort, types::IncomingUpdate},
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub inbox: mpsc::Sender<IncomingUpdate>,
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    // Basic startup info.
    let me = bot.get_me().await?;
    match cfg.mode {
        RelayMode::Review { channel_id } => tracing::info!(
            bot = me.username(),
            admin_group = cfg.admin_group_id.0,
            channel = channel_id.0,
            "started in review mode"
        ),
        RelayMode::ForwardOnly => tracing::info!(
            bot = me.username(),
            admin_group = cfg.admin_group_id.0,
            "started in forward-only mode (CHANNEL_ID not set)"
        ),
    }

    // Best-effort reachability check; a wrong id only shows up on the first suggestion otherwise.
    if let Err(e) = bot
        .get_chat(teloxide::types::ChatId(cfg.admin_group_id.0))
        .await
    {
        tracing::warn!(admin_group = cfg.admin_group_id.0, error = %e, "admin group is not reachable");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let (inbox, rx) = mpsc::channel(cfg.inbox_capacity);
    let relay = tokio::spawn(RelayBot::new(&cfg, messenger).run(rx));

    let state = Arc::new(AppState { inbox });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    // The dispatcher held the last sender; the relay loop drains and exits.
    relay.await?;
    Ok(())
}
