use std::sync::Arc;

use mrb_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), mrb_core::Error> {
    mrb_core::logging::init("mrb")?;

    let cfg = Arc::new(Config::load()?);

    mrb_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| mrb_core::Error::Transport(format!("telegram bot failed: {e}")))?;

    Ok(())
}
