use crate::domain::MessageRef;

/// Core error type for the relay bot.
///
/// The Telegram adapter maps its request errors into `Transport` so the relay
/// and decision paths can react uniformly (skip registration vs keep cleaning up).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("no pending suggestion for review post {0}")]
    NotFound(MessageRef),

    #[error("review post {0} is already registered")]
    DuplicateKey(MessageRef),
}

pub type Result<T> = std::result::Result<T, Error>;
