//! Messenger abstractions. Telegram is the only implementation; the core only
//! sees these types.

pub mod port;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;
