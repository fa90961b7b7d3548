//! Core of the suggestion relay bot: submissions, the pending-review registry,
//! the relay and decision workflows, and the single-consumer event loop.
//!
//! This crate is framework-agnostic. Telegram lives behind `MessagingPort`,
//! implemented in `mrb-telegram`.

pub mod bot;
pub mod captions;
pub mod config;
pub mod decision;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod registry;
pub mod relay;
pub mod submission;

pub use errors::{Error, Result};
