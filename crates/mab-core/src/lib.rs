//! Core domain + application logic for the music assistant bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the remote
//! playback service live behind ports (traits) implemented in adapter crates.

pub mod command;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod playback;
pub mod router;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use errors::{CommandError, Error, PlaybackError, Result};
