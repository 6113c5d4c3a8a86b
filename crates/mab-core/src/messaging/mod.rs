//! Cross-messenger abstractions (Telegram today).

pub mod port;
