//! Session identity: which remote playback session a chat addresses.

use crate::{
    domain::{ChatContext, SessionKey},
    errors::CommandError,
};

/// Derive the remote session key for a chat.
///
/// The playback service addresses sessions by the chat's public handle, so a
/// chat without one fails with `MissingSessionIdentity` instead of falling back
/// to the numeric chat id.
pub fn resolve(ctx: &ChatContext) -> Result<SessionKey, CommandError> {
    let handle = ctx
        .chat_handle
        .as_deref()
        .map(|h| h.trim().trim_start_matches('@'))
        .filter(|h| !h.is_empty())
        .ok_or(CommandError::MissingSessionIdentity)?;

    Ok(SessionKey::new(handle.to_string()))
}
