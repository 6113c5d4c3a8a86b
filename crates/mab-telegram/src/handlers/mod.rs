//! Telegram update handlers.
//!
//! Each inbound message is reduced to a `ChatContext` plus its text and handed
//! to the core command router.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{Message, UpdateKind},
};
use tracing::{debug, error};

use crate::router::AppState;

mod context;

pub use context::chat_context;

/// Run one update through the command router.
pub async fn process_update(state: &AppState, update: Update) -> mab_core::Result<()> {
    match update.kind {
        UpdateKind::Message(msg) | UpdateKind::ChannelPost(msg) => {
            process_message(state, &msg).await
        }
        _ => {
            debug!(update_id = update.id, "ignoring non-message update");
            Ok(())
        }
    }
}

async fn process_message(state: &AppState, msg: &Message) -> mab_core::Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let ctx = chat_context(msg);
    state.router.dispatch(&ctx, text).await
}

/// Long-polling endpoint. Errors are logged; the dispatcher keeps going.
pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Err(e) = process_message(&state, &msg).await {
        error!(chat_id = msg.chat.id.0, "failed to handle message: {e}");
    }
    Ok(())
}
