use std::path::Path;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

/// Outbound side of the chat platform.
///
/// Replies are plain text; the router never relies on a parse mode.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Replace the text of a message this bot sent earlier.
    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()>;

    async fn send_photo(&self, chat_id: ChatId, path: &Path, caption: &str) -> Result<MessageRef>;
}
