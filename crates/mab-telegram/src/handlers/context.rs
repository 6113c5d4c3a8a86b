use teloxide::types::{Chat, Message};

use mab_core::domain::{ChatContext, ChatId, ChatKind};

fn chat_kind(chat: &Chat) -> ChatKind {
    if chat.is_private() {
        ChatKind::Private
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else if chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Group
    }
}

/// Build the per-update chat view.
///
/// The requester is the sender's first name; channel posts have no sender, so
/// they fall back to the chat title.
pub fn chat_context(msg: &Message) -> ChatContext {
    let requester_display_name = msg
        .from()
        .map(|u| u.first_name.clone())
        .or_else(|| msg.chat.title().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string());

    ChatContext {
        chat_id: ChatId(msg.chat.id.0),
        chat_handle: msg.chat.username().map(str::to_string),
        chat_kind: chat_kind(&msg.chat),
        requester_display_name,
    }
}
