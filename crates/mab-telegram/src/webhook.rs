//! Inbound webhook: one Telegram update per request, always acknowledged.
//!
//! The response is `200 OK` no matter what happened while processing, so
//! Telegram never redelivers an update because of a bot-side failure.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use teloxide::types::Update;
use tracing::{error, warn};

use crate::{handlers, router::AppState};

pub fn app(state: Arc<AppState>, path: &str) -> Router {
    Router::new()
        .route(path, post(handle_update))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

pub async fn handle_update(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let update = match serde_json::from_slice::<Update>(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(bytes = body.len(), "undecodable update body: {e}");
            return (StatusCode::OK, "OK");
        }
    };

    // Processing runs on its own task so even a panic stays contained.
    let update_id = update.id;
    let task = tokio::spawn(async move { handlers::process_update(&state, update).await });
    match task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(update_id, "error handling update: {e}"),
        Err(e) => error!(update_id, "update handler aborted: {e}"),
    }

    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use mab_core::{
        playback::types::{QueueSnapshot, Song},
        router::{CommandRouter, RouterConfig},
        testing::{PlaybackCall, RecordingMessenger, ScriptedPlayback},
    };
    use serde_json::json;

    use super::*;

    fn state(
        playback: ScriptedPlayback,
    ) -> (Arc<AppState>, Arc<ScriptedPlayback>, Arc<RecordingMessenger>) {
        let playback = Arc::new(playback);
        let messenger = Arc::new(RecordingMessenger::new());
        let router = CommandRouter::new(
            playback.clone(),
            messenger.clone(),
            RouterConfig::default(),
        );
        (Arc::new(AppState::new(Arc::new(router))), playback, messenger)
    }

    fn group_update(text: &str) -> Bytes {
        let body = json!({
            "update_id": 900001,
            "message": {
                "message_id": 77,
                "date": 1700000100,
                "chat": {
                    "id": -1001234567890i64,
                    "title": "Music Room",
                    "username": "musicroom",
                    "type": "supergroup"
                },
                "from": { "id": 4242, "is_bot": false, "first_name": "Alice" },
                "text": text,
                "entities": [{
                    "type": "bot_command",
                    "offset": 0,
                    "length": text.split(' ').next().unwrap_or("").len()
                }]
            }
        });
        Bytes::from(body.to_string())
    }

    fn private_update(text: &str) -> Bytes {
        let body = json!({
            "update_id": 900002,
            "message": {
                "message_id": 78,
                "date": 1700000100,
                "chat": { "id": 4242, "type": "private", "first_name": "Alice", "username": "alice" },
                "from": { "id": 4242, "is_bot": false, "first_name": "Alice" },
                "text": text
            }
        });
        Bytes::from(body.to_string())
    }

    #[tokio::test]
    async fn status_update_renders_queue() {
        let snapshot = QueueSnapshot {
            current_song: Some(Song {
                title: "Song A".to_string(),
                duration_seconds: 185,
                started_at_epoch_seconds: Some(chrono::Utc::now().timestamp()),
            }),
            queued_songs: vec![
                Song {
                    title: "Song B".to_string(),
                    duration_seconds: 200,
                    started_at_epoch_seconds: None,
                },
                Song {
                    title: "Song C".to_string(),
                    duration_seconds: 31,
                    started_at_epoch_seconds: None,
                },
            ],
        };
        let (state, playback, messenger) = state(ScriptedPlayback::new().with_queue(Ok(snapshot)));

        let (status, body) = handle_update(State(state), group_update("/status")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
        assert!(matches!(
            playback.calls().await.as_slice(),
            [PlaybackCall::Queue(key)] if key.as_str() == "musicroom"
        ));

        let sent = messenger.sent().await;
        assert_eq!(sent.len(), 1);
        let text = sent[0].text();
        assert!(text.contains("Song A"));
        assert!(text.contains("3:05"));
        assert!(text.contains("By : Alice"));
        let b = text.find("Song B").expect("Song B listed");
        let c = text.find("Song C").expect("Song C listed");
        assert!(b < c);
    }

    #[tokio::test]
    async fn unknown_command_is_acknowledged_without_side_effects() {
        let (state, playback, messenger) = state(ScriptedPlayback::new());

        let (status, body) = handle_update(State(state), group_update("/dance")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
        assert!(playback.calls().await.is_empty());
        assert!(messenger.sent().await.is_empty());
    }

    #[tokio::test]
    async fn private_play_is_rejected_and_acknowledged() {
        let (state, playback, messenger) = state(ScriptedPlayback::new());

        let (status, _) = handle_update(State(state), private_update("/play lofi")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(playback.calls().await.is_empty());
        let sent = messenger.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text().contains("not supported in private chats"));
    }

    #[tokio::test]
    async fn garbage_body_is_still_acknowledged() {
        let (state, playback, messenger) = state(ScriptedPlayback::new());

        for body in ["", "not json", "{\"update_id\": \"x\"}"] {
            let (status, text) =
                handle_update(State(state.clone()), Bytes::from(body.to_string())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(text, "OK");
        }
        assert!(playback.calls().await.is_empty());
        assert!(messenger.sent().await.is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_still_acknowledged() {
        let playback = Arc::new(ScriptedPlayback::new());
        let messenger = Arc::new(RecordingMessenger::new().failing_sends());
        let router = CommandRouter::new(playback.clone(), messenger, RouterConfig::default());
        let state = Arc::new(AppState::new(Arc::new(router)));

        let (status, _) = handle_update(State(state), group_update("/skip")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(playback.calls().await.len(), 1);
    }
}
