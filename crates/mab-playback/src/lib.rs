//! Remote playback service adapter (HTTP).
//!
//! Implements the `mab-core` `PlaybackService` port over the service's REST API:
//! `POST /play_music/`, `GET /queue/{chat}`, `POST /skip/{chat}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::json;
use tracing::debug;

use mab_core::{
    domain::SessionKey,
    errors::{Error, PlaybackError},
    playback::{
        port::PlaybackService,
        types::{PlayRequest, PlayResult, QueueSnapshot, SkipResult},
    },
    Result,
};

#[derive(Clone, Debug)]
pub struct HttpPlaybackClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpPlaybackClient {
    /// `timeout` of `None` keeps the transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid playback service url {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "playback service url cannot be a base: {base_url}"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| Error::External(format!("http client build failed: {e}")))?;

        Ok(Self { base_url, http })
    }

    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, PlaybackError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PlaybackError::Transport(format!("bad base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> std::result::Result<T, PlaybackError> {
        debug!(
            method = method.as_str(),
            url = url.as_str(),
            "playback service request"
        );

        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PlaybackError::Transport(e.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PlaybackError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(PlaybackError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).chars().take(200).collect(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| PlaybackError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PlaybackService for HttpPlaybackClient {
    async fn play(&self, req: &PlayRequest) -> std::result::Result<PlayResult, PlaybackError> {
        let url = self.endpoint(&["play_music", ""])?;
        let body = json!({
            "query": req.query,
            "chat_username": req.session.as_str(),
            "video": req.video,
        });
        self.call(Method::POST, url, Some(body)).await
    }

    async fn get_queue(
        &self,
        session: &SessionKey,
    ) -> std::result::Result<QueueSnapshot, PlaybackError> {
        let url = self.endpoint(&["queue", session.as_str()])?;
        self.call(Method::GET, url, None).await
    }

    async fn skip(&self, session: &SessionKey) -> std::result::Result<SkipResult, PlaybackError> {
        let url = self.endpoint(&["skip", session.as_str()])?;
        self.call(Method::POST, url, None).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use anyhow::Result;
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use mab_core::{
        domain::{ChatContext, ChatId, ChatKind},
        session,
    };
    use serde_json::Value;
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Clone, Default)]
    struct MockState {
        play_bodies: Arc<Mutex<Vec<Value>>>,
        skip_calls: Arc<AtomicUsize>,
    }

    async fn handle_play(
        State(state): State<MockState>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        state.play_bodies.lock().await.push(body);
        Json(json!({ "success": true, "duration": 212, "video_id": "abc" }))
    }

    async fn handle_queue(Path(chat): Path<String>) -> (StatusCode, Json<Value>) {
        match chat.as_str() {
            "musicroom" => (
                StatusCode::OK,
                Json(json!({
                    "current_song": { "title": "Song A", "duration": 185, "started_at": 1700000000 },
                    "queued_songs": [
                        { "title": "Song B", "duration": 60 },
                        { "title": "Song C", "duration": 9 }
                    ]
                })),
            ),
            "idle" => (StatusCode::OK, Json(json!({}))),
            "garbled" => (StatusCode::OK, Json(json!(["not", "a", "queue"]))),
            _ => (StatusCode::NOT_FOUND, Json(json!({ "detail": "no session" }))),
        }
    }

    async fn handle_skip(
        State(state): State<MockState>,
        Path(chat): Path<String>,
    ) -> Json<Value> {
        state.skip_calls.fetch_add(1, Ordering::Relaxed);
        if chat == "musicroom" {
            Json(json!({ "status": "success" }))
        } else {
            Json(json!({ "status": "error", "message": "Nothing to skip" }))
        }
    }

    async fn spawn_mock_service() -> Result<Option<(String, MockState)>> {
        let state = MockState::default();
        let app = Router::new()
            .route("/play_music/", post(handle_play))
            .route("/queue/{chat}", get(handle_queue))
            .route("/skip/{chat}", post(handle_skip))
            .with_state(state.clone());

        let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
            Ok(listener) => listener,
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                eprintln!("skipping playback client tests: local socket bind is not permitted");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Some((format!("http://{addr}"), state)))
    }

    fn key(handle: &str) -> SessionKey {
        session::resolve(&ChatContext {
            chat_id: ChatId(-1),
            chat_handle: Some(handle.to_string()),
            chat_kind: ChatKind::Supergroup,
            requester_display_name: "Alice".to_string(),
        })
        .expect("handle present")
    }

    #[tokio::test]
    async fn play_posts_query_session_and_video_flag() -> Result<()> {
        let Some((base, state)) = spawn_mock_service().await? else {
            return Ok(());
        };
        let client = HttpPlaybackClient::new(&format!("{base}/"), None)?;

        let result = client
            .play(&PlayRequest {
                query: "lofi beats".to_string(),
                session: key("musicroom"),
                video: true,
            })
            .await?;

        assert!(result.success);
        assert_eq!(result.duration, Some(json!(212)));
        assert_eq!(result.extra.get("video_id"), Some(&json!("abc")));
        assert_eq!(
            state.play_bodies.lock().await.clone(),
            vec![json!({ "query": "lofi beats", "chat_username": "musicroom", "video": true })]
        );
        Ok(())
    }

    #[tokio::test]
    async fn get_queue_decodes_snapshot_in_order() -> Result<()> {
        let Some((base, _)) = spawn_mock_service().await? else {
            return Ok(());
        };
        let client = HttpPlaybackClient::new(&base, None)?;

        let snap = client.get_queue(&key("musicroom")).await?;
        let current = snap.current_song.expect("current song");
        assert_eq!(current.title, "Song A");
        assert_eq!(current.duration_seconds, 185);
        assert_eq!(current.started_at_epoch_seconds, Some(1_700_000_000));
        let titles: Vec<&str> = snap.queued_songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Song B", "Song C"]);

        let idle = client.get_queue(&key("idle")).await?;
        assert!(idle.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_and_garbage_are_errors() -> Result<()> {
        let Some((base, _)) = spawn_mock_service().await? else {
            return Ok(());
        };
        let client = HttpPlaybackClient::new(&base, None)?;

        let err = client.get_queue(&key("nobody")).await.unwrap_err();
        assert!(matches!(err, PlaybackError::Status { status: 404, .. }));

        let err = client.get_queue(&key("garbled")).await.unwrap_err();
        assert!(matches!(err, PlaybackError::Decode(_)));
        Ok(())
    }

    #[tokio::test]
    async fn skip_is_called_once_and_passes_status_through() -> Result<()> {
        let Some((base, state)) = spawn_mock_service().await? else {
            return Ok(());
        };
        let client = HttpPlaybackClient::new(&base, None)?;

        let ok = client.skip(&key("musicroom")).await?;
        assert!(ok.is_success());

        let busy = client.skip(&key("quietroom")).await?;
        assert_eq!(busy.status, "error");
        assert_eq!(busy.message.as_deref(), Some("Nothing to skip"));
        assert_eq!(state.skip_calls.load(Ordering::Relaxed), 2);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() -> Result<()> {
        let listener = match std::net::TcpListener::bind("127.0.0.1:0") {
            Ok(l) => l,
            Err(_) => return Ok(()),
        };
        let addr = listener.local_addr()?;
        drop(listener);

        let client = HttpPlaybackClient::new(&format!("http://{addr}"), None)?;
        let err = client.skip(&key("musicroom")).await.unwrap_err();
        assert!(matches!(err, PlaybackError::Transport(_)));
        Ok(())
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(HttpPlaybackClient::new("not a url", None).is_err());
        assert!(HttpPlaybackClient::new("mailto:someone@example.com", None).is_err());
    }

    #[test]
    fn builds_endpoints_under_base_path() {
        let client = HttpPlaybackClient::new("https://music.example.com/api/", None).unwrap();
        assert_eq!(
            client.endpoint(&["play_music", ""]).unwrap().as_str(),
            "https://music.example.com/api/play_music/"
        );
        assert_eq!(
            client.endpoint(&["queue", "room"]).unwrap().as_str(),
            "https://music.example.com/api/queue/room"
        );
    }
}
