//! In-memory fakes of the messaging and playback ports.
//!
//! Both record every call so tests can assert on exactly what reached the
//! chat and the remote service.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicI32, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ChatId, MessageId, MessageRef, SessionKey},
    errors::{Error, PlaybackError},
    messaging::port::MessagingPort,
    playback::{
        port::PlaybackService,
        types::{PlayRequest, PlayResult, QueueSnapshot, SkipResult},
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    Text {
        message: MessageRef,
        text: String,
    },
    Edit {
        message: MessageRef,
        text: String,
    },
    Photo {
        message: MessageRef,
        path: PathBuf,
        caption: String,
    },
}

impl Outbound {
    pub fn text(&self) -> &str {
        match self {
            Outbound::Text { text, .. } | Outbound::Edit { text, .. } => text,
            Outbound::Photo { caption, .. } => caption,
        }
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Outbound>>,
    next_id: AtomicI32,
    fail_photos: bool,
    fail_sends: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Photo uploads fail with an external error.
    pub fn failing_photos(mut self) -> Self {
        self.fail_photos = true;
        self
    }

    /// Every `send_text` fails with an external error.
    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub async fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().await.clone()
    }

    fn next_ref(&self, chat_id: ChatId) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
        }
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        if self.fail_sends {
            return Err(Error::External("send_text refused".to_string()));
        }
        let message = self.next_ref(chat_id);
        self.sent.lock().await.push(Outbound::Text {
            message,
            text: text.to_string(),
        });
        Ok(message)
    }

    async fn edit_text(&self, message: MessageRef, text: &str) -> Result<()> {
        self.sent.lock().await.push(Outbound::Edit {
            message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_photo(&self, chat_id: ChatId, path: &Path, caption: &str) -> Result<MessageRef> {
        if self.fail_photos {
            return Err(Error::External("photo upload refused".to_string()));
        }
        let message = self.next_ref(chat_id);
        self.sent.lock().await.push(Outbound::Photo {
            message,
            path: path.to_path_buf(),
            caption: caption.to_string(),
        });
        Ok(message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaybackCall {
    Play(PlayRequest),
    Queue(SessionKey),
    Skip(SessionKey),
}

/// Playback service returning canned responses.
pub struct ScriptedPlayback {
    calls: Mutex<Vec<PlaybackCall>>,
    play: std::result::Result<PlayResult, PlaybackError>,
    queue: std::result::Result<QueueSnapshot, PlaybackError>,
    skip: std::result::Result<SkipResult, PlaybackError>,
}

impl Default for ScriptedPlayback {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            play: Ok(PlayResult {
                success: true,
                ..Default::default()
            }),
            queue: Ok(QueueSnapshot::default()),
            skip: Ok(SkipResult {
                status: "success".to_string(),
                message: None,
            }),
        }
    }
}

impl ScriptedPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_play(mut self, play: std::result::Result<PlayResult, PlaybackError>) -> Self {
        self.play = play;
        self
    }

    pub fn with_queue(mut self, queue: std::result::Result<QueueSnapshot, PlaybackError>) -> Self {
        self.queue = queue;
        self
    }

    pub fn with_skip(mut self, skip: std::result::Result<SkipResult, PlaybackError>) -> Self {
        self.skip = skip;
        self
    }

    pub async fn calls(&self) -> Vec<PlaybackCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl PlaybackService for ScriptedPlayback {
    async fn play(&self, req: &PlayRequest) -> std::result::Result<PlayResult, PlaybackError> {
        self.calls.lock().await.push(PlaybackCall::Play(req.clone()));
        self.play.clone()
    }

    async fn get_queue(
        &self,
        session: &SessionKey,
    ) -> std::result::Result<QueueSnapshot, PlaybackError> {
        self.calls
            .lock()
            .await
            .push(PlaybackCall::Queue(session.clone()));
        self.queue.clone()
    }

    async fn skip(&self, session: &SessionKey) -> std::result::Result<SkipResult, PlaybackError> {
        self.calls
            .lock()
            .await
            .push(PlaybackCall::Skip(session.clone()));
        self.skip.clone()
    }
}
