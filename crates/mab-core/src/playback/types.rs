use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::{
    domain::{ChatContext, SessionKey},
    errors::CommandError,
    session,
};

/// A validated request to start playback in a chat's session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayRequest {
    pub query: String,
    pub session: SessionKey,
    pub video: bool,
}

impl PlayRequest {
    /// Gate and build a play request.
    ///
    /// Empty queries are rejected first, then private chats, then chats without
    /// a resolvable session.
    pub fn for_chat(ctx: &ChatContext, query: &str, video: bool) -> Result<Self, CommandError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CommandError::MissingArgument);
        }
        if ctx.chat_kind.is_private() {
            return Err(CommandError::UnsupportedChatKind);
        }
        let session = session::resolve(ctx)?;
        Ok(Self {
            query: query.to_string(),
            session,
            video,
        })
    }
}

/// Reply to a play request. Fields beyond `success` and `duration` are kept
/// opaque in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PlayResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Point-in-time read of a session's playback state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct QueueSnapshot {
    #[serde(default)]
    pub current_song: Option<Song>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub queued_songs: Vec<Song>,
}

impl QueueSnapshot {
    pub fn is_idle(&self) -> bool {
        self.current_song.is_none() && self.queued_songs.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Song {
    #[serde(default, deserialize_with = "lenient_title")]
    pub title: String,
    #[serde(default, rename = "duration", deserialize_with = "lenient_seconds")]
    pub duration_seconds: u64,
    #[serde(default, rename = "started_at", deserialize_with = "lenient_epoch")]
    pub started_at_epoch_seconds: Option<i64>,
}

/// Reply to a skip request.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SkipResult {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl SkipResult {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

fn null_as_empty<'de, D>(de: D) -> Result<Vec<Song>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Song>>::deserialize(de)?.unwrap_or_default())
}

/// Strings verbatim, `null` as empty, any other JSON value as its text.
fn lenient_title<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Whole seconds from an integer or float JSON number; anything else is 0.
fn lenient_seconds<'de, D>(de: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f.floor() as u64))
            .unwrap_or(0),
        _ => 0,
    })
}

fn lenient_epoch<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(match v {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64)),
        _ => None,
    })
}
