//! Rendering of playback service payloads into chat text.
//!
//! Everything here is pure: same input, same output.

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;

use crate::playback::types::{PlayResult, QueueSnapshot, SkipResult, Song};

pub const WELCOME_TEXT: &str = "🎵 Welcome to Music Assistant!

Use /play <song name> to start playing music
Current supported platforms:
- YouTube
- Spotify (Coming soon)

Type /help to see all available commands";

pub const HELP_TEXT: &str = "Available commands:
/play <song name> - Play a song
/pause - Pause current song (In progress)
/resume - Resume playback (In progress)
/skip - Skip to next song
/stop - Stop playback (In progress)
/status - Show current playing song";

pub const PAUSED_TEXT: &str = "⏸ Playback paused";
pub const RESUMED_TEXT: &str = "▶️ Playback resumed";
pub const STOPPED_TEXT: &str = "⏹ Playback stopped";

pub const PLAY_PROCESSING_TEXT: &str = "🎵 Processing your request...";
pub const PLAY_MISSING_QUERY_TEXT: &str = "Please provide a song name. Usage: /play <song name>";
pub const PLAY_PRIVATE_CHAT_TEXT: &str = "This action is not supported in private chats. Please use this command in a group or supergroup.";
pub const PLAY_REJECTED_TEXT: &str = "❌ Failed to play song. Please try again.";
pub const PLAY_FAILED_TEXT: &str =
    "An error occurred while processing your request. Please try again.";

pub const STATUS_FAILED_TEXT: &str =
    "An error occurred while fetching the queue status. Please try again.";

pub const SKIP_SUCCESS_TEXT: &str = "⏭ Skipped the current song.";
pub const SKIP_FAILED_TEXT: &str =
    "An error occurred while trying to skip the song. Please try again.";

pub const MISSING_SESSION_TEXT: &str =
    "This chat has no public username, so its playback session cannot be found.";

const NOT_PLAYING_TEXT: &str = "No songs are currently playing.";
const NOTHING_QUEUED_TEXT: &str = "No songs are currently queued.";

/// Who a rendered song is attributed to.
///
/// The current song is credited to whoever asked for the status; queued songs
/// are credited to the chat handle.
#[derive(Clone, Copy, Debug)]
pub struct Attribution<'a> {
    pub current: &'a str,
    pub queued: &'a str,
}

/// `m:ss`, minutes unbounded.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Wall-clock `HH:MM:SS` of a unix timestamp in the given offset.
pub fn format_clock_time(epoch_seconds: i64, offset: &FixedOffset) -> Option<String> {
    let utc = DateTime::<Utc>::from_timestamp(epoch_seconds, 0)?;
    Some(utc.with_timezone(offset).format("%H:%M:%S").to_string())
}

fn song_block(song: &Song, by: &str, offset: Option<&FixedOffset>) -> String {
    let mut block = format!(
        "✨ Title : {}\nDuration : {}\n",
        song.title,
        format_duration(song.duration_seconds)
    );
    if let (Some(offset), Some(ts)) = (offset, song.started_at_epoch_seconds) {
        if let Some(clock) = format_clock_time(ts, offset) {
            block.push_str(&format!("Started : {clock}\n"));
        }
    }
    block.push_str(&format!("By : {by}"));
    block
}

/// Render a queue snapshot. Never returns an empty string.
pub fn render_queue(
    snapshot: &QueueSnapshot,
    who: Attribution<'_>,
    offset: &FixedOffset,
) -> String {
    let mut sections: Vec<String> = Vec::new();

    match &snapshot.current_song {
        Some(song) => sections.push(format!(
            "Streaming :\n\n{}",
            song_block(song, who.current, Some(offset))
        )),
        None => sections.push(NOT_PLAYING_TEXT.to_string()),
    }

    if snapshot.queued_songs.is_empty() {
        sections.push(NOTHING_QUEUED_TEXT.to_string());
    } else {
        let blocks = snapshot
            .queued_songs
            .iter()
            .map(|s| song_block(s, who.queued, None))
            .collect::<Vec<_>>()
            .join("\n\n");
        sections.push(format!("Queued :\n\n{blocks}"));
    }

    sections.join("\n\n")
}

/// Duration as reported by the service, or `Unknown` when it is absent or falsy.
fn reported_duration(duration: Option<&Value>) -> String {
    match duration {
        None | Some(Value::Null) | Some(Value::Bool(false)) => "Unknown".to_string(),
        Some(Value::String(s)) if s.is_empty() => "Unknown".to_string(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => "Unknown".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Confirmation for a successful play request.
pub fn render_play(query: &str, result: &PlayResult) -> String {
    format!(
        "🎵 Now playing: {query}\nDuration: {}",
        reported_duration(result.duration.as_ref())
    )
}

pub fn render_skip(result: &SkipResult) -> String {
    if result.is_success() {
        return SKIP_SUCCESS_TEXT.to_string();
    }
    let detail = result
        .message
        .as_deref()
        .unwrap_or(result.status.as_str());
    format!("❌ {detail}")
}
