use std::{
    env, fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{FixedOffset, Local, Offset};

use crate::{errors::Error, Result};

/// How inbound Telegram updates reach the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotMode {
    /// Telegram POSTs updates to our HTTP endpoint.
    Webhook,
    /// We long-poll `getUpdates`.
    Polling,
}

/// Typed process configuration, loaded from the environment (and `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub playback_service_url: String,

    // Transport
    pub bot_mode: BotMode,
    pub listen_addr: SocketAddr,
    pub webhook_path: String,
    /// Public URL registered with Telegram on startup, if set.
    pub webhook_url: Option<String>,

    // Behavior
    pub welcome_image_path: Option<PathBuf>,
    pub play_video: bool,
    pub playback_timeout: Option<Duration>,
    pub display_utc_offset: FixedOffset,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("BOT_TOKEN")
            .or_else(|| env_str("TELEGRAM_BOT_TOKEN"))
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("BOT_TOKEN environment variable is required".to_string())
            })?;

        let playback_service_url = env_str("PLAYBACK_SERVICE_URL")
            .or_else(|| env_str("GOOGLE_CLOUD_URL"))
            .and_then(non_empty)
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .ok_or_else(|| {
                Error::Config("PLAYBACK_SERVICE_URL environment variable is required".to_string())
            })?;

        let bot_mode = match env_str("BOT_MODE").map(|s| s.trim().to_lowercase()) {
            None => BotMode::Webhook,
            Some(s) => parse_bot_mode(&s)?,
        };

        let listen_addr = env_str("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("LISTEN_ADDR is not a socket address: {e}")))?;

        let webhook_path = normalize_route(
            &env_str("WEBHOOK_PATH").unwrap_or_else(|| "/api/telegram".to_string()),
        );

        let webhook_url = env_str("WEBHOOK_URL").and_then(non_empty);

        let welcome_image_path = env_path("WELCOME_IMAGE_PATH");
        let play_video = env_bool("PLAY_VIDEO").unwrap_or(true);
        let playback_timeout = env_u64("PLAYBACK_TIMEOUT_SECS").map(Duration::from_secs);

        let display_utc_offset = match env_str("DISPLAY_UTC_OFFSET").and_then(non_empty) {
            Some(s) => parse_utc_offset(&s).ok_or_else(|| {
                Error::Config(format!("DISPLAY_UTC_OFFSET must look like +02:00, got {s:?}"))
            })?,
            None => Local::now().offset().fix(),
        };

        Ok(Self {
            telegram_bot_token,
            playback_service_url,
            bot_mode,
            listen_addr,
            webhook_path,
            webhook_url,
            welcome_image_path,
            play_video,
            playback_timeout,
            display_utc_offset,
        })
    }
}

fn parse_bot_mode(s: &str) -> Result<BotMode> {
    match s {
        "webhook" => Ok(BotMode::Webhook),
        "polling" => Ok(BotMode::Polling),
        other => Err(Error::Config(format!(
            "BOT_MODE must be webhook or polling, got {other:?}"
        ))),
    }
}

fn normalize_route(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Parse `+HH:MM`, `-HH:MM` or `Z`.
fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let (h, m) = rest.split_once(':')?;
    let h: i32 = h.parse().ok()?;
    let m: i32 = m.parse().ok()?;
    if !(0..=23).contains(&h) || !(0..=59).contains(&m) {
        return None;
    }
    FixedOffset::east_opt(sign * (h * 3600 + m * 60))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, unquote(v.trim()));
    }
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_str(key).and_then(non_empty).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
