/// Core error type.
///
/// Adapter crates map their specific errors into this type so the bot core can
/// handle failures consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure talking to the remote playback service.
#[derive(Clone, Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("undecodable response: {0}")]
    Decode(String),
}

/// Everything that can stop a command from producing its normal reply.
///
/// All variants are recovered inside the router and rendered as a fixed,
/// command-specific message.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("missing command argument")]
    MissingArgument,

    #[error("command not supported in this chat kind")]
    UnsupportedChatKind,

    #[error("chat has no public handle")]
    MissingSessionIdentity,

    #[error("playback service unavailable: {0}")]
    RemoteUnavailable(#[from] PlaybackError),

    #[error("playback service rejected the request: {0}")]
    RemoteRejected(String),
}
