//! Structured parsing of chat commands.

/// A recognized chat command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// `query` is the trimmed argument text and may be empty.
    Play { query: String },
    Status,
    Skip,
    Pause,
    Resume,
    Stop,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Play { .. } => "play",
            Command::Status => "status",
            Command::Skip => "skip",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Stop => "stop",
        }
    }
}

/// Split `/cmd@botname args...` into a lowercase verb, the addressed bot (if
/// any) and the trimmed rest.
fn split_command(text: &str) -> Option<(String, Option<&str>, String)> {
    let text = text.trim();
    let body = text.strip_prefix('/')?;

    let mut parts = body.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim().to_string();

    let (verb, mention) = match first.split_once('@') {
        Some((verb, bot)) => (verb, Some(bot)),
        None => (first, None),
    };
    let verb = verb.to_lowercase();
    if verb.is_empty() {
        return None;
    }
    Some((verb, mention, rest))
}

/// Parse message text into a `Command`.
///
/// Unknown verbs and plain text yield `None`, as do commands mentioning a bot
/// other than `bot_username`. With no known username every mention is accepted.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<Command> {
    let (verb, mention, args) = split_command(text)?;
    if let (Some(mention), Some(me)) = (mention, bot_username) {
        if !mention.eq_ignore_ascii_case(me.trim_start_matches('@')) {
            return None;
        }
    }

    let cmd = match verb.as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "play" => Command::Play { query: args },
        "status" => Command::Status,
        "skip" => Command::Skip,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "stop" => Command::Stop,
        _ => return None,
    };
    Some(cmd)
}
