//! Command router: gating, the single remote call, and reply delivery.
//!
//! Every command runs `gate -> dispatch -> respond` exactly once. Nothing is
//! retried and no state survives the call.

use std::{path::PathBuf, sync::Arc};

use chrono::{FixedOffset, Offset, Utc};
use tracing::{debug, info, warn};

use crate::{
    command::{parse_command, Command},
    config::Config,
    domain::{ChatContext, MessageRef},
    errors::CommandError,
    formatting::{
        render_play, render_queue, render_skip, Attribution, HELP_TEXT, MISSING_SESSION_TEXT,
        PAUSED_TEXT, PLAY_FAILED_TEXT, PLAY_MISSING_QUERY_TEXT, PLAY_PRIVATE_CHAT_TEXT,
        PLAY_PROCESSING_TEXT, PLAY_REJECTED_TEXT, RESUMED_TEXT, SKIP_FAILED_TEXT,
        STATUS_FAILED_TEXT, STOPPED_TEXT, WELCOME_TEXT,
    },
    messaging::port::MessagingPort,
    playback::{port::PlaybackService, types::PlayRequest},
    session, Result,
};

/// Router knobs taken from the process config.
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// This bot's `@username`; commands mentioning any other bot are ignored.
    pub bot_username: Option<String>,
    pub play_video: bool,
    pub welcome_image: Option<PathBuf>,
    pub display_utc_offset: FixedOffset,
}

impl RouterConfig {
    pub fn from_config(cfg: &Config, bot_username: Option<String>) -> Self {
        Self {
            bot_username,
            play_video: cfg.play_video,
            welcome_image: cfg.welcome_image_path.clone(),
            display_utc_offset: cfg.display_utc_offset,
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            bot_username: None,
            play_video: true,
            welcome_image: None,
            display_utc_offset: Utc.fix(),
        }
    }
}

/// What a command handler produced, before delivery.
#[derive(Debug)]
pub enum CommandOutcome {
    Success(String),
    Failure {
        reason: CommandError,
        user_message: String,
    },
}

impl CommandOutcome {
    /// Map an error to its user-facing text. Gating errors have fixed wording;
    /// remote errors use the command-specific `remote_text`.
    fn failure(reason: CommandError, remote_text: &str) -> Self {
        let user_message = match &reason {
            CommandError::MissingArgument => PLAY_MISSING_QUERY_TEXT,
            CommandError::UnsupportedChatKind => PLAY_PRIVATE_CHAT_TEXT,
            CommandError::MissingSessionIdentity => MISSING_SESSION_TEXT,
            CommandError::RemoteUnavailable(_) | CommandError::RemoteRejected(_) => remote_text,
        };
        Self::Failure {
            reason,
            user_message: user_message.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            CommandOutcome::Success(text) => text,
            CommandOutcome::Failure { user_message, .. } => user_message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success(_))
    }
}

pub struct CommandRouter {
    playback: Arc<dyn PlaybackService>,
    messenger: Arc<dyn MessagingPort>,
    cfg: RouterConfig,
}

impl CommandRouter {
    pub fn new(
        playback: Arc<dyn PlaybackService>,
        messenger: Arc<dyn MessagingPort>,
        cfg: RouterConfig,
    ) -> Self {
        Self {
            playback,
            messenger,
            cfg,
        }
    }

    /// Handle one inbound message text. Unrecognized text is ignored silently.
    ///
    /// Only delivery failures (the chat platform refusing a send) surface as
    /// errors; every command failure becomes a reply.
    pub async fn dispatch(&self, ctx: &ChatContext, text: &str) -> Result<()> {
        let Some(cmd) = parse_command(text, self.cfg.bot_username.as_deref()) else {
            debug!(chat_id = ctx.chat_id.0, "ignoring non-command message");
            return Ok(());
        };
        self.execute(ctx, &cmd).await
    }

    pub async fn execute(&self, ctx: &ChatContext, cmd: &Command) -> Result<()> {
        info!(
            chat_id = ctx.chat_id.0,
            command = cmd.name(),
            "command received"
        );

        let outcome = match cmd {
            Command::Start => return self.welcome(ctx).await,
            Command::Play { query } => return self.play(ctx, query).await,
            Command::Help => CommandOutcome::Success(HELP_TEXT.to_string()),
            Command::Pause => CommandOutcome::Success(PAUSED_TEXT.to_string()),
            Command::Resume => CommandOutcome::Success(RESUMED_TEXT.to_string()),
            Command::Stop => CommandOutcome::Success(STOPPED_TEXT.to_string()),
            Command::Status => self.status(ctx).await,
            Command::Skip => self.skip(ctx).await,
        };

        log_outcome(ctx, cmd, &outcome);
        self.messenger.send_text(ctx.chat_id, outcome.text()).await?;
        Ok(())
    }

    async fn welcome(&self, ctx: &ChatContext) -> Result<()> {
        if let Some(path) = self.cfg.welcome_image.as_deref().filter(|p| p.is_file()) {
            match self
                .messenger
                .send_photo(ctx.chat_id, path, WELCOME_TEXT)
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) => warn!(
                    chat_id = ctx.chat_id.0,
                    "welcome photo failed, sending text only: {e}"
                ),
            }
        }
        self.messenger.send_text(ctx.chat_id, WELCOME_TEXT).await?;
        Ok(())
    }

    async fn play(&self, ctx: &ChatContext, query: &str) -> Result<()> {
        let cmd = Command::Play {
            query: query.to_string(),
        };

        let req = match PlayRequest::for_chat(ctx, query, self.cfg.play_video) {
            Ok(req) => req,
            Err(reason) => {
                let outcome = CommandOutcome::failure(reason, PLAY_FAILED_TEXT);
                log_outcome(ctx, &cmd, &outcome);
                self.messenger.send_text(ctx.chat_id, outcome.text()).await?;
                return Ok(());
            }
        };

        let placeholder = match self
            .messenger
            .send_text(ctx.chat_id, PLAY_PROCESSING_TEXT)
            .await
        {
            Ok(msg) => Some(msg),
            Err(e) => {
                warn!(chat_id = ctx.chat_id.0, "could not send placeholder: {e}");
                None
            }
        };

        info!(
            chat_id = ctx.chat_id.0,
            session = %req.session,
            query = %req.query,
            "requesting playback"
        );
        let outcome = match self.playback.play(&req).await {
            Ok(result) if result.success => CommandOutcome::Success(render_play(&req.query, &result)),
            Ok(_) => CommandOutcome::failure(
                CommandError::RemoteRejected("service reported success=false".to_string()),
                PLAY_REJECTED_TEXT,
            ),
            Err(e) => CommandOutcome::failure(CommandError::RemoteUnavailable(e), PLAY_FAILED_TEXT),
        };

        log_outcome(ctx, &cmd, &outcome);
        self.finish_placeholder(ctx, placeholder, outcome.text())
            .await
    }

    /// Replace the placeholder in place; send a fresh message if there is none
    /// or the edit is refused.
    async fn finish_placeholder(
        &self,
        ctx: &ChatContext,
        placeholder: Option<MessageRef>,
        text: &str,
    ) -> Result<()> {
        if let Some(msg) = placeholder {
            match self.messenger.edit_text(msg, text).await {
                Ok(()) => return Ok(()),
                Err(e) => warn!(
                    chat_id = ctx.chat_id.0,
                    message_id = msg.message_id.0,
                    "placeholder edit failed, replying instead: {e}"
                ),
            }
        }
        self.messenger.send_text(ctx.chat_id, text).await?;
        Ok(())
    }

    async fn status(&self, ctx: &ChatContext) -> CommandOutcome {
        let session = match session::resolve(ctx) {
            Ok(s) => s,
            Err(e) => return CommandOutcome::failure(e, STATUS_FAILED_TEXT),
        };

        match self.playback.get_queue(&session).await {
            Ok(snapshot) => CommandOutcome::Success(render_queue(
                &snapshot,
                Attribution {
                    current: &ctx.requester_display_name,
                    queued: session.as_str(),
                },
                &self.cfg.display_utc_offset,
            )),
            Err(e) => CommandOutcome::failure(CommandError::RemoteUnavailable(e), STATUS_FAILED_TEXT),
        }
    }

    async fn skip(&self, ctx: &ChatContext) -> CommandOutcome {
        let session = match session::resolve(ctx) {
            Ok(s) => s,
            Err(e) => return CommandOutcome::failure(e, SKIP_FAILED_TEXT),
        };

        match self.playback.skip(&session).await {
            Ok(result) if result.is_success() => CommandOutcome::Success(render_skip(&result)),
            Ok(result) => CommandOutcome::Failure {
                reason: CommandError::RemoteRejected(result.status.clone()),
                user_message: render_skip(&result),
            },
            Err(e) => CommandOutcome::failure(CommandError::RemoteUnavailable(e), SKIP_FAILED_TEXT),
        }
    }
}

fn log_outcome(ctx: &ChatContext, cmd: &Command, outcome: &CommandOutcome) {
    if let CommandOutcome::Failure { reason, .. } = outcome {
        warn!(
            chat_id = ctx.chat_id.0,
            command = cmd.name(),
            "command failed: {reason}"
        );
    }
}
