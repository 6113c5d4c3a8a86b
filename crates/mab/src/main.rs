use std::sync::Arc;

use mab_core::{
    config::{BotMode, Config},
    router::{CommandRouter, RouterConfig},
};
use mab_playback::HttpPlaybackClient;
use mab_telegram::{
    router::{bot_username, run_polling, run_webhook, AppState},
    TelegramMessenger,
};
use teloxide::Bot;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), mab_core::Error> {
    mab_core::logging::init("mab")?;

    let cfg = Config::load()?;
    info!(
        playback = %cfg.playback_service_url,
        mode = ?cfg.bot_mode,
        "configuration loaded"
    );

    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let playback = Arc::new(HttpPlaybackClient::new(
        &cfg.playback_service_url,
        cfg.playback_timeout,
    )?);
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let username = bot_username(&bot).await;
    let router = Arc::new(CommandRouter::new(
        playback,
        messenger,
        RouterConfig::from_config(&cfg, username),
    ));
    let state = Arc::new(AppState::new(router));

    let res = match cfg.bot_mode {
        BotMode::Polling => run_polling(bot, state).await,
        BotMode::Webhook => {
            run_webhook(
                bot,
                state,
                cfg.listen_addr,
                &cfg.webhook_path,
                cfg.webhook_url.as_deref(),
            )
            .await
        }
    };
    res.map_err(|e| mab_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
