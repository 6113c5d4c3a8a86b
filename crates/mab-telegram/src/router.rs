use std::{net::SocketAddr, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{info, warn};

use mab_core::router::CommandRouter;

use crate::{handlers, webhook};

/// Everything an update handler needs; built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<CommandRouter>,
}

impl AppState {
    pub fn new(router: Arc<CommandRouter>) -> Self {
        Self { router }
    }
}

/// This bot's `@username` as reported by `getMe`, if reachable.
pub async fn bot_username(bot: &Bot) -> Option<String> {
    match bot.get_me().await {
        Ok(me) => me.user.username.clone(),
        Err(e) => {
            warn!("getMe failed, accepting commands for any bot: {e}");
            None
        }
    }
}

pub async fn run_polling(bot: Bot, state: Arc<AppState>) -> anyhow::Result<()> {
    if let Ok(me) = bot.get_me().await {
        info!("mab started (polling): @{}", me.username());
    }

    // Telegram refuses getUpdates while a webhook is registered.
    if let Err(e) = bot.delete_webhook().await {
        warn!("failed to delete webhook: {e} (continuing anyway)");
    }

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handlers::handle_message))
        .branch(Update::filter_channel_post().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

pub async fn run_webhook(
    bot: Bot,
    state: Arc<AppState>,
    listen_addr: SocketAddr,
    path: &str,
    public_url: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(url) = public_url {
        let url = reqwest::Url::parse(url)?;
        bot.set_webhook(url.clone()).await?;
        info!("webhook registered at {url}");
    }

    let app = webhook::app(state, path);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("mab started (webhook): listening on {listen_addr}{path}");
    axum::serve(listener, app).await?;
    Ok(())
}
