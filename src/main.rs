//! Quaver
//!
//! A Discord music bot that joins voice channels, streams audio from YouTube
//! through yt-dlp and keeps one playback queue per guild.

use std::{process::exit, sync::Arc, time::Duration};

use serenity::{all::GatewayIntents, Client};
use songbird::{SerenityInit, SongbirdKey};
use tokio::{sync::RwLock, time::sleep};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    fmt::layer, layer::SubscriberExt, registry, util::SubscriberInitExt, EnvFilter,
};

use crate::{handler::QuaverHandler, manager::PlayerManager, resolver::Resolver};

mod commands;
mod config;
mod handler;
mod manager;
mod parsers;
mod player;
mod resolver;
mod utils;

/// Color used by embeds that report success.
pub const QUAVER_PRIMARY_COLOR: i32 = 0x5865f2;

/// Color used by embeds that report a failure.
pub const QUAVER_ERROR_COLOR: i32 = 0xf04747;

/// Command prefix used when the configuration doesn't set one.
pub const DEFAULT_COMMAND_PREFIX: &str = "!";

/// Seconds waited before reconnecting after the gateway connection dies.
const RECONNECT_DELAY: u64 = 5;

/// Data shared between the event handler and the command modules.
#[derive(Clone)]
pub struct BotContext {
    /// The player manager, reinitialized with every client connection.
    pub manager: Arc<RwLock<Option<PlayerManager>>>,

    /// The command prefix.
    pub prefix: String,
}

#[tokio::main]
async fn main() {
    registry()
        .with(layer())
        .with(EnvFilter::from_default_env())
        .init();

    info!("starting up...");

    let config = config::load_configuration().or_from_env();

    let Some(token) = config.discord_token else {
        error!("you need to set the Discord token in the configuration file or the DISCORD_TOKEN environment variable");
        exit(1);
    };

    let context = BotContext {
        manager: Arc::new(RwLock::new(None)),
        prefix: config
            .command_prefix
            .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_owned()),
    };

    let resolver = match Resolver::new() {
        Ok(v) => v,
        Err(e) => {
            error!("can't initialize the resolver: {}", e);
            exit(2);
        }
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    loop {
        debug!("initializing client...");
        let mut client = match Client::builder(&token, intents)
            .event_handler(QuaverHandler {
                context: context.clone(),
            })
            .register_songbird()
            .await
        {
            Ok(v) => v,
            Err(e) => {
                error!("can't initialize the client: {}", e);
                exit(3);
            }
        };

        let Some(voice_manager) = client.data.read().await.get::<SongbirdKey>().cloned() else {
            error!("songbird isn't registered in the client");
            exit(3);
        };

        // Sessions can't outlive the client connection, so the manager is
        // rebuilt from scratch together with it.
        *context.manager.write().await = Some(PlayerManager::new(
            client.http.clone(),
            voice_manager,
            resolver.clone(),
        ));

        if let Err(e) = client.start().await {
            error!("client stopped: {}", e);
        }

        warn!("reconnecting in {} seconds...", RECONNECT_DELAY);
        sleep(Duration::from_secs(RECONNECT_DELAY)).await;
    }
}
