//! Quaver // Utils
//!
//! Utility types for Quaver's commands.

use serenity::all::{GuildId, Message};
use tracing::{error, warn};

use crate::{manager::PlayerManager, BotContext};

/// Common data used by music commands.
pub struct MusicData {
    /// Quaver's player manager.
    pub manager: PlayerManager,

    /// Guild's ID.
    pub guild_id: GuildId,
}

impl MusicData {
    /// Creates a new instance of `MusicData`. Returns None when the manager
    /// isn't initialized yet or the message was sent outside a guild.
    pub async fn new(bot: &BotContext, message: &Message) -> Option<Self> {
        let Some(manager) = bot.manager.read().await.clone() else {
            error!("cannot get the manager");
            return None;
        };

        let Some(guild_id) = message.guild_id else {
            warn!("cannot get the guild ID");
            return None;
        };

        Some(Self { manager, guild_id })
    }
}
