use serenity::all::Message;
use tracing::warn;

use crate::{
    handler::{self, Response},
    manager::PauseOutcome,
    utils::MusicData,
    BotContext,
};

const TITLE: &str = "Pause";

fn response(description: &str) -> Response {
    Response::Generic {
        title: TITLE.to_owned(),
        description: description.to_owned(),
    }
}

pub async fn execute(bot: &BotContext, message: &Message) -> handler::Result {
    let Some(data) = MusicData::new(bot, message).await else {
        return Err(response("This command can only be used in a server."));
    };

    match data.manager.pause(data.guild_id).await {
        Ok(PauseOutcome::Paused) => Ok(response("Playback paused.")),
        Ok(PauseOutcome::AlreadyPaused) => Err(response("Playback is already paused!")),
        Ok(PauseOutcome::NothingPlaying) => Err(response("Nothing is playing right now!")),
        Err(e) => {
            warn!("can't pause the player: {}", e);
            Err(response("Couldn't pause the player."))
        }
    }
}
