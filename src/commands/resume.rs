use serenity::all::Message;
use tracing::warn;

use crate::{
    handler::{self, Response},
    manager::ResumeOutcome,
    utils::MusicData,
    BotContext,
};

const TITLE: &str = "Resume";

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

    match data.manager.resume(data.guild_id).await {
        Ok(ResumeOutcome::Resumed) => Ok(response("Playback resumed.")),
        Ok(ResumeOutcome::AlreadyPlaying) => Err(response("The music is already playing!")),
        Ok(ResumeOutcome::NothingPlaying) => Err(response("Nothing is playing right now!")),
        Err(e) => {
            warn!("can't resume the player: {}", e);
            Err(response("Couldn't resume the player."))
        }
    }
}
