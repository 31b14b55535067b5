use serenity::all::Message;

use crate::{
    handler::{self, Response},
    utils::MusicData,
    BotContext,
};

const TITLE: &str = "Stop";

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

    if data.manager.stop(data.guild_id).await {
        Ok(response("Playback stopped and the queue cleared."))
    } else {
        Err(response("Nothing is playing right now!"))
    }
}
