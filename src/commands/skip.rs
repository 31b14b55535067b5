use serenity::all::Message;

use crate::{
    handler::{self, Response},
    manager::SkipOutcome,
    utils::MusicData,
    BotContext,
};

const TITLE: &str = "Skip";

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

    match data.manager.skip(data.guild_id).await {
        SkipOutcome::Skipped { track } => Ok(response(&format!("Skipped **{}**.", track.title))),
        SkipOutcome::NothingToSkip => Err(response("The queue is empty, nothing to skip!")),
    }
}
