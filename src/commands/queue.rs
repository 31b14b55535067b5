use serenity::all::Message;

use crate::{
    handler::{self, Response},
    utils::MusicData,
    BotContext,
};

const TITLE: &str = "Queue";

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

    match data.manager.queue(data.guild_id).await {
        Some(tracks) => {
            let list = tracks
                .iter()
                .enumerate()
                .map(|(index, track)| format!("{}. {}", index + 1, track.title))
                .collect::<Vec<_>>()
                .join("\n");

            Ok(response(&list))
        }
        None => Err(response("The queue is empty!")),
    }
}
