use crate::{
    handler::{self, Response},
    BotContext,
};

pub async fn execute(bot: &BotContext) -> handler::Result {
    let p = &bot.prefix;

    Ok(Response::Generic {
        title: "Commands".to_owned(),
        description: format!(
            "`{p}play <YouTube URL>` — Play a song or add it to the queue\n\
             `{p}pause` — Pause playback\n\
             `{p}resume` — Resume playback\n\
             `{p}stop` — Stop the music and clear the queue\n\
             `{p}queue` — Show the current queue\n\
             `{p}skip` — Skip the current song"
        ),
    })
}
