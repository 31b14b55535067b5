use serenity::{all::Message, client::Context};
use tracing::warn;

use crate::{
    handler::{self, Response},
    manager::{ManagerError, PlayOutcome},
    utils::MusicData,
    BotContext,
};

const TITLE: &str = "Play";

fn error(description: &str) -> Response {
    Response::Generic {
        title: TITLE.to_owned(),
        description: description.to_owned(),
    }
}

pub async fn execute(
    bot: &BotContext,
    ctx: &Context,
    message: &Message,
    args: &str,
) -> handler::Result {
    let Some(data) = MusicData::new(bot, message).await else {
        return Err(error("This command can only be used in a server."));
    };

    let url = args.trim();
    if url.is_empty() || !data.manager.resolver().validate(url) {
        return Err(error("Please provide a valid YouTube URL!"));
    }

    // The cache reference must be dropped before the awaits below.
    let voice_channel_id = ctx.cache.guild(data.guild_id).and_then(|guild| {
        guild
            .voice_states
            .get(&message.author.id)
            .and_then(|voice_state| voice_state.channel_id)
    });

    let Some(voice_channel_id) = voice_channel_id else {
        return Err(error("You need to be in a voice channel to play music!"));
    };

    match data
        .manager
        .play(data.guild_id, voice_channel_id, message.channel_id, url)
        .await
    {
        Ok(PlayOutcome::Playing { track }) => Ok(Response::Generic {
            title: TITLE.to_owned(),
            description: format!("Now playing: **{}**", track.title),
        }),
        Ok(PlayOutcome::Enqueued { track, position }) => Ok(Response::Generic {
            title: TITLE.to_owned(),
            description: format!("**{}** added to the queue (position {}).", track.title, position),
        }),
        Err(ManagerError::Resolver(e)) => {
            warn!("can't resolve {}: {}", url, e);
            Err(error("Couldn't load the video. Try another URL or try again later."))
        }
        Err(ManagerError::Join(e)) => {
            warn!("can't join the voice channel: {}", e);
            Err(error("Couldn't connect to the voice channel!"))
        }
        Err(e) => {
            warn!("can't execute play: {}", e);
            Err(error("Something went wrong while starting playback."))
        }
    }
}
