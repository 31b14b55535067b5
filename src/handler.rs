//! Quaver // Handler
//!
//! Gateway event handler: dispatches prefixed text commands to the command
//! modules and renders their responses as embed replies.

use std::result;

use serenity::{
    all::{ActivityData, Message, Ready},
    builder::{CreateEmbed, CreateMessage},
    client::{Context, EventHandler},
};
use serenity::async_trait;
use tracing::{debug, info, warn};

use crate::{commands, BotContext, QUAVER_ERROR_COLOR, QUAVER_PRIMARY_COLOR};

/// Type returned by commands to indicate how to respond to the message.
pub enum Response {
    /// Generic response, used by every command.
    Generic {
        /// Embed's title.
        title: String,

        /// Embed's description.
        description: String,
    },
}

/// Command's function return type.
pub type Result = result::Result<Response, Response>;

/// The gateway event handler.
pub struct QuaverHandler {
    pub context: BotContext,
}

#[async_trait]
impl EventHandler for QuaverHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("client initialized and connected to: {}", ready.user.name);

        ctx.set_activity(Some(ActivityData::listening(format!(
            "{}help",
            self.context.prefix
        ))));
    }

    async fn message(&self, ctx: Context, message: Message) {
        if message.author.bot {
            return;
        }

        let Some(content) = message.content.strip_prefix(&self.context.prefix) else {
            return;
        };

        let mut words = content.split_whitespace();
        let Some(command) = words.next() else {
            return;
        };
        let command = command.to_lowercase();
        let args = words.collect::<Vec<_>>().join(" ");

        debug!("executing command: {}", command);
        let response = match command.as_str() {
            "play" => commands::play::execute(&self.context, &ctx, &message, &args).await,
            "pause" => commands::pause::execute(&self.context, &message).await,
            "resume" => commands::resume::execute(&self.context, &message).await,
            "stop" => commands::stop::execute(&self.context, &message).await,
            "queue" => commands::queue::execute(&self.context, &message).await,
            "skip" => commands::skip::execute(&self.context, &message).await,
            "help" => commands::help::execute(&self.context).await,
            _ => {
                debug!("unknown command: {}", command);
                return;
            }
        };

        respond(&ctx, &message, response).await;
    }
}

/// Replies to the command message with the embed built from the response.
async fn respond(ctx: &Context, message: &Message, response: Result) {
    let (response, color) = match response {
        Ok(v) => (v, QUAVER_PRIMARY_COLOR),
        Err(v) => (v, QUAVER_ERROR_COLOR),
    };

    let builder = create_embed(response, color).reference_message(message);
    if let Err(e) = message.channel_id.send_message(&ctx.http, builder).await {
        warn!("can't respond to the command: {}", e);
    }
}

/// Creates a Discord embed message.
fn create_embed(response: Response, color: i32) -> CreateMessage {
    match response {
        Response::Generic { title, description } => CreateMessage::new().embed(
            CreateEmbed::new()
                .title(title)
                .description(description)
                .color(color),
        ),
    }
}
