//! Quaver // Manager
//!
//! Owns the guild-to-player mapping and drives sequential playback: one
//! track at a time per guild, advancing when the driver reports the end of
//! the current track and converging to an empty state when the queue drains.

use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    result,
    sync::Arc,
};

use async_trait::async_trait;
use serenity::{
    all::{ChannelId, GuildId},
    http::Http,
};
use songbird::{
    error::JoinError, tracks::ControlError, CoreEvent, Event, EventContext,
    EventHandler as VoiceEventHandler, Songbird, TrackEvent,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    player::{GuildPlayer, PlayerState, Track},
    resolver::{Resolver, ResolverError},
};

/// Errors that can occur while operating a guild player.
#[derive(Debug)]
pub enum ManagerError {
    /// The voice channel couldn't be joined.
    Join(JoinError),

    /// The driver rejected a control request.
    Control(ControlError),

    /// The media resolution service failed.
    Resolver(ResolverError),
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Join(e) => e.fmt(f),
            Self::Control(e) => e.fmt(f),
            Self::Resolver(e) => e.fmt(f),
        }
    }
}

/// Only [`result::Result`] with the type of [`Err`] set to [`ManagerError`].
pub type Result<T> = result::Result<T, ManagerError>;

/// What happened to a track handed to [`PlayerManager::play`].
pub enum PlayOutcome {
    /// A new session was created and the track is now playing.
    Playing { track: Track },

    /// The track was appended to an existing session's queue.
    Enqueued { track: Track, position: usize },
}

/// Result of a pause request.
pub enum PauseOutcome {
    Paused,
    AlreadyPaused,
    NothingPlaying,
}

/// Result of a resume request.
pub enum ResumeOutcome {
    Resumed,
    AlreadyPlaying,
    NothingPlaying,
}

/// Result of a skip request.
pub enum SkipOutcome {
    /// The head of the queue was dropped and playback moved on.
    Skipped { track: Track },

    /// There was no session or no track to skip.
    NothingToSkip,
}

/// The service that owns every guild's playback session.
#[derive(Clone)]
pub struct PlayerManager {
    http: Arc<Http>,
    voice_manager: Arc<Songbird>,
    resolver: Resolver,
    players: Arc<RwLock<HashMap<GuildId, GuildPlayer>>>,
}

impl PlayerManager {
    pub fn new(http: Arc<Http>, voice_manager: Arc<Songbird>, resolver: Resolver) -> Self {
        Self {
            http,
            voice_manager,
            resolver,
            players: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The media resolution service used by this manager.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    async fn get(&self, guild_id: GuildId) -> Option<GuildPlayer> {
        self.players.read().await.get(&guild_id).cloned()
    }

    /// Resolves the URL and either starts a new session or appends to the
    /// existing one. Nothing is created or mutated when resolution fails,
    /// and no session is created when the voice channel can't be joined.
    pub async fn play(
        &self,
        guild_id: GuildId,
        voice_channel_id: ChannelId,
        text_channel_id: ChannelId,
        url: &str,
    ) -> Result<PlayOutcome> {
        let track = self
            .resolver
            .fetch(url)
            .await
            .map_err(ManagerError::Resolver)?;

        if let Some(player) = self.get(guild_id).await {
            let mut state = player.state().await;
            let position = state.queue.push(track.clone());

            debug!("guild {}: enqueued at position {}", guild_id, position);
            return Ok(PlayOutcome::Enqueued { track, position });
        }

        let call = self
            .voice_manager
            .join(guild_id, voice_channel_id)
            .await
            .map_err(ManagerError::Join)?;

        call.lock().await.add_global_event(
            Event::Core(CoreEvent::DriverDisconnect),
            DisconnectNotifier {
                manager: self.clone(),
                guild_id,
            },
        );

        let player = GuildPlayer::new(guild_id, voice_channel_id, text_channel_id, call);
        player.state().await.queue.push(track.clone());

        {
            let mut players = self.players.write().await;
            if let Some(existing) = players.get(&guild_id).cloned() {
                // Another command created the session while we were joining.
                drop(players);

                let mut state = existing.state().await;
                let position = state.queue.push(track.clone());
                return Ok(PlayOutcome::Enqueued { track, position });
            }

            players.insert(guild_id, player);
        }

        self.advance(guild_id).await;

        Ok(PlayOutcome::Playing { track })
    }

    /// Starts playback of the current queue head, dropping heads that fail
    /// to open until one plays or the queue drains.
    pub async fn advance(&self, guild_id: GuildId) {
        let Some(player) = self.get(guild_id).await else {
            return;
        };

        let mut state = player.state().await;
        let finished = self.drive(&player, &mut state).await;
        drop(state);

        if finished {
            self.destroy(guild_id).await;
        }
    }

    /// The advance loop. Bounded by the remaining queue length: every failed
    /// head is consumed. Returns true when the queue drained and the session
    /// is over.
    async fn drive(&self, player: &GuildPlayer, state: &mut PlayerState) -> bool {
        loop {
            let Some(track) = state.queue.head().cloned() else {
                state.current = None;
                state.playing = false;

                self.say(
                    player.text_channel_id(),
                    "Queue finished, leaving the voice channel.",
                )
                .await;
                return true;
            };

            match self.resolver.open(&track.url).await {
                Ok(input) => {
                    let handle = player.call().lock().await.play_input(input);
                    let epoch = state.next_epoch();

                    let observers = handle
                        .add_event(
                            Event::Track(TrackEvent::End),
                            TrackEndNotifier {
                                manager: self.clone(),
                                guild_id: player.guild_id(),
                                epoch,
                            },
                        )
                        .and(handle.add_event(
                            Event::Track(TrackEvent::Error),
                            TrackErrorNotifier {
                                manager: self.clone(),
                                guild_id: player.guild_id(),
                                epoch,
                            },
                        ));
                    if let Err(e) = observers {
                        warn!("can't attach the track observers: {}", e);
                    }

                    state.current = Some(handle);
                    state.playing = true;
                    state.paused = false;

                    debug!("guild {}: now playing {}", player.guild_id(), track.title);
                    return false;
                }
                Err(e) => {
                    warn!(
                        "guild {}: dropping {} from the queue: {}",
                        player.guild_id(),
                        track.url,
                        e
                    );

                    state.queue.pop();
                    self.say(
                        player.text_channel_id(),
                        &format!("Couldn't play **{}**, skipping it.", track.title),
                    )
                    .await;
                }
            }
        }
    }

    /// Pauses the driver. The queue is left untouched.
    pub async fn pause(&self, guild_id: GuildId) -> Result<PauseOutcome> {
        let Some(player) = self.get(guild_id).await else {
            return Ok(PauseOutcome::NothingPlaying);
        };

        let mut state = player.state().await;
        if !state.playing {
            return Ok(PauseOutcome::NothingPlaying);
        }
        if !state.can_pause() {
            return Ok(PauseOutcome::AlreadyPaused);
        }

        let Some(handle) = state.current.as_ref() else {
            return Ok(PauseOutcome::NothingPlaying);
        };
        handle.pause().map_err(ManagerError::Control)?;
        state.paused = true;

        Ok(PauseOutcome::Paused)
    }

    /// Resumes the paused driver. The queue is left untouched.
    pub async fn resume(&self, guild_id: GuildId) -> Result<ResumeOutcome> {
        let Some(player) = self.get(guild_id).await else {
            return Ok(ResumeOutcome::NothingPlaying);
        };

        let mut state = player.state().await;
        if !state.playing {
            return Ok(ResumeOutcome::NothingPlaying);
        }
        if !state.can_resume() {
            return Ok(ResumeOutcome::AlreadyPlaying);
        }

        let Some(handle) = state.current.as_ref() else {
            return Ok(ResumeOutcome::NothingPlaying);
        };
        handle.play().map_err(ManagerError::Control)?;
        state.paused = false;

        Ok(ResumeOutcome::Resumed)
    }

    /// Clears the queue, stops the driver and releases the voice connection.
    /// Returns false when there was no session to stop.
    pub async fn stop(&self, guild_id: GuildId) -> bool {
        let Some(player) = self.players.write().await.remove(&guild_id) else {
            return false;
        };

        let mut state = player.state().await;
        state.queue.clear();
        if let Some(handle) = state.current.take() {
            if let Err(e) = handle.stop() {
                warn!("can't stop the current track: {}", e);
            }
        }
        state.playing = false;
        drop(state);

        if let Err(e) = self.voice_manager.remove(guild_id).await {
            warn!("can't release the voice connection: {}", e);
        }

        debug!("guild {}: session stopped", guild_id);
        true
    }

    /// Drops the queue head without waiting for the driver to finish it and
    /// starts the next track, destroying the session when none is left.
    pub async fn skip(&self, guild_id: GuildId) -> SkipOutcome {
        let Some(player) = self.get(guild_id).await else {
            return SkipOutcome::NothingToSkip;
        };

        let mut state = player.state().await;
        let Some(skipped) = state.queue.pop() else {
            return SkipOutcome::NothingToSkip;
        };

        if let Some(handle) = state.current.take() {
            if let Err(e) = handle.stop() {
                warn!("can't stop the skipped track: {}", e);
            }
        }

        let finished = self.drive(&player, &mut state).await;
        drop(state);

        if finished {
            self.destroy(guild_id).await;
        }

        SkipOutcome::Skipped { track: skipped }
    }

    /// A snapshot of the queued tracks, or None when no session exists or
    /// the queue is empty.
    pub async fn queue(&self, guild_id: GuildId) -> Option<Vec<Track>> {
        let player = self.get(guild_id).await?;
        let state = player.state().await;

        if state.queue.is_empty() {
            return None;
        }

        Some(state.queue.iter().cloned().collect())
    }

    /// Removes the session entry and releases the voice connection.
    async fn destroy(&self, guild_id: GuildId) {
        self.players.write().await.remove(&guild_id);

        if let Err(e) = self.voice_manager.remove(guild_id).await {
            warn!("can't release the voice connection: {}", e);
        }

        debug!("guild {}: session destroyed", guild_id);
    }

    /// Natural end of the current track: drop the head and advance. Stale
    /// signals from tracks that were force-stopped are discarded.
    async fn on_track_end(&self, guild_id: GuildId, epoch: u64) {
        let Some(player) = self.get(guild_id).await else {
            return;
        };

        let mut state = player.state().await;
        if !state.is_current(epoch) {
            debug!("guild {}: discarding stale track end", guild_id);
            return;
        }

        state.queue.pop();
        let finished = self.drive(&player, &mut state).await;
        drop(state);

        if finished {
            self.destroy(guild_id).await;
        }
    }

    /// Driver error on the current track: same queue semantics as a natural
    /// end, plus a failure notice on the reply channel.
    async fn on_track_error(&self, guild_id: GuildId, epoch: u64) {
        let Some(player) = self.get(guild_id).await else {
            return;
        };

        let mut state = player.state().await;
        if !state.is_current(epoch) {
            debug!("guild {}: discarding stale track error", guild_id);
            return;
        }

        let dropped = state.queue.pop();
        if let Some(track) = dropped {
            self.say(
                player.text_channel_id(),
                &format!("Something went wrong while playing **{}**.", track.title),
            )
            .await;
        }

        let finished = self.drive(&player, &mut state).await;
        drop(state);

        if finished {
            self.destroy(guild_id).await;
        }
    }

    /// The voice connection was permanently lost: the session is removed
    /// without any playback side effects.
    async fn on_disconnect(&self, guild_id: GuildId) {
        let Some(player) = self.players.write().await.remove(&guild_id) else {
            return;
        };

        let mut state = player.state().await;
        warn!(
            "guild {}: connection to voice channel {} lost, dropping {} queued tracks",
            guild_id,
            player.voice_channel_id(),
            state.queue.len()
        );

        state.queue.clear();
        if let Some(handle) = state.current.take() {
            if let Err(e) = handle.stop() {
                warn!("can't stop the current track: {}", e);
            }
        }
        state.playing = false;
        drop(state);

        if let Err(e) = self.voice_manager.remove(guild_id).await {
            warn!("can't release the voice connection: {}", e);
        }

        self.say(
            player.text_channel_id(),
            "Disconnected from the voice channel.",
        )
        .await;
    }

    async fn say(&self, channel_id: ChannelId, content: &str) {
        if let Err(e) = channel_id.say(&self.http, content).await {
            warn!("can't send a message to channel {}: {}", channel_id, e);
        }
    }
}

/// Observer attached to every dispatched track for its natural end.
struct TrackEndNotifier {
    manager: PlayerManager,
    guild_id: GuildId,
    epoch: u64,
}

#[async_trait]
impl VoiceEventHandler for TrackEndNotifier {
    async fn act(&self, _: &EventContext<'_>) -> Option<Event> {
        self.manager.on_track_end(self.guild_id, self.epoch).await;
        None
    }
}

/// Observer attached to every dispatched track for driver errors.
struct TrackErrorNotifier {
    manager: PlayerManager,
    guild_id: GuildId,
    epoch: u64,
}

#[async_trait]
impl VoiceEventHandler for TrackErrorNotifier {
    async fn act(&self, _: &EventContext<'_>) -> Option<Event> {
        self.manager.on_track_error(self.guild_id, self.epoch).await;
        None
    }
}

/// Observer attached to the call for permanent driver disconnections.
struct DisconnectNotifier {
    manager: PlayerManager,
    guild_id: GuildId,
}

#[async_trait]
impl VoiceEventHandler for DisconnectNotifier {
    async fn act(&self, _: &EventContext<'_>) -> Option<Event> {
        self.manager.on_disconnect(self.guild_id).await;
        None
    }
}
