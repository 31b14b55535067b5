//! Quaver // Player
//!
//! Per-guild playback session: the track queue and the state shared with the
//! voice driver.

use std::{collections::VecDeque, sync::Arc};

use serenity::all::{ChannelId, GuildId};
use songbird::{tracks::TrackHandle, Call};
use tokio::sync::{Mutex, MutexGuard};

/// A playable track: a display title and a locator the resolver can open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// The track title.
    pub title: String,

    /// The canonical URL of the track.
    pub url: String,
}

/// FIFO queue of tracks. The head is the track currently streaming, or the
/// next one to play when playback hasn't started yet.
#[derive(Debug, Default)]
pub struct TrackQueue {
    tracks: VecDeque<Track>,
}

impl TrackQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            tracks: VecDeque::new(),
        }
    }

    /// Appends a track, returning its 1-based position in the queue.
    pub fn push(&mut self, track: Track) -> usize {
        self.tracks.push_back(track);
        self.tracks.len()
    }

    /// The track at the head of the queue.
    pub fn head(&self) -> Option<&Track> {
        self.tracks.front()
    }

    /// Removes and returns the head of the queue.
    pub fn pop(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }

    /// Removes every track from the queue.
    pub fn clear(&mut self) {
        self.tracks.clear()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Iterates over the queued tracks in playback order.
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}

/// Mutable playback state of a guild, guarded by a single lock so that
/// commands and driver callbacks for the same guild never interleave.
pub struct PlayerState {
    /// The track queue.
    pub queue: TrackQueue,

    /// Handle of the track currently dispatched to the driver.
    pub current: Option<TrackHandle>,

    /// True once a track has been dispatched to the driver.
    pub playing: bool,

    /// True while the driver is paused.
    pub paused: bool,

    /// Monotonic dispatch counter used to discard stale driver signals.
    epoch: u64,
}

impl PlayerState {
    fn new() -> Self {
        Self {
            queue: TrackQueue::new(),
            current: None,
            playing: false,
            paused: false,
            epoch: 0,
        }
    }

    /// Whether a pause request is valid in this state.
    pub fn can_pause(&self) -> bool {
        self.playing && !self.paused
    }

    /// Whether a resume request is valid in this state.
    pub fn can_resume(&self) -> bool {
        self.playing && self.paused
    }

    /// Advances the dispatch epoch, returning the new value to be attached
    /// to the driver observers of the track being dispatched.
    pub fn next_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Whether a driver signal tagged with the given epoch refers to the
    /// track currently dispatched.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }
}

/// A guild's playback session. Cheap to clone, the queue and driver state
/// live behind a shared lock.
#[derive(Clone)]
pub struct GuildPlayer {
    guild_id: GuildId,
    voice_channel_id: ChannelId,
    text_channel_id: ChannelId,
    call: Arc<Mutex<Call>>,
    state: Arc<Mutex<PlayerState>>,
}

impl GuildPlayer {
    pub fn new(
        guild_id: GuildId,
        voice_channel_id: ChannelId,
        text_channel_id: ChannelId,
        call: Arc<Mutex<Call>>,
    ) -> Self {
        Self {
            guild_id,
            voice_channel_id,
            text_channel_id,
            call,
            state: Arc::new(Mutex::new(PlayerState::new())),
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn voice_channel_id(&self) -> ChannelId {
        self.voice_channel_id
    }

    pub fn text_channel_id(&self) -> ChannelId {
        self.text_channel_id
    }

    /// The voice connection handle of this session.
    pub fn call(&self) -> Arc<Mutex<Call>> {
        self.call.clone()
    }

    /// Locks the playback state. Held across whole operations so that
    /// commands and driver callbacks for this guild are serialized.
    pub async fn state(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str) -> Track {
        Track {
            title: title.to_owned(),
            url: format!("https://youtu.be/{}", title),
        }
    }

    #[test]
    fn queue_keeps_push_order() {
        let mut queue = TrackQueue::new();

        queue.push(track("a"));
        queue.push(track("b"));
        queue.push(track("c"));

        let titles = queue.iter().map(|t| t.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[test]
    fn push_returns_one_based_positions() {
        let mut queue = TrackQueue::new();

        assert_eq!(queue.push(track("a")), 1);
        assert_eq!(queue.push(track("b")), 2);
        assert_eq!(queue.push(track("c")), 3);
    }

    #[test]
    fn pop_removes_exactly_the_head() {
        let mut queue = TrackQueue::new();
        queue.push(track("a"));
        queue.push(track("b"));

        assert_eq!(queue.pop(), Some(track("a")));
        assert_eq!(queue.head(), Some(&track("b")));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn popping_the_last_track_empties_the_queue() {
        let mut queue = TrackQueue::new();
        queue.push(track("a"));

        assert_eq!(queue.pop(), Some(track("a")));
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn clear_drops_everything() {
        let mut queue = TrackQueue::new();
        queue.push(track("a"));
        queue.push(track("b"));

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.head(), None);
    }

    #[test]
    fn pause_requires_an_active_unpaused_session() {
        let mut state = PlayerState::new();
        assert!(!state.can_pause());

        state.playing = true;
        assert!(state.can_pause());

        state.paused = true;
        assert!(!state.can_pause());
    }

    #[test]
    fn resume_requires_a_paused_session() {
        let mut state = PlayerState::new();
        assert!(!state.can_resume());

        state.playing = true;
        assert!(!state.can_resume());

        state.paused = true;
        assert!(state.can_resume());
    }

    #[test]
    fn stale_epochs_are_not_current() {
        let mut state = PlayerState::new();

        let first = state.next_epoch();
        assert!(state.is_current(first));

        let second = state.next_epoch();
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
    }
}
