//! Quaver // Resolver
//!
//! Wraps the media resolution service used by the player: URL validation,
//! metadata fetching and audio stream opening, all backed by yt-dlp.

use std::{
    fmt::{self, Display, Formatter},
    result,
};

use songbird::input::{AudioStreamError, Compose, Input, LiveInput, YoutubeDl};

use crate::{parsers::UrlParser, player::Track};

/// Errors that can occur while resolving a media URL.
#[derive(Debug)]
pub enum ResolverError {
    /// The track metadata couldn't be fetched, nothing can be enqueued.
    MetadataFetch(AudioStreamError),

    /// The audio stream couldn't be opened, the track can't be played.
    StreamOpen(AudioStreamError),
}

impl Display for ResolverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MetadataFetch(e) => write!(f, "can't fetch the track metadata: {}", e),
            Self::StreamOpen(e) => write!(f, "can't open the audio stream: {}", e),
        }
    }
}

/// Only [`result::Result`] with the type of [`Err`] set to [`ResolverError`].
pub type Result<T> = result::Result<T, ResolverError>;

/// The media resolution service.
#[derive(Clone)]
pub struct Resolver {
    /// HTTP client shared between all yt-dlp invocations.
    http: reqwest::Client,

    /// Parser used to validate URLs before resolution.
    urls: UrlParser,
}

impl Resolver {
    /// Creates a new instance of the resolver.
    pub fn new() -> result::Result<Self, regex::Error> {
        Ok(Self {
            http: reqwest::Client::new(),
            urls: UrlParser::new()?,
        })
    }

    /// Checks whether the given string is a URL this resolver can handle.
    pub fn validate(&self, url: &str) -> bool {
        self.urls.is_youtube_url(url)
    }

    /// Fetches the metadata of the given URL, producing a [`Track`].
    pub async fn fetch(&self, url: &str) -> Result<Track> {
        let mut source = YoutubeDl::new(self.http.clone(), url.to_owned());

        let metadata = source
            .aux_metadata()
            .await
            .map_err(ResolverError::MetadataFetch)?;

        Ok(Track {
            title: metadata.title.unwrap_or_else(|| url.to_owned()),
            url: metadata.source_url.unwrap_or_else(|| url.to_owned()),
        })
    }

    /// Opens the audio stream of the given URL, producing a playable input.
    pub async fn open(&self, url: &str) -> Result<Input> {
        let mut source = YoutubeDl::new(self.http.clone(), url.to_owned());

        let stream = source
            .create_async()
            .await
            .map_err(ResolverError::StreamOpen)?;

        Ok(Input::Live(LiveInput::Raw(stream), Some(Box::new(source))))
    }
}
