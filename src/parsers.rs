//! Quaver // Parsers
//!
//! Contains the parsers used by Quaver.

use regex::Regex;

/// Holds the parsers used to recognize the media URLs accepted by the bot.
#[derive(Clone)]
pub struct UrlParser {
    /// Regex parser for YouTube video URLs.
    youtube_parser: Regex,
}

impl UrlParser {
    /// Creates a new instance of the URL parser.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            youtube_parser: Regex::new(
                r"^https?://(www\.|m\.|music\.)?(youtube\.com/(watch\?[^\s]*v=|embed/|shorts/|live/)|youtu\.be/)[A-Za-z0-9_-]{6,}",
            )?,
        })
    }

    /// Checks whether the given string is a YouTube video URL.
    pub fn is_youtube_url(&self, data: &str) -> bool {
        self.youtube_parser.is_match(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> UrlParser {
        UrlParser::new().expect("valid regex")
    }

    #[test]
    fn accepts_watch_urls() {
        assert!(parser().is_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(parser().is_youtube_url("http://youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(parser().is_youtube_url("https://m.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(parser().is_youtube_url("https://music.youtube.com/watch?v=dQw4w9WgXcQ"));
    }

    #[test]
    fn accepts_short_and_embed_urls() {
        assert!(parser().is_youtube_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(parser().is_youtube_url("https://www.youtube.com/embed/dQw4w9WgXcQ"));
        assert!(parser().is_youtube_url("https://www.youtube.com/shorts/dQw4w9WgXcQ"));
    }

    #[test]
    fn accepts_watch_urls_with_extra_parameters() {
        assert!(parser().is_youtube_url("https://www.youtube.com/watch?list=PL123&v=dQw4w9WgXcQ"));
    }

    #[test]
    fn rejects_other_hosts() {
        assert!(!parser().is_youtube_url("https://vimeo.com/123456789"));
        assert!(!parser().is_youtube_url("https://example.com/watch?v=dQw4w9WgXcQ"));
    }

    #[test]
    fn rejects_junk() {
        assert!(!parser().is_youtube_url("dQw4w9WgXcQ"));
        assert!(!parser().is_youtube_url("not a url"));
        assert!(!parser().is_youtube_url(""));
        assert!(!parser().is_youtube_url("https://www.youtube.com/"));
    }
}
