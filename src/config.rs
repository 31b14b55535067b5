//! Configuration parsing and management.

use std::{
    env, error,
    fmt::{self, Display, Formatter},
    fs::read_to_string,
    io,
    path::{Path, PathBuf},
};

use clap::Parser;
use serde::Deserialize;
use tracing::{debug, warn};

#[cfg(windows)]
mod windows {
    //! Windows-specific configuration parsing and management.

    use std::{
        env,
        path::{Path, PathBuf},
    };

    /// The default configuration file path.
    pub fn default_config_file() -> PathBuf {
        Path::new(&env::var("APPDATA").unwrap_or("C:\\ProgramData".to_owned()))
            .join("Quaver\\Config.toml")
    }
}

#[cfg(windows)]
pub use windows::*;

#[cfg(unix)]
mod unix {
    //! Unix-specific configuration parsing and management.

    use std::{
        env,
        path::{Path, PathBuf},
    };

    /// The default configuration file path.
    pub fn default_config_file() -> PathBuf {
        Path::new(&env::var("XDG_CONFIG_HOME").unwrap_or("/etc".to_owned()))
            .join("quaver/config.toml")
    }
}

#[cfg(unix)]
pub use unix::*;

/// The command line arguments.
#[derive(Debug, Parser, PartialEq, Eq, Clone)]
#[command(name = "Quaver", version, about, long_about = None)]
pub struct Args {
    /// Configuration file path.
    #[arg(short, long, help = "The configuration file path.", long_help = None)]
    pub config_file: Option<PathBuf>,
}

/// Errors that can occur while parsing the configuration file.
#[derive(Debug)]
pub enum LoadFileError {
    /// An I/O error occurred while reading the file.
    Io(io::Error),

    /// A TOML error occurred while parsing the file.
    Toml(toml::de::Error),
}

impl Display for LoadFileError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::Toml(err) => write!(f, "TOML error: {}", err),
        }
    }
}

impl error::Error for LoadFileError {}

/// The configuration of the bot.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// The token of the Discord bot.
    pub discord_token: Option<String>,

    /// The prefix that identifies text commands.
    pub command_prefix: Option<String>,
}

impl Config {
    /// Parse the configuration from a TOML string.
    pub fn from_str(data: &str) -> Result<Self, toml::de::Error> {
        toml::de::from_str(data)
    }

    /// Parse the configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadFileError> {
        let file_content = read_to_string(path).map_err(LoadFileError::Io)?;
        Self::from_str(&file_content).map_err(LoadFileError::Toml)
    }

    /// Overwrite configuration values that are empty with the ones from the environment.
    pub fn or_from_env(self) -> Self {
        // Get the Discord token from the environment.
        let discord_token = self
            .discord_token
            .or_else(|| env::var("QUAVER_DISCORD_TOKEN").ok())
            .or_else(|| env::var("DISCORD_TOKEN").ok());

        // Get the command prefix from the environment.
        let command_prefix = self
            .command_prefix
            .or_else(|| env::var("QUAVER_COMMAND_PREFIX").ok());

        Self {
            discord_token,
            command_prefix,
        }
    }
}

/// Try to load the configuration file.
pub fn load_configuration() -> Config {
    debug!("searching for the configuration file...");
    let args = Args::parse();

    let config_file = args
        .config_file
        .or(env::var("QUAVER_CONFIG_FILE").ok().map(PathBuf::from))
        .unwrap_or(default_config_file());

    debug!("loading the configuration file: {:?}", config_file);
    match Config::from_file(config_file) {
        Ok(v) => v,
        Err(e) => {
            warn!("failed to load the configuration file: {}", e);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let config = Config::from_str("discord_token = \"abc123\"\ncommand_prefix = \"?\"")
            .expect("valid TOML");

        assert_eq!(config.discord_token.as_deref(), Some("abc123"));
        assert_eq!(config.command_prefix.as_deref(), Some("?"));
    }

    #[test]
    fn missing_keys_stay_empty() {
        let config = Config::from_str("command_prefix = \"$\"").expect("valid TOML");

        assert_eq!(config.discord_token, None);
        assert_eq!(config.command_prefix.as_deref(), Some("$"));
    }

    #[test]
    fn empty_file_is_a_default_config() {
        let config = Config::from_str("").expect("valid TOML");

        assert_eq!(config, Config::default());
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(Config::from_str("discord_token = ").is_err());
    }
}
