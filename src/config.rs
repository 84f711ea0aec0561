use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;

/// Persisted defaults; command line flags override individual fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub number_of_words: usize,
    pub number_of_segments: usize,
    pub timeout_secs: Option<u64>,
    pub width: usize,
    pub word_list: String,
    pub skip_word: bool,
    pub backspace: bool,
    pub block_cursor: bool,
    pub show_wpm: bool,
    pub theme: String,
    pub bold: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_words: 50,
            number_of_segments: 1,
            timeout_secs: None,
            width: 80,
            word_list: "english_200".to_string(),
            skip_word: true,
            backspace: true,
            block_cursor: false,
            show_wpm: false,
            theme: "default".to_string(),
            bold: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    Block,
    Bar,
}

/// Behaviour switches for one typing session, fixed before play starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub skip_word: bool,
    pub allow_backspace: bool,
    pub cursor: CursorStyle,
    pub show_wpm: bool,
    pub timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::from(&Config::default())
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            skip_word: cfg.skip_word,
            allow_backspace: cfg.backspace,
            cursor: if cfg.block_cursor {
                CursorStyle::Block
            } else {
                CursorStyle::Bar
            },
            show_wpm: cfg.show_wpm,
            timeout: cfg.timeout_secs.map(Duration::from_secs),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_file(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no config file, using defaults");
                return Config::default();
            }
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring invalid config file");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
