use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typist";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_file() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("typist_config.json"))
    }

    /// Directory holding user supplied `words/`, `quotes/` and `themes/`.
    pub fn data_dir() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("TYPIST_DATA_DIR") {
            return Some(PathBuf::from(dir));
        }
        ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_dir().to_path_buf())
    }
}
