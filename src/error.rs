use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a run before or during a test.
///
/// Everything except `Io` and `EventsClosed` is a configuration problem: no session can start,
/// so the binary reports it once and exits non-zero.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} does not appear to be a valid word list, try `--list words` to see the available lists")]
    UnknownWordList(String),

    #[error("{0} does not appear to be a valid quote file, try `--list quotes` to see the available files")]
    UnknownQuoteFile(String),

    #[error("{0} does not appear to be a valid theme, try `--list themes` to see the available themes")]
    UnknownTheme(String),

    #[error("theme color `{key}` is not defined or not a valid hex color: {value:?}")]
    InvalidColor { key: &'static str, value: String },

    #[error("error parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no text available from {0}")]
    EmptySource(String),

    #[error("terminal event stream closed")]
    EventsClosed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
