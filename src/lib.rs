// Library surface for the binary and the headless integration tests.
pub mod app_dirs;
pub mod config;
pub mod driver;
pub mod error;
pub mod input;
pub mod mistakes;
pub mod reflow;
pub mod runtime;
pub mod session;
pub mod snapshot;
pub mod sources;
pub mod stats;
pub mod theme;
pub mod time_series;
pub mod ui;

pub use error::{Error, Result};
