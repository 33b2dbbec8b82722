// Library surface for headless/integration tests and reuse.
// The binary in main.rs only wires the terminal and CLI around `app::App`.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod countdown;
pub mod error;
pub mod feedback;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod passage;
pub mod policy;
pub mod runtime;
pub mod theme;
pub mod time_series;
pub mod tracker;
pub mod ui;

pub use error::{Error, Result};
