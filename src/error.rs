// src/error.rs
use std::{io, path::PathBuf};

use thiserror::Error;

use crate::browser::BrowserError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can abort a run.
///
/// Recoverable conditions (missing elements, unparseable numbers or timestamps,
/// the selector-wait timeout) never surface here; they degrade to empty fields.
#[derive(Debug, Error)]
pub enum Error {
    /// Pre-flight validation failed. Nothing has touched the network yet.
    #[error("configuration error: {0}")]
    Config(String),

    /// The browser engine failed outside the tolerated selector wait.
    #[error("automation failure: {0}")]
    Automation(#[from] BrowserError),

    #[error("storage error on {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The existing log does not carry the fixed column order.
    #[error("log {path} has unexpected header {found:?}")]
    Schema { path: PathBuf, found: Vec<String> },

    #[error("snapshot render failed on {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
