// src/progress.rs
use std::fmt;

use tracing::info;

/// Run state machine. Stages are entered strictly in this order; `Rendering` is optional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    Authenticating,
    Navigating,
    Awaiting,
    Extracting,
    Parsing,
    Persisting,
    Rendering,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::Authenticating => "authenticating",
            Stage::Navigating => "navigating",
            Stage::Awaiting => "awaiting",
            Stage::Extracting => "extracting",
            Stage::Parsing => "parsing",
            Stage::Persisting => "persisting",
            Stage::Rendering => "rendering",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Lightweight progress reporting for a run.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Entered `stage`.
    fn stage(&mut self, _stage: Stage) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self, _ok: bool) {}
}

/// Forwards everything to `tracing`.
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn stage(&mut self, stage: Stage) {
        info!(%stage, "stage");
    }
    fn log(&mut self, msg: &str) {
        info!("{msg}");
    }
    fn finish(&mut self, ok: bool) {
        info!(ok, "run finished");
    }
}
