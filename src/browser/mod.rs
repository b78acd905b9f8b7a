// src/browser/mod.rs
//! What the pipeline needs from a browser engine.
//!
//! The pipeline never talks to an engine directly; it drives a [`Browser`] page
//! produced by a [`Launcher`]. `cdp` provides the real one (headless Chromium over
//! the DevTools protocol); tests provide in-memory doubles.

pub mod cdp;
mod error;

use std::time::Duration;

pub use error::BrowserError;

/// Outcome of a bounded wait for an element. Expiry is not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorWait {
    Ready,
    TimedOut,
}

/// One page inside an isolated browsing context.
pub trait Browser {
    fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Replace the value of the input matched by `selector`.
    fn fill(&mut self, selector: &str, value: &str) -> Result<(), BrowserError>;

    fn click(&mut self, selector: &str) -> Result<(), BrowserError>;

    fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), BrowserError>;

    fn wait_for_selector(&mut self, selector: &str, timeout: Duration)
        -> Result<SelectorWait, BrowserError>;

    /// Rendered text of the first match, `None` when nothing matches.
    fn text_content(&mut self, selector: &str) -> Result<Option<String>, BrowserError>;

    /// Tear down the context and the engine. Must tolerate being called twice.
    fn close(&mut self) -> Result<(), BrowserError>;
}

/// Starts an engine and opens one page in a fresh context.
pub trait Launcher {
    type Page: Browser;

    fn launch(&self) -> Result<Self::Page, BrowserError>;
}
