// src/scrape/session.rs
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::browser::{Browser, BrowserError, SelectorWait};
use crate::config::{Credentials, Selectors};

/// Owns the page for one run and guarantees the engine is released.
///
/// `close` is the normal exit; if the driver is dropped early (an error bubbled up
/// through `?`, or a panic unwound) `Drop` closes the page instead.
pub struct SessionDriver<B: Browser> {
    page: B,
    closed: bool,
}

impl<B: Browser> SessionDriver<B> {
    pub fn new(page: B) -> Self {
        Self { page, closed: false }
    }

    /// Open the login page, submit credentials, wait for the network to settle.
    pub fn authenticate(
        &mut self,
        login_url: &str,
        selectors: &Selectors,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        info!(url = %login_url, "logging in");
        self.page.goto(login_url, timeout)?;
        self.page.fill(&selectors.username, &credentials.username)?;
        self.page.fill(&selectors.password, &credentials.password)?;
        self.page.click(&selectors.submit)?;
        self.page.wait_for_network_idle(timeout)
    }

    pub fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        info!(%url, "opening dashboard");
        self.page.goto(url, timeout)
    }

    /// Best-effort wait. `TimedOut` is reported, not raised; only engine faults are errors.
    pub fn await_selector(&mut self, selector: &str, timeout: Duration)
        -> Result<SelectorWait, BrowserError>
    {
        let outcome = self.page.wait_for_selector(selector, timeout)?;
        match outcome {
            SelectorWait::Ready => debug!(%selector, "selector ready"),
            SelectorWait::TimedOut => {
                warn!(%selector, ?timeout, "selector did not appear; extracting anyway")
            }
        }
        Ok(outcome)
    }

    /// Fixed pause so late widgets can populate.
    pub fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            debug!(?delay, "settling");
            thread::sleep(delay);
        }
    }

    pub fn page(&mut self) -> &mut B {
        &mut self.page
    }

    pub fn close(mut self) -> Result<(), BrowserError> {
        self.closed = true;
        self.page.close()
    }
}

impl<B: Browser> Drop for SessionDriver<B> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.page.close() {
            warn!("browser teardown: {e}");
        }
    }
}
