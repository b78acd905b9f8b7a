// tests/common/mod.rs
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};

use pv_logger::browser::{Browser, BrowserError, Launcher, SelectorWait};
use pv_logger::config::{Args, Config};
use pv_logger::store::{MetricRow, TIME_FORMAT};

use clap::{CommandFactory, FromArgMatches};

pub fn jst(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_str(s, TIME_FORMAT).unwrap()
}

pub fn row(minute: u32, sell: Option<f64>) -> MetricRow {
    let t = jst(&format!("2024-05-01T09:{minute:02}+09:00"));
    MetricRow {
        page_time_jst: t,
        scrape_time_jst: t,
        sell_kwh: sell,
        buy_kwh: Some(0.0),
        cons_kwh: None,
        self_kwh: Some(0.5),
        gen_kwh: Some(4.1),
    }
}

/// Parse `argv` with every `env` fallback switched off, so exported variables on the
/// host cannot change what a test sees.
pub fn parse_args<I, T>(argv: I) -> Args
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Args::command()
        .mut_args(|arg| arg.env(None::<&'static str>))
        .try_get_matches_from(argv)
        .unwrap();
    Args::from_arg_matches(&matches).unwrap()
}

/// Config pointing at `dir`, with no settle delay.
pub fn config_in(dir: &Path, extra: &[&str]) -> Config {
    let data = dir.join("data/pv_log.csv");
    let html = dir.join("index.html");
    let mut argv = vec![
        "pv_logger".to_string(),
        "--username".into(), "user".into(),
        "--password".into(), "secret".into(),
        format!("--data-csv={}", data.display()),
        format!("--snapshot-html={}", html.display()),
        "--settle-ms=0".into(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    Config::resolve_with(parse_args(argv), |_| None).unwrap()
}

/// Everything the fake page was asked to do.
#[derive(Debug, Default)]
pub struct Journal {
    pub calls: Vec<String>,
    pub closed: usize,
}

/// In-memory page: selector → text. Failures can be injected per operation.
#[derive(Clone, Default)]
pub struct FakePage {
    pub texts: HashMap<String, String>,
    pub wait_times_out: bool,
    pub fail_goto: Option<String>,
    pub fail_text: bool,
    pub journal: Rc<RefCell<Journal>>,
}

impl FakePage {
    pub fn with(mut self, selector: &str, text: &str) -> Self {
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    fn note(&self, call: String) {
        self.journal.borrow_mut().calls.push(call);
    }
}

impl Browser for FakePage {
    fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.note(format!("goto {url}"));
        match &self.fail_goto {
            Some(bad) if bad == url => Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".into(),
            }),
            _ => Ok(()),
        }
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<(), BrowserError> {
        self.note(format!("fill {selector}={value}"));
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        self.note(format!("click {selector}"));
        Ok(())
    }

    fn wait_for_network_idle(&mut self, _timeout: Duration) -> Result<(), BrowserError> {
        self.note("idle".into());
        Ok(())
    }

    fn wait_for_selector(&mut self, selector: &str, _timeout: Duration) -> Result<SelectorWait, BrowserError> {
        self.note(format!("wait {selector}"));
        Ok(if self.wait_times_out { SelectorWait::TimedOut } else { SelectorWait::Ready })
    }

    fn text_content(&mut self, selector: &str) -> Result<Option<String>, BrowserError> {
        if self.fail_text {
            return Err(BrowserError::JavaScript("context destroyed".into()));
        }
        Ok(self.texts.get(selector).cloned())
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        self.journal.borrow_mut().closed += 1;
        Ok(())
    }
}

/// Hands out clones of one prepared page.
pub struct FakeLauncher(pub FakePage);

impl Launcher for FakeLauncher {
    type Page = FakePage;

    fn launch(&self) -> Result<FakePage, BrowserError> {
        Ok(self.0.clone())
    }
}
