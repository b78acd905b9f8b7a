// src/runner.rs
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use tracing::warn;

use crate::{
    browser::{Launcher, SelectorWait},
    config::{Config, OperatingZone},
    error::Result,
    parse::ValueParser,
    progress::{Progress, Stage},
    scrape::{FieldExtractor, RawExtract, SessionDriver},
    snapshot::SnapshotRenderer,
    store::{LogStore, MetricRow},
};

/// What one run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub row: MetricRow,
    pub selector_wait: SelectorWait,
    pub snapshot: Option<PathBuf>,
}

/// Config → session → extract → parse → persist → (render). Strictly sequential.
pub struct Pipeline<L: Launcher> {
    config: Config,
    launcher: L,
    zone: OperatingZone,
}

impl<L: Launcher> Pipeline<L> {
    pub fn new(config: Config, launcher: L, zone: OperatingZone) -> Self {
        Self { config, launcher, zone }
    }

    /// Execute one run. `progress` can be None (no updates) or Some(&mut impl Progress).
    pub fn run(&self, mut progress: Option<&mut dyn Progress>) -> Result<RunSummary> {
        let result = self.run_stages(&mut progress);
        if let Some(p) = progress.as_deref_mut() {
            p.finish(result.is_ok());
        }
        result
    }

    fn run_stages(&self, progress: &mut Option<&mut dyn Progress>) -> Result<RunSummary> {
        let cfg = &self.config;
        enter(progress, Stage::Init);

        let (raw, selector_wait) = self.scrape(progress)?;
        let scrape_time = self.zone.now_minute();

        enter(progress, Stage::Parsing);
        let row = build_row(&raw, &ValueParser::new(self.zone), scrape_time);

        enter(progress, Stage::Persisting);
        let store = LogStore::new(&cfg.data_csv);
        store.append(&row)?;

        let snapshot = match &cfg.snapshot_html {
            Some(out) => {
                enter(progress, Stage::Rendering);
                SnapshotRenderer::new(self.zone).write(&store, out)?;
                Some(out.clone())
            }
            None => None,
        };

        enter(progress, Stage::Done);
        Ok(RunSummary { row, selector_wait, snapshot })
    }

    /// Browser half of the run. The session is released on every path out of here.
    fn scrape(&self, progress: &mut Option<&mut dyn Progress>) -> Result<(RawExtract, SelectorWait)> {
        let cfg = &self.config;
        let t = &cfg.timeouts;
        let mut session = SessionDriver::new(self.launcher.launch()?);

        enter(progress, Stage::Authenticating);
        session.authenticate(&cfg.login_url, &cfg.selectors, &cfg.credentials, t.login)?;

        enter(progress, Stage::Navigating);
        session.navigate(&cfg.dashboard_url, t.navigation)?;

        enter(progress, Stage::Awaiting);
        let selector_wait = match cfg.selectors.metrics.last() {
            Some(last) => session.await_selector(last, t.selector_wait)?,
            None => SelectorWait::Ready,
        };
        if selector_wait == SelectorWait::TimedOut {
            if let Some(p) = progress.as_deref_mut() {
                p.log("metrics not rendered in time; continuing with what is on the page");
            }
        }
        session.settle(t.settle);

        enter(progress, Stage::Extracting);
        let raw = FieldExtractor::new(&cfg.selectors.time_label, &cfg.selectors.metrics)
            .extract(session.page())?;

        if let Err(e) = session.close() {
            warn!("browser teardown: {e}");
        }
        Ok((raw, selector_wait))
    }
}

fn enter(progress: &mut Option<&mut dyn Progress>, stage: Stage) {
    if let Some(p) = progress.as_deref_mut() {
        p.stage(stage);
    }
}

/// Typed row from raw text. An unreadable page time falls back to `scrape_time`
/// (already truncated to the minute by the caller).
pub fn build_row(raw: &RawExtract, parser: &ValueParser, scrape_time: DateTime<FixedOffset>) -> MetricRow {
    let page_time = parser.timestamp(raw.page_time.as_deref()).unwrap_or_else(|| {
        warn!(raw = ?raw.page_time, "page time unreadable; using scrape time");
        scrape_time
    });

    MetricRow {
        page_time_jst: page_time,
        scrape_time_jst: scrape_time,
        sell_kwh: parser.number(raw.sell.as_deref()),
        buy_kwh: parser.number(raw.buy.as_deref()),
        cons_kwh: parser.number(raw.cons.as_deref()),
        self_kwh: parser.number(raw.self_cons.as_deref()),
        gen_kwh: parser.number(raw.generation.as_deref()),
    }
}
