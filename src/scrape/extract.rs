// src/scrape/extract.rs
use tracing::{debug, warn};

use crate::browser::{Browser, BrowserError};

/// Names of the raw fragments pulled from the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    PageTime,
    Sell,
    Buy,
    Cons,
    SelfCons,
    Gen,
}

impl Label {
    /// Metric labels in selector order.
    pub const METRICS: [Label; 5] = [Label::Sell, Label::Buy, Label::Cons, Label::SelfCons, Label::Gen];

    pub fn key(self) -> &'static str {
        match self {
            Label::PageTime => "page_time",
            Label::Sell => "sell",
            Label::Buy => "buy",
            Label::Cons => "cons",
            Label::SelfCons => "self",
            Label::Gen => "gen",
        }
    }
}

/// Unvalidated text per label; `None` when the element was not on the page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawExtract {
    pub page_time: Option<String>,
    pub sell: Option<String>,
    pub buy: Option<String>,
    pub cons: Option<String>,
    pub self_cons: Option<String>,
    pub generation: Option<String>,
}

impl RawExtract {
    pub fn set(&mut self, label: Label, text: Option<String>) {
        *self.slot_mut(label) = text;
    }

    fn slot_mut(&mut self, label: Label) -> &mut Option<String> {
        match label {
            Label::PageTime => &mut self.page_time,
            Label::Sell => &mut self.sell,
            Label::Buy => &mut self.buy,
            Label::Cons => &mut self.cons,
            Label::SelfCons => &mut self.self_cons,
            Label::Gen => &mut self.generation,
        }
    }
}

/// Reads the time label and the metric selectors off a loaded dashboard.
#[derive(Clone, Debug)]
pub struct FieldExtractor<'a> {
    time_selector: &'a str,
    metric_selectors: &'a [String],
}

impl<'a> FieldExtractor<'a> {
    /// `metric_selectors` pair with [`Label::METRICS`]; entries past the fifth are ignored.
    pub fn new(time_selector: &'a str, metric_selectors: &'a [String]) -> Self {
        Self { time_selector, metric_selectors }
    }

    /// A missing element yields `None` for its label. Only engine faults are errors.
    pub fn extract<B: Browser>(&self, page: &mut B) -> Result<RawExtract, BrowserError> {
        let mut raw = RawExtract::default();
        raw.set(Label::PageTime, read(page, Label::PageTime, self.time_selector)?);
        for (label, selector) in Label::METRICS.into_iter().zip(self.metric_selectors) {
            raw.set(label, read(page, label, selector)?);
        }
        Ok(raw)
    }
}

fn read<B: Browser>(page: &mut B, label: Label, selector: &str) -> Result<Option<String>, BrowserError> {
    let text = page.text_content(selector)?.map(|t| t.trim().to_string());
    match &text {
        Some(t) => debug!(label = label.key(), text = %t, "extracted"),
        None => warn!(label = label.key(), %selector, "element not found"),
    }
    Ok(text)
}
