// src/store.rs
use std::{fmt, fs, io, path::{Path, PathBuf}};

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::config::consts::STORE_SEP;
use crate::csv::{parse_rows, write_row};
use crate::error::{Error, Result};
use crate::file::{ensure_parent, write_with};

/// Fixed column order of the log. Never reorder.
pub const COLUMNS: [&str; 7] = [
    "page_time_jst",
    "scrape_time_jst",
    "sell_kwh",
    "buy_kwh",
    "cons_kwh",
    "self_kwh",
    "gen_kwh",
];

/// `2024-05-01T09:30+09:00`
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";

/// One stored line, cells in `COLUMNS` order, exactly as found on disk.
pub type Record = Vec<String>;

/// One observation. Timestamps are minute precision in the operating zone.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricRow {
    pub page_time_jst: DateTime<FixedOffset>,
    pub scrape_time_jst: DateTime<FixedOffset>,
    pub sell_kwh: Option<f64>,
    pub buy_kwh: Option<f64>,
    pub cons_kwh: Option<f64>,
    pub self_kwh: Option<f64>,
    pub gen_kwh: Option<f64>,
}

impl MetricRow {
    pub fn values(&self) -> [Option<f64>; 5] {
        [self.sell_kwh, self.buy_kwh, self.cons_kwh, self.self_kwh, self.gen_kwh]
    }

    pub fn to_record(&self) -> Record {
        let mut rec = Vec::with_capacity(COLUMNS.len());
        rec.push(format_time(&self.page_time_jst));
        rec.push(format_time(&self.scrape_time_jst));
        rec.extend(self.values().iter().map(|v| v.map(format_decimal).unwrap_or_default()));
        rec
    }

    /// Inverse of `to_record`. `None` if any cell is malformed.
    pub fn from_record(rec: &[String]) -> Option<Self> {
        if rec.len() != COLUMNS.len() {
            return None;
        }
        let time = |s: &str| DateTime::parse_from_str(s, TIME_FORMAT).ok();
        let value = |s: &str| -> Option<Option<f64>> {
            if s.is_empty() { Some(None) } else { s.parse().ok().map(Some) }
        };
        Some(Self {
            page_time_jst: time(&rec[0])?,
            scrape_time_jst: time(&rec[1])?,
            sell_kwh: value(&rec[2])?,
            buy_kwh: value(&rec[3])?,
            cons_kwh: value(&rec[4])?,
            self_kwh: value(&rec[5])?,
            gen_kwh: value(&rec[6])?,
        })
    }
}

impl fmt::Display for MetricRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rec = self.to_record();
        write!(f, "{{")?;
        for (i, (col, cell)) in COLUMNS.iter().zip(&rec).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let cell = if cell.is_empty() { "None" } else { cell.as_str() };
            write!(f, "{col}: {cell}")?;
        }
        write!(f, "}}")
    }
}

pub fn format_time(t: &DateTime<FixedOffset>) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// Shortest round-trip text, always with a fractional part (`0.0`, `1.2`).
pub fn format_decimal(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Append-only CSV log with a fixed header.
///
/// Appends are read-modify-write of the whole file and take no lock: a single
/// writer per store is assumed (the scheduler must not overlap runs).
#[derive(Clone, Debug)]
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// All stored records in append order. A missing file is an empty log.
    pub fn load_records(&self) -> Result<Vec<Record>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.storage(source)),
        };

        let mut rows = parse_rows(&text, STORE_SEP).into_iter();
        let Some(header) = rows.next() else {
            return Ok(Vec::new());
        };
        if header != COLUMNS {
            return Err(Error::Schema { path: self.path.clone(), found: header });
        }

        let records: Vec<Record> = rows.collect();
        if let Some(bad) = records.iter().find(|r| r.len() != COLUMNS.len()) {
            return Err(Error::Schema { path: self.path.clone(), found: bad.clone() });
        }
        Ok(records)
    }

    /// Typed view of `load_records`. Cells that no longer parse are a schema error.
    pub fn load(&self) -> Result<Vec<MetricRow>> {
        self.load_records()?
            .into_iter()
            .map(|rec| {
                MetricRow::from_record(&rec)
                    .ok_or_else(|| Error::Schema { path: self.path.clone(), found: rec })
            })
            .collect()
    }

    /// Add `row` at the end. Existing rows are rewritten unchanged; nothing is removed.
    pub fn append(&self, row: &MetricRow) -> Result<()> {
        let mut records = self.load_records()?;
        let existing = records.len();
        records.push(row.to_record());

        ensure_parent(&self.path)?;
        write_with(&self.path, |out| {
            write_row(&mut *out, &COLUMNS, STORE_SEP)?;
            for rec in &records {
                write_row(&mut *out, rec, STORE_SEP)?;
            }
            Ok(())
        })
        .map_err(|source| self.storage(source))?;

        debug!(path = %self.path.display(), rows = existing + 1, "log rewritten");
        Ok(())
    }

    fn storage(&self, source: io::Error) -> Error {
        Error::Storage { path: self.path.clone(), source }
    }
}
