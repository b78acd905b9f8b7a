// src/snapshot.rs
//! Static HTML view of the most recent log rows.
//!
//! The page is regenerated wholesale on every run. Given the same log contents the
//! output differs only in the generation stamp.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::config::OperatingZone;
use crate::config::consts::SNAPSHOT_MAX_ROWS;
use crate::core::sanitize::escape_html;
use crate::error::{Error, Result};
use crate::file::{ensure_parent, write_with};
use crate::store::{COLUMNS, LogStore, Record};

pub const PLACEHOLDER: &str = "—";
pub const NO_DATA: &str = "<p>CSVがまだありません。</p>";
pub const DISCLAIMER: &str =
    "※ CSV/HTML はスケジュール実行で更新。最新を見るにはページを再読み込みしてください。";
pub const STYLESHEET: &str = "./style.css";
const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Clone, Debug)]
pub struct SnapshotRenderer {
    zone: OperatingZone,
    max_rows: usize,
}

impl SnapshotRenderer {
    pub fn new(zone: OperatingZone) -> Self {
        Self { zone, max_rows: SNAPSHOT_MAX_ROWS }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Read `store` and write the page to `out`, stamped with the current time.
    pub fn write(&self, store: &LogStore, out: &Path) -> Result<()> {
        let records = store.load_records()?;
        let html = self.render(&store.path().display().to_string(), &records, self.zone.now());

        let render_err = |source| Error::Render { path: out.to_path_buf(), source };
        ensure_parent(out)?;
        write_with(out, |w| w.write_all(html.as_bytes())).map_err(render_err)?;

        info!(path = %out.display(), rows = records.len().min(self.max_rows), "snapshot written");
        Ok(())
    }

    /// Pure render. `source` names the log in the card heading.
    pub fn render(&self, source: &str, records: &[Record], generated_at: DateTime<FixedOffset>) -> String {
        let recent = tail(records, self.max_rows);
        let last_updated = recent
            .last()
            .and_then(|r| r.first())
            .map(|t| escape_html(t))
            .unwrap_or_else(|| s!(PLACEHOLDER));
        let table = if recent.is_empty() { s!(NO_DATA) } else { render_table(recent) };
        let generated = generated_at.format(GENERATED_FORMAT);
        let source = escape_html(source);

        format!(
            r#"<!doctype html>
<html lang="ja"><head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="robots" content="noindex,nofollow">
<title>PV Logger — 直近ログ</title>
<link rel="stylesheet" href="{STYLESHEET}">
</head><body>
<header>
  <div class="title">PV Logger</div>
  <div class="subtitle">最終更新: <span>{last_updated}</span>（生成: {generated}）</div>
</header>
<main>
  <div class="card">
    <h2>直近ログ（{source}）</h2>
    {table}
    <p class="muted">{DISCLAIMER}</p>
  </div>
</main>
</body></html>"#
        )
    }
}

/// Last `n` records, original order kept.
fn tail(records: &[Record], n: usize) -> &[Record] {
    &records[records.len().saturating_sub(n)..]
}

fn render_table(records: &[Record]) -> String {
    let mut out = s!("<table border=\"0\" class=\"dataframe\">\n  <thead>\n    <tr style=\"text-align: right;\">\n");
    for col in COLUMNS {
        let _ = writeln!(out, "      <th>{col}</th>");
    }
    out.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for rec in records {
        out.push_str("    <tr>\n");
        for cell in rec {
            let _ = writeln!(out, "      <td>{}</td>", escape_html(cell));
        }
        out.push_str("    </tr>\n");
    }
    out.push_str("  </tbody>\n</table>");
    out
}
