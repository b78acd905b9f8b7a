// src/config/options.rs
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::consts::*;
use crate::error::{Error, Result};
use crate::file::ensure_directory;

/// Raw run options. Every field can come from the command line or its env var.
#[derive(Clone, Debug, Parser)]
#[command(name = "pv_logger", version, about = "Log solar dashboard metrics to CSV")]
pub struct Args {
    #[arg(long, env = "LOGIN_URL", default_value = DEFAULT_LOGIN_URL)]
    pub login_url: String,

    #[arg(long, env = "DASHBOARD_URL", default_value = DEFAULT_DASHBOARD_URL)]
    pub dashboard_url: String,

    #[arg(long, env = "PV_USERNAME", default_value = "", hide_env_values = true)]
    pub username: String,

    #[arg(long, env = "PV_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    #[arg(long, env = "USERNAME_SELECTOR", default_value = DEFAULT_USERNAME_SELECTOR)]
    pub username_selector: String,

    #[arg(long, env = "PASSWORD_SELECTOR", default_value = DEFAULT_PASSWORD_SELECTOR)]
    pub password_selector: String,

    #[arg(long, env = "SUBMIT_SELECTOR", default_value = DEFAULT_SUBMIT_SELECTOR)]
    pub submit_selector: String,

    #[arg(long, env = "TIME_SELECTOR", default_value = DEFAULT_TIME_SELECTOR)]
    pub time_selector: String,

    /// Comma-separated: sell, buy, consumption, self-consumption, generation.
    #[arg(long, env = "METRIC_SELECTORS", default_value = DEFAULT_METRIC_SELECTORS)]
    pub metric_selectors: String,

    #[arg(long, env = "PV_DATA_CSV", default_value = DEFAULT_DATA_CSV)]
    pub data_csv: PathBuf,

    #[arg(long, env = "PV_SNAPSHOT_HTML", default_value = DEFAULT_SNAPSHOT_HTML)]
    pub snapshot_html: PathBuf,

    /// Skip the static HTML snapshot stage.
    #[arg(long, env = "PV_NO_SNAPSHOT")]
    pub no_snapshot: bool,

    /// Chromium/Chrome executable.
    #[arg(long, env = "PV_BROWSER", default_value = DEFAULT_BROWSER)]
    pub browser: String,

    /// Extra browser flags, e.g. `--browser-arg=--no-sandbox`.
    #[arg(long = "browser-arg", env = "PV_BROWSER_ARGS", value_delimiter = ',', allow_hyphen_values = true)]
    pub browser_args: Vec<String>,

    #[arg(long, env = "PV_LOGIN_TIMEOUT_MS", default_value_t = DEFAULT_LOGIN_TIMEOUT_MS)]
    pub login_timeout_ms: u64,

    #[arg(long, env = "PV_NAV_TIMEOUT_MS", default_value_t = DEFAULT_NAV_TIMEOUT_MS)]
    pub nav_timeout_ms: u64,

    #[arg(long, env = "PV_SELECTOR_TIMEOUT_MS", default_value_t = DEFAULT_SELECTOR_TIMEOUT_MS)]
    pub selector_timeout_ms: u64,

    /// Pause after the dashboard loads so late widgets can fill in.
    #[arg(long, env = "PV_SETTLE_MS", default_value_t = DEFAULT_SETTLE_MS)]
    pub settle_ms: u64,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selectors {
    pub username: String,
    pub password: String,
    pub submit: String,
    pub time_label: String,
    /// Order is fixed: sell, buy, cons, self, gen. Extra entries are ignored.
    pub metrics: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeouts {
    pub login: Duration,
    pub navigation: Duration,
    pub selector_wait: Duration,
    pub settle: Duration,
}

/// Validated, immutable run configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub login_url: String,
    pub dashboard_url: String,
    pub credentials: Credentials,
    pub selectors: Selectors,
    pub data_csv: PathBuf,
    /// `None` when the renderer stage is off.
    pub snapshot_html: Option<PathBuf>,
    pub timeouts: Timeouts,
    pub browser: String,
    pub browser_args: Vec<String>,
}

impl Config {
    /// Resolve against the process environment (legacy credential fallback included).
    pub fn resolve(args: Args) -> Result<Self> {
        Self::resolve_with(args, |key| std::env::var(key).ok())
    }

    /// Validate `args` and create the storage directory.
    ///
    /// `lookup` supplies the legacy `USERNAME` / `PASSWORD` variables.
    pub fn resolve_with<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = fallback(args.username, LEGACY_USERNAME_VAR, &lookup);
        let password = fallback(args.password, LEGACY_PASSWORD_VAR, &lookup);
        if username.is_empty() || password.is_empty() {
            return Err(Error::config("PV_USERNAME/PV_PASSWORD not set"));
        }

        let metrics = split_selectors(&args.metric_selectors);
        if metrics.len() < MIN_METRIC_SELECTORS {
            return Err(Error::config(format!(
                "METRIC_SELECTORS needs {MIN_METRIC_SELECTORS} entries, got {}",
                metrics.len()
            )));
        }

        if let Some(dir) = args.data_csv.parent() {
            if !dir.as_os_str().is_empty() {
                ensure_directory(dir)?;
            }
        }

        Ok(Self {
            login_url: args.login_url,
            dashboard_url: args.dashboard_url,
            credentials: Credentials { username, password },
            selectors: Selectors {
                username: args.username_selector,
                password: args.password_selector,
                submit: args.submit_selector,
                time_label: args.time_selector,
                metrics,
            },
            data_csv: args.data_csv,
            snapshot_html: (!args.no_snapshot).then_some(args.snapshot_html),
            timeouts: Timeouts {
                login: Duration::from_millis(args.login_timeout_ms),
                navigation: Duration::from_millis(args.nav_timeout_ms),
                selector_wait: Duration::from_millis(args.selector_timeout_ms),
                settle: Duration::from_millis(args.settle_ms),
            },
            browser: args.browser,
            browser_args: args.browser_args,
        })
    }
}

fn fallback<F>(value: String, legacy_var: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !value.is_empty() {
        return value;
    }
    lookup(legacy_var).unwrap_or_default()
}

pub fn split_selectors(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_trims_and_drops_blanks() {
        assert_eq!(split_selectors(" a , b,,c "), vec!["a", "b", "c"]);
        assert!(split_selectors("").is_empty());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let c = Credentials { username: s!("u"), password: s!("hunter2") };
        let dbg = format!("{c:?}");
        assert!(dbg.contains("\"u\""));
        assert!(!dbg.contains("hunter2"));
    }
}
