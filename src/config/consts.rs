// src/config/consts.rs

// Site
pub const DEFAULT_LOGIN_URL: &str = "https://d1hcvh8gvguktg.cloudfront.net/login.html";
pub const DEFAULT_DASHBOARD_URL: &str = "https://d1hcvh8gvguktg.cloudfront.net/index.html";

// Selectors
pub const DEFAULT_USERNAME_SELECTOR: &str = "input[name='username']";
pub const DEFAULT_PASSWORD_SELECTOR: &str = "input[name='password']";
pub const DEFAULT_SUBMIT_SELECTOR: &str = ".login-btnArea button";
pub const DEFAULT_TIME_SELECTOR: &str = ".measurementWidget .updateTime";
pub const DEFAULT_METRIC_SELECTORS: &str = "span.value.todaySellPower,span.value.todayBuyPower,span.value.todayConsPower,span.value.todaySelfConsPower,span.value.todayGeneratedPower";
pub const MIN_METRIC_SELECTORS: usize = 5;

// Output
pub const DEFAULT_DATA_CSV: &str = "docs/data/pv_log.csv";
pub const DEFAULT_SNAPSHOT_HTML: &str = "docs/index.html";
pub const SNAPSHOT_MAX_ROWS: usize = 500;
pub const STORE_SEP: char = ',';

// Timing (ms)
pub const DEFAULT_LOGIN_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_NAV_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SELECTOR_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_SETTLE_MS: u64 = 5_000;

// Browser
pub const DEFAULT_BROWSER: &str = "chromium";

// Legacy credential variables, read when the PV_ ones are unset
pub const LEGACY_USERNAME_VAR: &str = "USERNAME";
pub const LEGACY_PASSWORD_VAR: &str = "PASSWORD";
