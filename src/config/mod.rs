// src/config/mod.rs
pub mod consts;
pub mod options;
pub mod zone;

pub use options::{Args, Config, Credentials, Selectors, Timeouts};
pub use zone::OperatingZone;
