// src/scrape/mod.rs
mod extract;
mod session;

pub use extract::{FieldExtractor, Label, RawExtract};
pub use session::SessionDriver;
