//! Search orchestrator: concurrent fan-out, deadlines, dedup.
//!
//! This module fans a query out to every registered adapter concurrently,
//! each under its own deadline, merges whatever came back and deduplicates
//! by normalised URL.

pub mod dedup;
pub mod fanout;
pub mod url_normalize;

pub use fanout::{aggregate, fan_out, EngineReport, FanOut};
