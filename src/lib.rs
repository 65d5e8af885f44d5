//! # companion
//!
//! Command-line front end for [`companion_search`]: configuration files,
//! logging setup and result rendering around the fan-out aggregator.
//!
//! The search engine itself lives in the `companion-search` workspace
//! member; this crate only wires it to a process.

pub mod companion_dirs;
pub mod config;
pub mod error;
pub mod interactive;
pub mod logging;
pub mod web_search;

pub use config::{CompanionConfig, LoggingConfig, OutputConfig};
pub use error::{CompanionError, Result};
pub use web_search::render_summary;
