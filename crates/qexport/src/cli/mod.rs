//! CLI functionality for the export tool
//!
//! - Running an export into a zip file
//! - Listing the reachable questions of a questionnaire
//! - Output formatting

#[cfg(feature = "cli")]
pub mod export;
#[cfg(feature = "cli")]
pub mod output;
#[cfg(feature = "cli")]
pub mod reachable;
