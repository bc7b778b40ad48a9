//! csvmerge - Merge tabular data files
//!
//! Loads several delimited text (or JSON) files and combines them into one
//! table with an append, union, intersection or keyed update strategy.

pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod output;
pub mod parser;

pub use config::{Config, ConflictPolicy, MergeConfig, MergeStrategy};
pub use error::MergeError;
pub use merge::{merge, MergeEngine, MergeResult};
pub use model::Table;
