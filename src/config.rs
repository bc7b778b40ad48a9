//! Configuration handling for csvmerge

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How the input tables are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Concatenate all rows in input order
    #[default]
    Append,
    /// Concatenate, then drop duplicate rows (or duplicate keys)
    Union,
    /// Keep only records present in every table (inner join)
    Intersection,
    /// Update existing records by key and append new ones
    Update,
}

impl std::str::FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "append" => Ok(MergeStrategy::Append),
            "union" => Ok(MergeStrategy::Union),
            "intersection" | "intersect" => Ok(MergeStrategy::Intersection),
            "update" => Ok(MergeStrategy::Update),
            _ => Err(format!("Unknown merge strategy: {}", s)),
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Append => write!(f, "append"),
            MergeStrategy::Union => write!(f, "union"),
            MergeStrategy::Intersection => write!(f, "intersection"),
            MergeStrategy::Update => write!(f, "update"),
        }
    }
}

/// Rule for resolving rows that share a key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Keep the first occurrence, ignore later ones
    #[default]
    KeepFirst,
    /// Keep (or update to) the last occurrence
    KeepLast,
    /// Keep the longer value; semantics not defined yet
    KeepLonger,
    /// Merge conflicting values; semantics not defined yet
    MergeValues,
}

impl ConflictPolicy {
    /// Whether the merge engine knows how to apply this policy
    pub fn is_supported(self) -> bool {
        matches!(self, ConflictPolicy::KeepFirst | ConflictPolicy::KeepLast)
    }
}

impl std::str::FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "keep-first" | "first" => Ok(ConflictPolicy::KeepFirst),
            "keep-last" | "last" => Ok(ConflictPolicy::KeepLast),
            "keep-longer" | "longer" => Ok(ConflictPolicy::KeepLonger),
            "merge-values" | "merge" => Ok(ConflictPolicy::MergeValues),
            _ => Err(format!("Unknown conflict policy: {}", s)),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::KeepFirst => write!(f, "keep-first"),
            ConflictPolicy::KeepLast => write!(f, "keep-last"),
            ConflictPolicy::KeepLonger => write!(f, "keep-longer"),
            ConflictPolicy::MergeValues => write!(f, "merge-values"),
        }
    }
}

/// Options consumed by the merge engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    pub strategy: MergeStrategy,
    pub conflict_policy: ConflictPolicy,
    /// Column identifying the same logical record across tables
    pub key_column: Option<String>,
}

impl MergeConfig {
    pub fn new(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }
}

/// Output format for merge results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Delimited text with a header row
    #[default]
    Csv,
    /// Summary plus the first rows as a terminal table
    Preview,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "preview" | "terminal" => Ok(OutputFormat::Preview),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Number of rows shown by the terminal preview unless overridden
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

/// Configuration for a complete load, merge and export run
#[derive(Debug, Clone)]
pub struct Config {
    /// Files to merge, in order
    pub input_files: Vec<PathBuf>,
    /// Strategy, conflict policy and key column
    pub merge: MergeConfig,
    /// Output format
    pub output_format: OutputFormat,
    /// Where to write the result; stdout when unset
    pub output_file: Option<PathBuf>,
    /// Rows shown by the preview output
    pub preview_rows: usize,
    /// Input delimiter; auto-detected when unset
    pub delimiter: Option<u8>,
    /// Delimiter used when writing CSV output
    pub output_delimiter: u8,
    /// Only print statistics, not the merged rows
    pub stats_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_files: Vec::new(),
            merge: MergeConfig::default(),
            output_format: OutputFormat::default(),
            output_file: None,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            delimiter: None,
            output_delimiter: b',',
            stats_only: false,
        }
    }
}

impl Config {
    /// Create a new Config with input file paths
    pub fn new(input_files: Vec<PathBuf>) -> Self {
        Self {
            input_files,
            ..Default::default()
        }
    }

    pub fn with_merge(mut self, merge: MergeConfig) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_output_file(mut self, path: PathBuf) -> Self {
        self.output_file = Some(path);
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// Force the input delimiter instead of sniffing it
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_output_delimiter(mut self, delimiter: u8) -> Self {
        self.output_delimiter = delimiter;
        self
    }

    pub fn with_stats_only(mut self, stats_only: bool) -> Self {
        self.stats_only = stats_only;
        self
    }
}
