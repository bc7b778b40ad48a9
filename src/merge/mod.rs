//! Merge engine for combining tables

mod append;
mod join;
mod progress;
mod update;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ConflictPolicy, MergeConfig, MergeStrategy};
use crate::error::{MergeError, Result};
use crate::model::Table;

pub use progress::{NoProgress, ProgressSink};

use progress::Progress;

/// Statistics about a merge
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Row count of every input table, in input order
    pub input_rows: Vec<usize>,
    pub output_rows: usize,
    pub output_columns: usize,
    /// Rows removed because their key (or full row) was already present
    pub duplicates_dropped: usize,
    /// Existing rows overwritten by the update strategy
    pub rows_updated: usize,
    /// Rows the update strategy added because their key was new
    pub rows_appended: usize,
}

impl MergeStats {
    pub fn total_input_rows(&self) -> usize {
        self.input_rows.iter().sum()
    }
}

/// Result of merging tables
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub table: Table,
    pub stats: MergeStats,
}

/// Main merge engine
pub struct MergeEngine {
    config: MergeConfig,
}

impl MergeEngine {
    /// Create a new merge engine with configuration
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    /// Merge `tables` without progress reporting
    pub fn merge(&self, tables: &[Table]) -> Result<MergeResult> {
        self.merge_with_progress(tables, &mut NoProgress)
    }

    /// Merge `tables`, reporting after each input table is folded in
    pub fn merge_with_progress(
        &self,
        tables: &[Table],
        sink: &mut dyn ProgressSink,
    ) -> Result<MergeResult> {
        self.validate(tables)?;

        let key = self.config.key_column.as_deref();
        let policy = self.config.conflict_policy;
        info!(
            tables = tables.len(),
            strategy = %self.config.strategy,
            policy = %policy,
            key = key.unwrap_or("-"),
            "merging tables"
        );

        let mut stats = MergeStats {
            input_rows: tables.iter().map(Table::row_count).collect(),
            ..Default::default()
        };
        let mut progress = Progress::new(sink, tables.len());

        let mut table = match self.config.strategy {
            MergeStrategy::Append => {
                let mut table = append::concat(tables, &mut progress);
                if let Some(key) = key {
                    stats.duplicates_dropped = append::drop_duplicates(
                        &mut table,
                        Some(key),
                        policy == ConflictPolicy::KeepLast,
                    );
                }
                table
            }
            MergeStrategy::Union => {
                let mut table = append::concat(tables, &mut progress);
                stats.duplicates_dropped = append::drop_duplicates(&mut table, key, false);
                table
            }
            MergeStrategy::Intersection => join::intersect(tables, key, &mut progress)?,
            MergeStrategy::Update => match key {
                Some(key) => update::update(tables, key, policy, &mut stats, &mut progress),
                None => append::concat(tables, &mut progress),
            },
        };

        progress.finish();
        table.infer_column_types();

        stats.output_rows = table.row_count();
        stats.output_columns = table.column_count();
        info!(
            input_rows = stats.total_input_rows(),
            output_rows = stats.output_rows,
            duplicates_dropped = stats.duplicates_dropped,
            rows_updated = stats.rows_updated,
            "merge complete"
        );

        Ok(MergeResult { table, stats })
    }

    /// Reject configurations the engine cannot honour before doing any work
    fn validate(&self, tables: &[Table]) -> Result<()> {
        if tables.len() < 2 {
            return Err(MergeError::EmptyInput {
                found: tables.len(),
            });
        }

        let Some(key) = self.config.key_column.as_deref() else {
            return Ok(());
        };

        let strategy = self.config.strategy;
        match strategy {
            MergeStrategy::Append | MergeStrategy::Union => {
                if !tables[0].has_column(key) {
                    return Err(MergeError::MissingKeyColumn {
                        column: key.to_string(),
                        table: 0,
                    });
                }
            }
            MergeStrategy::Intersection | MergeStrategy::Update => {
                if let Some(missing) = tables.iter().position(|t| !t.has_column(key)) {
                    return Err(MergeError::MissingKeyColumn {
                        column: key.to_string(),
                        table: missing,
                    });
                }
            }
        }

        let policy = self.config.conflict_policy;
        let consults_policy = matches!(strategy, MergeStrategy::Append | MergeStrategy::Update);
        if consults_policy && !policy.is_supported() {
            return Err(MergeError::UnimplementedPolicy { policy });
        }

        debug!(key, %strategy, "merge configuration validated");
        Ok(())
    }
}

/// Convenience function to merge tables with a configuration
pub fn merge(tables: &[Table], config: &MergeConfig) -> Result<MergeResult> {
    MergeEngine::new(config.clone()).merge(tables)
}
