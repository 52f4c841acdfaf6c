use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::pool::PoolError;

/// One input record flowing through the pipeline.
///
/// Built by the extractor with zeroed cost/price, filled exactly once by an
/// enrichment task, read-only afterwards. Ownership moves stage to stage via
/// the hand-off queues, so no two tasks ever hold the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub customer_number: i64,
    pub part_number: String,
    pub quantity: u32,
    pub unit_cost: f64,
    pub unit_price: f64,
}

impl Order {
    pub fn new(customer_number: i64, part_number: String, quantity: u32) -> Self {
        Order {
            customer_number,
            part_number,
            quantity,
            unit_cost: 0.0,
            unit_price: 0.0,
        }
    }

    /// Line-item cost: unit cost times quantity.
    pub fn total_cost(&self) -> f64 {
        self.unit_cost * f64::from(self.quantity)
    }

    /// Line-item price: unit price times quantity.
    pub fn total_price(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// One reference-table entry mapping a part number to its pricing data.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub part_number: String,
    pub unit_cost: f64,
    pub unit_price: f64,
}

/// Fatal errors that abort the whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An input, reference, or output file could not be opened.
    #[error("cannot open {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reference table could not be parsed into products.
    #[error("reference table {} is malformed", path.display())]
    ReferenceLoad {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The run did not complete before the configured deadline.
    #[error("pipeline deadline of {0:?} elapsed before completion")]
    DeadlineElapsed(Duration),

    /// A stage's completion tracker disagrees with the number of items it
    /// was handed.
    #[error("{stage} completion mismatch: expected {expected}, finished {finished}")]
    CompletionMismatch {
        stage: &'static str,
        expected: usize,
        finished: usize,
    },

    /// A worker pool failed.
    #[error("worker pool failed")]
    Pool(#[from] PoolError),

    /// Writing the report failed.
    #[error("report write failed")]
    Io(#[from] std::io::Error),

    /// A stage task panicked or was aborted.
    #[error("stage task failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Classifies per-item failures for the final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A record could not be parsed into the expected fields/types.
    MalformedRecord,
    /// An order's part number has no entry in the reference table.
    MissingReference,
}

/// A per-item failure, recorded against the item and reported at the end of
/// the run without aborting sibling items.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub kind: FailureKind,
    /// Source line of the offending record, when known.
    pub line: Option<u64>,
    /// Part number of the offending order, when known.
    pub part_number: Option<String>,
    pub detail: String,
}

impl ItemFailure {
    pub(crate) fn malformed(line: Option<u64>, detail: String) -> Self {
        ItemFailure {
            kind: FailureKind::MalformedRecord,
            line,
            part_number: None,
            detail,
        }
    }

    pub(crate) fn missing_reference(order: &Order) -> Self {
        ItemFailure {
            kind: FailureKind::MissingReference,
            line: None,
            part_number: Some(order.part_number.clone()),
            detail: format!("part {} not in reference table", order.part_number),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// Record count the pre-scan expected (advisory).
    pub expected: usize,
    /// Orders the extractor published.
    pub published: usize,
    /// Rows written to the report.
    pub loaded: usize,
    /// Per-item failures, in no particular order.
    pub failures: Vec<ItemFailure>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Number of recorded failures of the given kind.
    pub fn failed(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }

    /// True when every record made it into the report.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub(crate) struct ExtractStats {
    pub(crate) published: usize,
    pub(crate) malformed: usize,
}

#[derive(Debug)]
pub(crate) struct LoadStats {
    pub(crate) finished: usize,
    pub(crate) written: usize,
}
