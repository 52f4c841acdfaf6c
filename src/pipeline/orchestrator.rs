use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::pool;

use super::config::PipelineConfig;
use super::extract::run_extract;
use super::load::run_load;
use super::source;
use super::transform::run_transform;
use super::types::{FailureKind, PipelineError, RunSummary};

/// Wires the three stages together and runs one batch to completion.
///
/// The stages run concurrently and hand items to each other over bounded
/// queues; queue closure is the only end-of-input signal between them.
/// Completion is the join of all three stage tasks, so it fires exactly
/// once and never before every spawned sub-task has finished. The optional
/// deadline converts a stalled run into an error instead of a hang.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline { config }
    }

    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();

        // Fail fast on unreadable sources before any stage starts.
        let expected = source::count_records(self.config.orders_path()).await?;
        info!(expected, "pre-scan counted input records");

        let products = Arc::new(source::load_reference_table(self.config.products_path()).await?);
        info!(products = products.len(), "reference table loaded");

        let pool_config = Arc::new(pool::Config::new(
            self.config.channel_capacity(),
            self.config.worker_num(),
        ));

        let (raw_tx, raw_rx) = mpsc::channel(self.config.channel_capacity());
        let (enriched_tx, enriched_rx) = mpsc::channel(self.config.channel_capacity());
        let (failure_tx, mut failure_rx) = mpsc::unbounded_channel();

        let extract_handle = tokio::spawn(run_extract(
            self.config.orders_path().to_path_buf(),
            raw_tx,
            failure_tx.clone(),
            cancel.clone(),
        ));
        let transform_handle = tokio::spawn(run_transform(
            products,
            raw_rx,
            enriched_tx,
            failure_tx.clone(),
            Arc::clone(&pool_config),
            cancel.clone(),
        ));
        let load_handle = tokio::spawn(run_load(
            self.config.report_path().to_path_buf(),
            enriched_rx,
            pool_config,
            cancel.clone(),
        ));
        drop(failure_tx);

        let stages = async {
            let (extract, transformed, load) =
                futures::future::join3(extract_handle, transform_handle, load_handle).await;
            Ok::<_, PipelineError>((extract??, transformed??, load??))
        };

        let (extract, transformed, load) = match self.config.deadline() {
            Some(deadline) => match tokio::time::timeout(deadline, stages).await {
                Ok(result) => result?,
                Err(_) => {
                    cancel.cancel();
                    return Err(PipelineError::DeadlineElapsed(deadline));
                }
            },
            None => stages.await?,
        };

        let mut failures = Vec::new();
        while let Some(failure) = failure_rx.recv().await {
            failures.push(failure);
        }

        let parsed = extract.published + extract.malformed;
        if parsed != expected {
            // The pre-scan counts newlines, not records, so drift here is
            // expected for e.g. a final record without a terminator.
            warn!(expected, parsed, "pre-scan estimate differs from parsed record count");
        }

        if transformed != extract.published {
            return Err(PipelineError::CompletionMismatch {
                stage: "transform",
                expected: extract.published,
                finished: transformed,
            });
        }

        let missing = failures
            .iter()
            .filter(|f| f.kind == FailureKind::MissingReference)
            .count();
        let expected_rows = extract.published - missing;
        if load.finished != expected_rows || load.written != expected_rows {
            return Err(PipelineError::CompletionMismatch {
                stage: "load",
                expected: expected_rows,
                finished: load.written,
            });
        }

        let summary = RunSummary {
            expected,
            published: extract.published,
            loaded: load.written,
            failures,
            elapsed: started.elapsed(),
        };
        info!(
            published = summary.published,
            loaded = summary.loaded,
            failed = summary.failures.len(),
            elapsed = ?summary.elapsed,
            "pipeline completed"
        );
        Ok(summary)
    }
}
