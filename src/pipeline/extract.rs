use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::source;
use super::types::{ExtractStats, ItemFailure, Order, PipelineError};

/// Extraction stage: reads the order input and publishes one `Order` per
/// valid record to the extraction queue.
///
/// Dropping the sender on return closes the queue; that close is the sole
/// end-of-input signal the transformer relies on.
pub(crate) async fn run_extract(
    path: PathBuf,
    tx: mpsc::Sender<Order>,
    failures: mpsc::UnboundedSender<ItemFailure>,
    cancel: CancellationToken,
) -> Result<ExtractStats, PipelineError> {
    let stats =
        tokio::task::spawn_blocking(move || source::read_orders(&path, &tx, &failures, &cancel))
            .await??;

    info!(
        published = stats.published,
        malformed = stats.malformed,
        "extract finished, extraction queue closed"
    );
    Ok(stats)
}
