use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::pool::{Config, PoolError, WorkerPool};

use super::types::{LoadStats, Order, PipelineError};

/// Load stage: formats each enriched order and appends one report row.
///
/// Row formatting runs on a bounded worker pool, but every formatted line
/// goes through a single dedicated writer task so destination access is
/// serialized. The writer flushes before the stage reports its counts.
pub(crate) async fn run_load(
    path: PathBuf,
    mut rx: mpsc::Receiver<Order>,
    pool_config: Arc<Config>,
    cancel: CancellationToken,
) -> Result<LoadStats, PipelineError> {
    let file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| PipelineError::SourceUnavailable {
            path: path.clone(),
            source: e,
        })?;
    let mut writer = tokio::io::BufWriter::new(file);
    writer.write_all(header().as_bytes()).await?;

    let (line_tx, mut line_rx) = mpsc::channel::<String>(pool_config.capacity());
    let writer_handle = tokio::spawn(async move {
        let mut written = 0usize;
        while let Some(line) = line_rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            written += 1;
        }
        writer.flush().await?;
        Ok::<usize, std::io::Error>(written)
    });

    let pool: WorkerPool<Order> = WorkerPool::new(pool_config);

    let processor = move |_ctx: &CancellationToken, order: Order| {
        let line_tx = line_tx.clone();
        async move {
            let line = format_row(&order);
            line_tx
                .send(line)
                .await
                .map_err(|_| PoolError::QueueClosed)?;
            Ok(())
        }
    };

    let pool_clone = pool.clone();
    let run_cancel = cancel.clone();
    let run_handle = tokio::spawn(async move { pool_clone.run(&run_cancel, processor).await });

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            item = rx.recv() => {
                match item {
                    Some(order) => pool.consume(order).await?,
                    None => break,
                }
            }
        }
    }
    pool.close();

    // Join the pool first so every line_tx clone is gone and the writer can
    // drain to completion. A destination I/O error outranks a pool error.
    let run_result = run_handle.await?;
    let written = writer_handle.await??;
    let finished = run_result?;

    info!(finished, written, "load finished");
    Ok(LoadStats { finished, written })
}

pub(crate) fn header() -> String {
    format!(
        "{:>20}{:>15}{:>12}{:>12}{:>15}{:>15}\n",
        "Part Number", "Quantity", "Unit Cost", "Unit Price", "Total Cost", "Total Price"
    )
}

pub(crate) fn format_row(order: &Order) -> String {
    format!(
        "{:>20} {:>15} {:>12.2} {:>12.2} {:>15.2} {:>15.2}\n",
        order.part_number,
        order.quantity,
        order.unit_cost,
        order.unit_price,
        order.total_cost(),
        order.total_price()
    )
}
