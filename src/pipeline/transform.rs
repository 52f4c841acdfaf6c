use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::pool::{Config, PoolError, WorkerPool};

use super::types::{ItemFailure, Order, PipelineError, Product};

/// Transformation stage: enriches each order with unit cost/price from the
/// reference table.
///
/// Orders are fanned out onto a bounded worker pool. An order whose part
/// number has no reference entry is rejected and reported; it is never
/// forwarded with zeroed financial fields. The transformed-items queue
/// closes once every enrichment task has finished, and the finished count
/// is returned for the orchestrator's cross-check.
pub(crate) async fn run_transform(
    products: Arc<HashMap<String, Product>>,
    mut rx: mpsc::Receiver<Order>,
    tx: mpsc::Sender<Order>,
    failures: mpsc::UnboundedSender<ItemFailure>,
    pool_config: Arc<Config>,
    cancel: CancellationToken,
) -> Result<usize, PipelineError> {
    let pool: WorkerPool<Order> = WorkerPool::new(pool_config);

    let processor = move |_ctx: &CancellationToken, mut order: Order| {
        let products = Arc::clone(&products);
        let tx = tx.clone();
        let failures = failures.clone();
        async move {
            match products.get(&order.part_number) {
                Some(product) => {
                    order.unit_cost = product.unit_cost;
                    order.unit_price = product.unit_price;
                    tx.send(order).await.map_err(|_| PoolError::QueueClosed)?;
                }
                None => {
                    warn!(part_number = %order.part_number, "no reference entry, rejecting order");
                    let _ = failures.send(ItemFailure::missing_reference(&order));
                }
            }
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

    let finished = run_handle.await??;
    info!(finished, "transform finished, transformed queue closed");
    Ok(finished)
}
