//! File-level collaborators: the record pre-scan, the order reader and the
//! reference-table loader.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::types::{ExtractStats, ItemFailure, Order, PipelineError, Product};

/// One raw order row, mapped positionally: customer, part, quantity.
#[derive(Debug, Deserialize)]
struct OrderRecord {
    customer_number: i64,
    part_number: String,
    quantity: i64,
}

/// One reference-table row, mapped positionally.
#[derive(Debug, Deserialize)]
struct ProductRecord {
    part_number: String,
    unit_cost: f64,
    unit_price: f64,
}

/// Counts record terminators in the input.
///
/// The count is advisory sizing for the completion cross-check, not a parse:
/// a final record without a trailing newline or a malformed row will make it
/// drift from the number of orders actually published.
pub(crate) async fn count_records(path: &Path) -> Result<usize, PipelineError> {
    let mut file =
        tokio::fs::File::open(path)
            .await
            .map_err(|e| PipelineError::SourceUnavailable {
                path: path.to_path_buf(),
                source: e,
            })?;

    let mut buf = [0u8; 32 * 1024];
    let mut count = 0;
    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| PipelineError::SourceUnavailable {
                path: path.to_path_buf(),
                source: e,
            })?;
        if n == 0 {
            return Ok(count);
        }
        count += buf[..n].iter().filter(|&&b| b == b'\n').count();
    }
}

/// Loads the product reference table into an immutable lookup map.
///
/// Any unreadable or malformed entry is fatal. Duplicate part numbers keep
/// the last entry seen.
pub(crate) async fn load_reference_table(
    path: &Path,
) -> Result<HashMap<String, Product>, PipelineError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path).map_err(|e| PipelineError::SourceUnavailable {
            path: path.clone(),
            source: e,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut table = HashMap::new();
        for result in reader.deserialize::<ProductRecord>() {
            let record = result.map_err(|e| PipelineError::ReferenceLoad {
                path: path.clone(),
                source: e,
            })?;
            table.insert(
                record.part_number.clone(),
                Product {
                    part_number: record.part_number,
                    unit_cost: record.unit_cost,
                    unit_price: record.unit_price,
                },
            );
        }
        Ok(table)
    })
    .await?
}

/// Reads orders one record at a time and publishes each valid one to the
/// extraction queue. Blocking; run under `spawn_blocking`.
///
/// Malformed records are skipped and reported, never treated as end of
/// input. Publishing stops early if the consumer goes away or the run is
/// cancelled.
pub(crate) fn read_orders(
    path: &Path,
    tx: &mpsc::Sender<Order>,
    failures: &mpsc::UnboundedSender<ItemFailure>,
    cancel: &CancellationToken,
) -> Result<ExtractStats, PipelineError> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::SourceUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut published = 0;
    let mut malformed = 0;

    for (idx, result) in reader.deserialize::<OrderRecord>().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        let line = idx as u64 + 1;
        match result {
            Ok(record) => match u32::try_from(record.quantity) {
                Ok(quantity) => {
                    let order = Order::new(record.customer_number, record.part_number, quantity);
                    if tx.blocking_send(order).is_err() {
                        break;
                    }
                    published += 1;
                }
                Err(_) => {
                    let _ = failures.send(ItemFailure::malformed(
                        Some(line),
                        format!("quantity {} out of range", record.quantity),
                    ));
                    malformed += 1;
                }
            },
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(line);
                let _ = failures.send(ItemFailure::malformed(Some(line), e.to_string()));
                malformed += 1;
            }
        }
    }

    Ok(ExtractStats {
        published,
        malformed,
    })
}
