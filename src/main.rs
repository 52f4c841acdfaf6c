use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use order_etl::pipeline::{Pipeline, PipelineConfigBuilder, RunSummary};

/// Concurrent order-report ETL pipeline.
#[derive(Debug, Parser)]
#[command(name = "order-etl", version, about)]
struct Cli {
    /// Path to the delimited order input
    #[arg(long, default_value = "orders.txt")]
    orders: PathBuf,

    /// Path to the delimited product reference table
    #[arg(long, default_value = "productList.txt")]
    products: PathBuf,

    /// Path of the report to write
    #[arg(long, default_value = "dest.txt")]
    output: PathBuf,

    /// Worker tasks per stage (defaults to available parallelism)
    #[arg(long)]
    workers: Option<usize>,

    /// Capacity of the hand-off queues between stages
    #[arg(long, default_value_t = 64)]
    queue_capacity: usize,

    /// Overall run deadline in seconds; 0 disables the deadline
    #[arg(long, default_value_t = 300)]
    deadline_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(summary) if summary.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            error!("pipeline failed: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<RunSummary> {
    let mut builder = PipelineConfigBuilder::default();
    builder
        .orders_path(cli.orders)
        .products_path(cli.products)
        .report_path(cli.output)
        .channel_capacity(cli.queue_capacity);
    if let Some(workers) = cli.workers {
        builder.worker_num(workers);
    }
    builder.deadline(if cli.deadline_secs == 0 {
        None
    } else {
        Some(Duration::from_secs(cli.deadline_secs))
    });
    let config = builder.build()?;

    let cancel = CancellationToken::new();
    let summary = Pipeline::new(config).run(&cancel).await?;

    for failure in &summary.failures {
        warn!(
            kind = ?failure.kind,
            line = failure.line,
            part_number = failure.part_number.as_deref(),
            detail = %failure.detail,
            "item failed"
        );
    }
    info!(
        expected = summary.expected,
        published = summary.published,
        loaded = summary.loaded,
        failed = summary.failures.len(),
        elapsed = ?summary.elapsed,
        "run complete"
    );
    Ok(summary)
}
