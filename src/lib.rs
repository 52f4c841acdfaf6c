//! # order-etl
//!
//! A concurrent order-report ETL (Extract-Transform-Load) pipeline built on
//! Tokio.
//!
//! Reads order records from a delimited input, enriches each one with unit
//! cost/price from a product reference table, and writes a fixed-width
//! report of line-item totals.
//!
//! ## Features
//!
//! - **Three concurrent stages** handing items over bounded channels
//! - **Bounded per-item fan-out** via a shared worker pool abstraction
//! - **Serialized report writes** through a single dedicated writer task
//! - **Graceful cancellation** and an overall run deadline
//! - **Per-item error reporting** without aborting sibling items
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use order_etl::pipeline::{Pipeline, PipelineConfigBuilder};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = PipelineConfigBuilder::default()
//!     .orders_path("orders.txt")
//!     .products_path("productList.txt")
//!     .report_path("dest.txt")
//!     .build()?;
//!
//! let summary = Pipeline::new(config).run(&CancellationToken::new()).await?;
//! println!("loaded {} of {} orders", summary.loaded, summary.published);
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Bounded worker pool for concurrent per-item processing
//! - [`pipeline`] - The extract, transform and load stages and their orchestrator

pub mod pipeline;
pub mod pool;
