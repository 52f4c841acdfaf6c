pub mod config;
pub mod pool;
pub mod processor;
pub mod types;

pub use config::{Config, ConfigBuilder};
pub use pool::WorkerPool;
pub use processor::ItemProcessor;
pub use types::PoolError;

#[cfg(test)]
mod tests;
