use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_builder::Builder;

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct PipelineConfig {
    /// Path to the delimited order input
    pub(crate) orders_path: PathBuf,

    /// Path to the delimited product reference table
    pub(crate) products_path: PathBuf,

    /// Path of the report to write
    pub(crate) report_path: PathBuf,

    /// Capacity of the hand-off queues between stages
    #[builder(default = "64")]
    pub(crate) channel_capacity: usize,

    /// Worker tasks per stage pool
    #[builder(default = "crate::pool::config::default_worker_num()")]
    pub(crate) worker_num: usize,

    /// Overall run deadline; `None` waits indefinitely
    #[builder(default = "Some(Duration::from_secs(300))")]
    pub(crate) deadline: Option<Duration>,
}

impl PipelineConfig {
    #[inline]
    pub fn orders_path(&self) -> &Path {
        &self.orders_path
    }

    #[inline]
    pub fn products_path(&self) -> &Path {
        &self.products_path
    }

    #[inline]
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    #[inline]
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    #[inline]
    pub fn worker_num(&self) -> usize {
        self.worker_num
    }

    #[inline]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}
