use derive_builder::Builder;

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct Config {
    /// Capacity of the hand-off queue feeding the workers
    #[builder(default = "64")]
    pub(crate) capacity: usize,

    /// Number of concurrent worker tasks
    #[builder(default = "default_worker_num()")]
    pub(crate) worker_num: usize,
}

pub(crate) fn default_worker_num() -> usize {
    std::cmp::max(2, num_cpus::get())
}

impl Config {
    /// Creates a Config with the given queue capacity and worker count
    pub fn new(capacity: usize, worker_num: usize) -> Self {
        Config {
            capacity,
            worker_num,
        }
    }

    /// Returns the hand-off queue capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of worker tasks
    #[inline]
    pub fn worker_num(&self) -> usize {
        self.worker_num
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            capacity: 64,
            worker_num: default_worker_num(),
        }
    }
}
