use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::config::Config;
use super::processor::ItemProcessor;
use super::types::PoolError;

/// Bounded pool of worker tasks consuming items from a hand-off queue.
///
/// Items are submitted with [`consume`](WorkerPool::consume) and picked up by
/// `worker_num` concurrent workers. The pool keeps a finished counter that is
/// incremented exactly once per item after its processor call returns,
/// whether it succeeded or failed.
///
/// Lifecycle: submit items, call [`close`](WorkerPool::close) once no more
/// will arrive, then the workers drain whatever is still queued and
/// [`run`](WorkerPool::run) resolves with the finished count.
pub struct WorkerPool<T> {
    config: Arc<Config>,
    sender: Arc<mpsc::Sender<T>>,
    receiver: Arc<Mutex<mpsc::Receiver<T>>>,
    finished: Arc<AtomicUsize>,
    done: CancellationToken,
}

impl<T> Clone for WorkerPool<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
            finished: self.finished.clone(),
            done: self.done.clone(),
        }
    }
}

impl<T> WorkerPool<T>
where
    T: Send + 'static,
{
    pub fn new(config: Arc<Config>) -> Self {
        let (sender, receiver) = mpsc::channel(config.capacity);

        Self {
            config,
            sender: Arc::new(sender),
            receiver: Arc::new(Mutex::new(receiver)),
            finished: Arc::new(AtomicUsize::new(0)),
            done: CancellationToken::new(),
        }
    }

    /// Submits one item to the pool, waiting when the queue is full.
    pub async fn consume(&self, item: T) -> Result<(), PoolError> {
        self.sender
            .send(item)
            .await
            .map_err(|_| PoolError::QueueClosed)
    }

    /// Signals that no further items will be submitted.
    ///
    /// Workers drain the queue and exit once it is empty.
    pub fn close(&self) {
        self.done.cancel();
    }

    /// Number of items whose processing has finished, successfully or not.
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    /// Runs the workers until the pool is closed and drained, returning the
    /// finished-item count.
    ///
    /// Joins every worker before returning, so completion here means every
    /// submitted item has observably finished. Cancelling `cancel` aborts
    /// outstanding work and resolves with [`PoolError::Cancelled`].
    pub async fn run<P>(&self, cancel: &CancellationToken, processor: P) -> Result<usize, PoolError>
    where
        P: ItemProcessor<T> + 'static,
    {
        let processor = Arc::new(processor);
        let mut handles = Vec::with_capacity(self.config.worker_num);

        for worker_id in 0..self.config.worker_num {
            let receiver = self.receiver.clone();
            let processor = processor.clone();
            let cancel_token = cancel.clone();
            let done_token = self.done.clone();
            let finished = self.finished.clone();

            let handle = tokio::spawn(async move {
                Self::worker(
                    worker_id,
                    receiver,
                    processor,
                    &cancel_token,
                    &done_token,
                    &finished,
                )
                .await
            });

            handles.push(handle);
        }

        let mut errors = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => errors.push(e),
                Err(e) => errors.push(PoolError::ProcessorError(Box::new(e))),
            }
        }

        if !errors.is_empty() {
            if errors.iter().all(|e| matches!(e, PoolError::Cancelled)) {
                return Err(PoolError::Cancelled);
            }
            if errors.len() == 1 {
                return Err(errors.remove(0));
            }
            return Err(PoolError::MultipleErrors(errors));
        }

        Ok(self.finished())
    }

    async fn worker<P>(
        worker_id: usize,
        receiver: Arc<Mutex<mpsc::Receiver<T>>>,
        processor: Arc<P>,
        cancel_token: &CancellationToken,
        done_token: &CancellationToken,
        finished: &AtomicUsize,
    ) -> Result<(), PoolError>
    where
        P: ItemProcessor<T> + Send + Sync,
    {
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    debug!(worker_id, "worker cancelled");
                    return Err(PoolError::Cancelled);
                }

                _ = done_token.cancelled() => {
                    debug!(worker_id, "pool closed, draining");
                    return Self::drain(receiver, cancel_token, &*processor, finished).await;
                }

                item = async {
                    let mut rx = receiver.lock().await;
                    rx.recv().await
                } => {
                    match item {
                        Some(item) => {
                            Self::process_one(cancel_token, &*processor, item, finished).await?;
                        }
                        None => {
                            debug!(worker_id, "hand-off queue closed");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    async fn drain<P>(
        receiver: Arc<Mutex<mpsc::Receiver<T>>>,
        ctx: &CancellationToken,
        processor: &P,
        finished: &AtomicUsize,
    ) -> Result<(), PoolError>
    where
        P: ItemProcessor<T>,
    {
        loop {
            let item = {
                let mut rx = receiver.lock().await;
                rx.try_recv().ok()
            };
            match item {
                Some(item) => {
                    Self::process_one(ctx, processor, item, finished).await?;
                }
                None => return Ok(()),
            }
        }
    }

    async fn process_one<P>(
        ctx: &CancellationToken,
        processor: &P,
        item: T,
        finished: &AtomicUsize,
    ) -> Result<(), PoolError>
    where
        P: ItemProcessor<T>,
    {
        let result = processor.process(ctx, item).await;
        finished.fetch_add(1, Ordering::SeqCst);
        result
    }
}
