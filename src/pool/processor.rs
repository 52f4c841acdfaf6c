use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::types::PoolError;

/// Processes one item pulled off the pool's hand-off queue.
#[async_trait]
pub trait ItemProcessor<T>: Send + Sync {
    async fn process(&self, cancel: &CancellationToken, item: T) -> Result<(), PoolError>;
}

#[async_trait]
impl<T, F, Fut> ItemProcessor<T> for F
where
    F: Fn(&CancellationToken, T) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<(), PoolError>> + Send,
    T: Send + 'static,
{
    async fn process(&self, ctx: &CancellationToken, item: T) -> Result<(), PoolError> {
        self(ctx, item).await
    }
}
