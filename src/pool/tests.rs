use super::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// Processor that collects items into a shared vector
struct CollectingProcessor {
    items: Arc<tokio::sync::Mutex<Vec<i32>>>,
}

#[async_trait]
impl ItemProcessor<i32> for CollectingProcessor {
    async fn process(&self, _ctx: &CancellationToken, item: i32) -> Result<(), PoolError> {
        let mut collected = self.items.lock().await;
        collected.push(item);
        Ok(())
    }
}

// Processor that counts processed items
struct CountingProcessor {
    counter: Arc<AtomicUsize>,
}

#[async_trait]
impl ItemProcessor<i32> for CountingProcessor {
    async fn process(&self, _ctx: &CancellationToken, _item: i32) -> Result<(), PoolError> {
        self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// Processor that fails on a specific item
struct FailingProcessor {
    poison: i32,
}

#[async_trait]
impl ItemProcessor<i32> for FailingProcessor {
    async fn process(&self, _ctx: &CancellationToken, item: i32) -> Result<(), PoolError> {
        if item == self.poison {
            return Err(PoolError::ProcessorError(Box::new(std::io::Error::other(
                "poisoned item",
            ))));
        }
        Ok(())
    }
}

const ITEM_NUMS: usize = 100;

fn test_config(worker_num: usize) -> Arc<Config> {
    Arc::new(
        ConfigBuilder::default()
            .capacity(8usize)
            .worker_num(worker_num)
            .build()
            .unwrap(),
    )
}

#[tokio::test]
async fn test_should_process_all_items() {
    let pool: WorkerPool<i32> = WorkerPool::new(test_config(4));
    let pool_clone = pool.clone();
    let cancel = CancellationToken::new();

    let result = Arc::new(tokio::sync::Mutex::new(Vec::with_capacity(ITEM_NUMS)));
    let processor = CollectingProcessor {
        items: Arc::clone(&result),
    };

    tokio::spawn(async move {
        for i in 0..ITEM_NUMS {
            pool_clone.consume(i as i32).await.unwrap();
        }
        pool_clone.close();
    });

    let finished = pool.run(&cancel, processor).await.unwrap();
    assert_eq!(finished, ITEM_NUMS);

    let mut items = result.lock().await;
    items.sort();
    assert_eq!(items.len(), ITEM_NUMS);
    for i in 0..ITEM_NUMS {
        assert_eq!(items[i], i as i32);
    }
}

#[tokio::test]
async fn test_finished_counter_matches_submitted() {
    let pool: WorkerPool<i32> = WorkerPool::new(test_config(3));
    let pool_clone = pool.clone();
    let cancel = CancellationToken::new();

    let counter = Arc::new(AtomicUsize::new(0));
    let processor = CountingProcessor {
        counter: Arc::clone(&counter),
    };

    tokio::spawn(async move {
        for i in 0..ITEM_NUMS {
            pool_clone.consume(i as i32).await.unwrap();
        }
        pool_clone.close();
    });

    let finished = pool.run(&cancel, processor).await.unwrap();
    assert_eq!(finished, ITEM_NUMS);
    assert_eq!(counter.load(Ordering::SeqCst), ITEM_NUMS);
    assert_eq!(pool.finished(), ITEM_NUMS);
}

#[tokio::test]
async fn test_empty_pool_completes_immediately() {
    let pool: WorkerPool<i32> = WorkerPool::new(test_config(2));
    let cancel = CancellationToken::new();

    let counter = Arc::new(AtomicUsize::new(0));
    let processor = CountingProcessor {
        counter: Arc::clone(&counter),
    };

    pool.close();
    let finished = pool.run(&cancel, processor).await.unwrap();
    assert_eq!(finished, 0);
}

#[tokio::test]
async fn test_closure_processor() {
    let pool: WorkerPool<i32> = WorkerPool::new(test_config(2));
    let pool_clone = pool.clone();
    let cancel = CancellationToken::new();

    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = Arc::clone(&counter);
    let processor = move |_ctx: &CancellationToken, _item: i32| {
        let counter = Arc::clone(&counter_clone);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<(), PoolError>(())
        }
    };

    tokio::spawn(async move {
        for i in 0..10 {
            pool_clone.consume(i).await.unwrap();
        }
        pool_clone.close();
    });

    let finished = pool.run(&cancel, processor).await.unwrap();
    assert_eq!(finished, 10);
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn test_cancellation_stops_workers() {
    let pool: WorkerPool<i32> = WorkerPool::new(test_config(2));
    let cancel = CancellationToken::new();

    let counter = Arc::new(AtomicUsize::new(0));
    let processor = CountingProcessor {
        counter: Arc::clone(&counter),
    };

    cancel.cancel();
    let result = pool.run(&cancel, processor).await;
    assert!(matches!(result, Err(PoolError::Cancelled)));
}

#[tokio::test]
async fn test_processor_error_propagates() {
    let pool: WorkerPool<i32> = WorkerPool::new(test_config(1));
    let pool_clone = pool.clone();
    let cancel = CancellationToken::new();

    let processor = FailingProcessor { poison: 3 };

    tokio::spawn(async move {
        for i in 0..5 {
            if pool_clone.consume(i).await.is_err() {
                break;
            }
        }
        pool_clone.close();
    });

    let result = pool.run(&cancel, processor).await;
    assert!(matches!(result, Err(PoolError::ProcessorError(_))));
    // the poisoned item still counts as finished
    assert!(pool.finished() >= 4);
}
