//! Dispatch module for the record indexer pipeline.
//!
//! A multi-consumer hand-off queue between the batcher and the uploader
//! pool. Capacity is explicit: a bounded queue makes the producer wait for
//! space, an unbounded one never blocks it.

use crate::errors::PipelineError;

/// Capacity of the dispatch queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueCapacity {
    /// At most this many batches wait in the queue.
    Bounded(usize),
    /// No limit besides available memory.
    Unbounded,
}

impl QueueCapacity {
    /// Map a CLI-style size to a capacity, with 0 meaning unbounded.
    pub fn from_size(size: usize) -> Self {
        if size == 0 {
            Self::Unbounded
        } else {
            Self::Bounded(size)
        }
    }
}

/// Create a dispatch queue with the given capacity.
pub fn dispatch_queue<T>(capacity: QueueCapacity) -> (DispatchSender<T>, DispatchReceiver<T>) {
    let (tx, rx) = match capacity {
        QueueCapacity::Bounded(size) => flume::bounded(size.max(1)),
        QueueCapacity::Unbounded => flume::unbounded(),
    };
    (DispatchSender { inner: tx }, DispatchReceiver { inner: rx })
}

/// Producer side of the dispatch queue.
pub struct DispatchSender<T> {
    inner: flume::Sender<T>,
}

impl<T> DispatchSender<T> {
    /// Enqueue an item, waiting for space on a bounded queue.
    ///
    /// Fails once every receiver has been dropped.
    pub async fn send(&self, item: T) -> Result<(), PipelineError> {
        self.inner
            .send_async(item)
            .await
            .map_err(|_| PipelineError::channel("dispatch queue closed"))
    }
}

/// Consumer side of the dispatch queue, cloned into every uploader.
///
/// Each item is delivered to exactly one caller of [`DispatchReceiver::recv`].
pub struct DispatchReceiver<T> {
    inner: flume::Receiver<T>,
}

impl<T> Clone for DispatchReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> DispatchReceiver<T> {
    /// Wait for the next item. Returns `None` once every sender is gone and
    /// the queue is drained.
    pub async fn recv(&self) -> Option<T> {
        self.inner.recv_async().await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_capacity_from_size() {
        assert_eq!(QueueCapacity::from_size(0), QueueCapacity::Unbounded);
        assert_eq!(QueueCapacity::from_size(16), QueueCapacity::Bounded(16));
    }

    #[tokio::test]
    async fn test_each_item_delivered_once() {
        let (tx, rx) = dispatch_queue::<u32>(QueueCapacity::Unbounded);

        let mut consumers = Vec::new();
        for _ in 0..4 {
            let rx = rx.clone();
            consumers.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(item) = rx.recv().await {
                    seen.push(item);
                }
                seen
            }));
        }
        drop(rx);

        for i in 0..100 {
            tx.send(i).await.unwrap();
        }
        drop(tx);

        let mut all = Vec::new();
        for consumer in consumers {
            all.extend(consumer.await.unwrap());
        }
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<u32>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_queue_applies_backpressure() {
        let (tx, rx) = dispatch_queue::<u32>(QueueCapacity::Bounded(1));

        tx.send(1).await.unwrap();
        let blocked = tokio::time::timeout(Duration::from_millis(50), tx.send(2)).await;
        assert!(blocked.is_err(), "second send should wait for space");

        assert_eq!(rx.recv().await, Some(1));
        tx.send(3).await.unwrap();
        assert_eq!(rx.recv().await, Some(3));
    }

    #[tokio::test]
    async fn test_send_fails_after_receivers_dropped() {
        let (tx, rx) = dispatch_queue::<u32>(QueueCapacity::Bounded(4));
        drop(rx);

        assert!(matches!(
            tx.send(1).await,
            Err(PipelineError::ChannelError(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_recv_loses_nothing() {
        let (tx, rx) = dispatch_queue::<u32>(QueueCapacity::Bounded(2));

        let waited = tokio::time::timeout(Duration::from_millis(10), rx.recv()).await;
        assert!(waited.is_err());

        tx.send(7).await.unwrap();
        assert_eq!(rx.recv().await, Some(7));
    }
}
