//! A bounded, drop-oldest channel: when the buffer is full the sender
//! discards the oldest pending item rather than blocking, trading strict
//! ordering for liveness at head — the Live Subscriber's backpressure
//! policy per §4.4. `tokio::sync::mpsc` has no drop-oldest mode, so this is
//! a small bespoke primitive built on the `Mutex<VecDeque>` + `Notify`
//! shape, the same pair reth's own internal broadcast-adjacent utilities
//! build on.

use std::{collections::VecDeque, sync::Arc};

use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;

struct Shared<T> {
    queue: Mutex<VecDeque<T>>,
    notify: Notify,
    capacity: usize,
}

#[derive(Clone)]
pub struct RingSender<T> {
    shared: Arc<Shared<T>>,
}

pub struct RingReceiver<T> {
    shared: Arc<Shared<T>>,
}

/// Builds a drop-oldest channel holding at most `capacity` pending items.
pub fn channel<T>(capacity: usize) -> (RingSender<T>, RingReceiver<T>) {
    let shared = Arc::new(Shared {
        queue: Mutex::new(VecDeque::with_capacity(capacity)),
        notify: Notify::new(),
        capacity,
    });
    (RingSender { shared: Arc::clone(&shared) }, RingReceiver { shared })
}

impl<T> RingSender<T> {
    /// Enqueues `item`, dropping the oldest pending item first if the
    /// buffer is already at capacity.
    pub async fn send(&self, item: T) {
        let mut queue = self.shared.queue.lock().await;
        if queue.len() >= self.shared.capacity {
            queue.pop_front();
        }
        queue.push_back(item);
        drop(queue);
        self.shared.notify.notify_one();
    }
}

impl<T> RingReceiver<T> {
    /// Waits for the next item, or returns `None` if `cancel` fires first.
    pub async fn recv(&mut self, cancel: &CancellationToken) -> Option<T> {
        loop {
            let notified = self.shared.notify.notified();
            {
                let mut queue = self.shared.queue.lock().await;
                if let Some(item) = queue.pop_front() {
                    return Some(item);
                }
            }
            tokio::select! {
                _ = notified => {}
                _ = cancel.cancelled() => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn oldest_item_is_dropped_when_full() {
        let (sender, mut receiver) = channel(2);
        sender.send(1).await;
        sender.send(2).await;
        sender.send(3).await;

        let cancel = CancellationToken::new();
        assert_eq!(receiver.recv(&cancel).await, Some(2));
        assert_eq!(receiver.recv(&cancel).await, Some(3));
    }

    #[tokio::test]
    async fn recv_returns_none_once_cancelled() {
        let (_sender, mut receiver) = channel::<u8>(1);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(receiver.recv(&cancel).await, None);
    }
}
