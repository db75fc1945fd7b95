use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

pub type Frame = Arc<str>;

/// Fan-out of snapshot frames to stream subscribers.
///
/// Each subscriber has a single-slot buffer. A publish never waits: if the
/// slot is still occupied the frame is dropped for that subscriber only.
/// The registry lock is independent of the reactor lock.
#[derive(Default)]
pub struct Hub {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, mpsc::Sender<Frame>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(1);
        let count = {
            let mut subs = self.subscribers.lock();
            subs.insert(id, tx);
            subs.len()
        };
        debug!(subscriber = id, count, "subscriber connected");
        Subscription {
            id,
            rx,
            hub: Arc::clone(self),
        }
    }

    /// Offer `frame` to every subscriber. Returns how many accepted it.
    pub fn publish(&self, frame: Frame) -> usize {
        let mut delivered = 0;
        self.subscribers
            .lock()
            .retain(|id, tx| match tx.try_send(Arc::clone(&frame)) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    trace!(subscriber = *id, "subscriber behind, frame dropped");
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            });
        delivered
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn unsubscribe(&self, id: u64) {
        let count = {
            let mut subs = self.subscribers.lock();
            subs.remove(&id);
            subs.len()
        };
        debug!(subscriber = id, count, "subscriber disconnected");
    }
}

/// Receiving end of a hub registration. Deregisters on drop.
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<Frame>,
    hub: Arc<Hub>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}
