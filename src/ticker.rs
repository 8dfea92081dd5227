//! Tick sources driving the countdown
//!
//! A subscription is represented by a [`TickHandle`]; dropping the handle
//! cancels it. The engine holds the handle exactly while it is running, so
//! every path out of the running state releases the subscription.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::{mpsc, oneshot},
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

pub type SubscriptionId = u64;

/// One periodic signal, tagged with the subscription that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub subscription: SubscriptionId,
}

/// RAII guard for an active tick subscription
pub struct TickHandle {
    id: SubscriptionId,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new<F>(id: SubscriptionId, cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickHandle").field("id", &self.id).finish()
    }
}

/// Something that can hand out periodic tick subscriptions
pub trait TickSource: Send {
    fn subscribe(&mut self) -> TickHandle;
}

/// Tokio-backed tick source: each subscription is a spawned interval task
/// that forwards ticks into a shared channel until its handle is dropped.
#[derive(Debug)]
pub struct IntervalTicker {
    period: Duration,
    tx: mpsc::UnboundedSender<Tick>,
    next_id: SubscriptionId,
}

impl IntervalTicker {
    /// Create the ticker and the receiving end the tick pump reads from
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ticker = Self {
            period,
            tx,
            next_id: 0,
        };
        (ticker, rx)
    }
}

impl TickSource for IntervalTicker {
    fn subscribe(&mut self) -> TickHandle {
        self.next_id += 1;
        let id = self.next_id;
        let tx = self.tx.clone();
        let period = self.period;
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            // First tick one period after start, not immediately
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if tx.send(Tick { subscription: id }).is_err() {
                            debug!("Tick receiver gone, stopping subscription {}", id);
                            break;
                        }
                    }
                    _ = &mut cancel_rx => {
                        debug!("Tick subscription {} cancelled", id);
                        break;
                    }
                }
            }
        });

        TickHandle::new(id, move || {
            let _ = cancel_tx.send(());
        })
    }
}

/// Tick source whose ticks are delivered by hand. Tracks live subscriptions
/// so callers can check nothing is leaked.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    active: Arc<AtomicUsize>,
    issued: Arc<AtomicU64>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriptions handed out and not yet dropped
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Subscriptions handed out in total
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl TickSource for ManualTicker {
    fn subscribe(&mut self) -> TickHandle {
        let id = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.active.fetch_add(1, Ordering::SeqCst);
        let active = Arc::clone(&self.active);
        TickHandle::new(id, move || {
            active.fetch_sub(1, Ordering::SeqCst);
        })
    }
}
