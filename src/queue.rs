//! Thread-safe customer queue
//!
//! The [`SharedQueue`] is the single point of contention in the simulation:
//! the arrival generator pushes customers in, the server blocks on it while
//! empty, and the observer snapshots its length. All mutation happens under
//! the queue's own mutex, and the condition variable's wait predicate is
//! exactly "queue non-empty or stop signal raised" so a blocked consumer can
//! never be stranded by a shutdown that races an empty queue.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

/// A customer waiting for service.
///
/// Customers carry no identity beyond the instant they joined the system;
/// ownership moves from the arrival generator into the queue and from the
/// queue to the server, which drops the customer after measuring its wait.
#[derive(Debug)]
pub struct Customer {
    arrived_at: Instant,
}

impl Customer {
    /// Create a customer stamped with the current monotonic instant.
    pub fn arriving_now() -> Self {
        Self { arrived_at: Instant::now() }
    }

    /// The monotonic instant this customer joined the system.
    pub fn arrived_at(&self) -> Instant {
        self.arrived_at
    }

    /// How long this customer has been in the system so far.
    pub fn wait_so_far(&self) -> Duration {
        self.arrived_at.elapsed()
    }
}

/// One-shot cooperative cancellation flag shared by all simulation threads.
///
/// False at start, raised exactly once (by the server, through
/// [`SharedQueue::shutdown`]) and never reset. The producer and observer read
/// it at the top of every loop iteration; SeqCst ordering keeps the
/// transition promptly visible to all threads.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
}

impl StopSignal {
    /// Create a signal in the not-raised state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Idempotent; the flag never resets.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Whether the signal has been raised.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

/// FIFO queue of pending customers with a blocking-wait dequeue.
///
/// The queue owns its lock and condition variable, and holds a clone of the
/// run's [`StopSignal`] so that [`shutdown`](SharedQueue::shutdown) and the
/// dequeue wait predicate agree on the same flag under the same lock.
///
/// # Panics
///
/// All methods panic if the internal mutex is poisoned. A panic while holding
/// the queue lock is a programming fault in the simulation itself, not a
/// recoverable runtime condition.
#[derive(Debug)]
pub struct SharedQueue {
    items: Mutex<VecDeque<Customer>>,
    not_empty: Condvar,
    stop: StopSignal,
}

impl SharedQueue {
    /// Create an empty queue tied to the given stop signal.
    pub fn new(stop: StopSignal) -> Self {
        Self { items: Mutex::new(VecDeque::new()), not_empty: Condvar::new(), stop }
    }

    /// Append a customer to the tail.
    ///
    /// If the queue was empty before the call, wakes one blocked consumer.
    pub fn enqueue(&self, customer: Customer) {
        let mut items = self.items.lock().expect("queue mutex poisoned");
        let was_empty = items.is_empty();
        items.push_back(customer);
        if was_empty {
            self.not_empty.notify_one();
        }
    }

    /// Remove and return the oldest customer, blocking while the queue is
    /// empty.
    ///
    /// Returns `None`, the cancellation result, only if the stop signal was
    /// raised while the queue was still empty. A non-empty queue always yields
    /// its head, raised signal or not, so customers already admitted are
    /// still served in order. Waiting suspends on the condition variable;
    /// there is no polling.
    pub fn dequeue_blocking(&self) -> Option<Customer> {
        let mut items = self.items.lock().expect("queue mutex poisoned");
        while items.is_empty() && !self.stop.is_raised() {
            items = self.not_empty.wait(items).expect("queue mutex poisoned");
        }
        items.pop_front()
    }

    /// Snapshot of the current queue length.
    pub fn len(&self) -> usize {
        self.items.lock().expect("queue mutex poisoned").len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raise the stop signal and wake every blocked consumer.
    ///
    /// Raising the flag under the queue lock is what guarantees a consumer
    /// blocked on an empty queue observes the shutdown: it either re-checks
    /// the predicate before we store the flag (and then receives our
    /// notification), or it checks after and never sleeps at all.
    pub fn shutdown(&self) {
        let _items = self.items.lock().expect("queue mutex poisoned");
        self.stop.raise();
        self.not_empty.notify_all();
        debug!("queue shut down; waking blocked consumers");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn dequeue_preserves_enqueue_order() {
        let queue = SharedQueue::new(StopSignal::new());

        let mut tags = Vec::new();
        for _ in 0..5 {
            let customer = Customer::arriving_now();
            tags.push(customer.arrived_at());
            queue.enqueue(customer);
            // Distinct instants make the arrival timestamps usable as tags.
            thread::sleep(Duration::from_millis(1));
        }

        let dequeued: Vec<_> =
            (0..5).map(|_| queue.dequeue_blocking().unwrap().arrived_at()).collect();
        assert_eq!(dequeued, tags);
    }

    #[test]
    fn length_tracks_contents() {
        let queue = SharedQueue::new(StopSignal::new());
        assert!(queue.is_empty());

        queue.enqueue(Customer::arriving_now());
        queue.enqueue(Customer::arriving_now());
        assert_eq!(queue.len(), 2);

        queue.dequeue_blocking().unwrap();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn dequeue_blocks_until_enqueue() {
        let queue = Arc::new(SharedQueue::new(StopSignal::new()));

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                queue.enqueue(Customer::arriving_now());
            })
        };

        let started = Instant::now();
        let customer = queue.dequeue_blocking();
        producer.join().unwrap();

        assert!(customer.is_some());
        assert!(started.elapsed() >= Duration::from_millis(40), "dequeue returned early");
    }

    #[test]
    fn shutdown_wakes_consumer_blocked_on_empty_queue() {
        let queue = Arc::new(SharedQueue::new(StopSignal::new()));

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue_blocking())
        };

        thread::sleep(Duration::from_millis(20));
        queue.shutdown();

        assert!(consumer.join().unwrap().is_none());
    }

    #[test]
    fn dequeue_after_shutdown_on_empty_queue_is_cancelled() {
        let stop = StopSignal::new();
        let queue = SharedQueue::new(stop.clone());

        queue.shutdown();
        assert!(stop.is_raised());
        assert!(queue.dequeue_blocking().is_none());
    }

    #[test]
    fn remaining_customers_are_served_after_shutdown() {
        let queue = SharedQueue::new(StopSignal::new());

        queue.enqueue(Customer::arriving_now());
        queue.shutdown();

        assert!(queue.dequeue_blocking().is_some());
        assert!(queue.dequeue_blocking().is_none());
    }

    #[test]
    fn stop_signal_raises_exactly_once() {
        let signal = StopSignal::new();
        assert!(!signal.is_raised());

        signal.raise();
        assert!(signal.is_raised());

        // A second raise is a no-op, not a reset.
        signal.raise();
        assert!(signal.is_raised());
    }
}
