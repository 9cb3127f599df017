//! The three simulation thread bodies
//!
//! Each function here is the body of one thread spawned by the controller:
//! the arrival generator (producer), the server (consumer), and the
//! queue-length observer (sampler). Every buffer is owned by the thread that
//! writes it and handed back through the thread's return value, so the
//! controller can only read samples whose writer has already been joined.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::queue::{Customer, SharedQueue, StopSignal};
use crate::random::ExponentialSampler;
use crate::simulation::statistics::{QueueLengthAccumulator, QueueLengthSample};

/// Samples handed back by the observer thread.
#[derive(Debug)]
pub(crate) struct ObserverSamples {
    pub(crate) accumulator: QueueLengthAccumulator,
    pub(crate) series: Vec<QueueLengthSample>,
}

/// Producer loop: synthesize the Poisson arrival stream.
///
/// Records at most `customer_count` inter-arrival samples, but keeps
/// generating and enqueueing customers until it observes the stop signal at
/// the top of an iteration. The server, not the generator, decides when the
/// run is over, so a small overshoot past the quota is expected and bounded
/// by however far into an iteration the generator is when the signal is
/// raised.
pub(crate) fn run_arrival_generator(
    queue: &Arc<SharedQueue>,
    stop: &StopSignal,
    mut sampler: ExponentialSampler,
    customer_count: usize,
) -> Vec<f64> {
    info!(rate = sampler.rate(), "arrival generator starting");

    let mut inter_arrivals = Vec::with_capacity(customer_count);
    let mut generated: usize = 0;

    while !stop.is_raised() {
        let inter_arrival = sampler.sample();
        if inter_arrivals.len() < customer_count {
            inter_arrivals.push(inter_arrival);
        }

        thread::sleep(Duration::from_secs_f64(inter_arrival));

        queue.enqueue(Customer::arriving_now());
        generated += 1;
        trace!(generated, inter_arrival_seconds = inter_arrival, "customer enqueued");
    }

    info!(generated, recorded = inter_arrivals.len(), "arrival generator stopping");
    inter_arrivals
}

/// Consumer loop: drain the queue for exactly `customer_count` customers.
///
/// Each iteration blocks on the queue, measures how long the dequeued
/// customer waited, then sleeps for a sampled service time to model the
/// server being busy. After the final customer the queue is shut down, which
/// raises the stop signal for the other two threads. Returns the waiting-time
/// and service-time buffers.
pub(crate) fn run_server(
    queue: &Arc<SharedQueue>,
    mut sampler: ExponentialSampler,
    customer_count: usize,
) -> (Vec<f64>, Vec<f64>) {
    info!(rate = sampler.rate(), customer_count, "server starting");

    let mut wait_times = Vec::with_capacity(customer_count);
    let mut service_times = Vec::with_capacity(customer_count);

    for served in 0..customer_count {
        let customer = match queue.dequeue_blocking() {
            Some(customer) => customer,
            None => {
                // Only the server raises the stop signal, so cancellation
                // before the quota cannot happen in a normal run.
                warn!(served, "queue cancelled before the server reached its quota");
                break;
            }
        };

        let waited = customer.wait_so_far().as_secs_f64();
        wait_times.push(waited);

        let service = sampler.sample();
        service_times.push(service);
        trace!(served, wait_seconds = waited, service_seconds = service, "serving customer");

        thread::sleep(Duration::from_secs_f64(service));
    }

    info!(served = wait_times.len(), "server finished quota, signalling stop");
    queue.shutdown();

    (wait_times, service_times)
}

/// Sampler loop: record the queue length at a fixed period.
///
/// Reads the queue length through its lock-protected snapshot only; the
/// observer never touches the queue's condition variable, so it cannot steal
/// a wakeup meant for the server. Exits when it observes the stop signal at
/// the top of an iteration.
pub(crate) fn run_observer(
    queue: &Arc<SharedQueue>,
    stop: &StopSignal,
    period: Duration,
    run_start: Instant,
) -> ObserverSamples {
    info!(period_ms = period.as_secs_f64() * 1000.0, "observer starting");

    let mut accumulator = QueueLengthAccumulator::default();
    let mut series = Vec::new();

    while !stop.is_raised() {
        let queue_length = queue.len();
        accumulator.record(queue_length);
        series.push(QueueLengthSample::new(run_start.elapsed(), queue_length));
        debug!(queue_length, "queue length sampled");

        thread::sleep(period);
    }

    info!(samples = accumulator.count(), "observer stopping");
    ObserverSamples { accumulator, series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seed_for_task;

    fn sampler(rate: f64, tag: u64) -> ExponentialSampler {
        ExponentialSampler::new(rate, seed_for_task(Some(42), tag)).unwrap()
    }

    #[test]
    fn server_records_exactly_the_quota() {
        let stop = StopSignal::new();
        let queue = Arc::new(SharedQueue::new(stop.clone()));
        let quota = 8;

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for _ in 0..quota {
                    queue.enqueue(Customer::arriving_now());
                    thread::sleep(Duration::from_millis(1));
                }
            })
        };

        let (wait_times, service_times) = run_server(&queue, sampler(800.0, 1), quota);
        producer.join().unwrap();

        assert_eq!(wait_times.len(), quota);
        assert_eq!(service_times.len(), quota);
        assert!(wait_times.iter().all(|w| w.is_finite() && *w >= 0.0));
        assert!(service_times.iter().all(|s| s.is_finite() && *s >= 0.0));
        assert!(stop.is_raised(), "server must raise the stop signal after its quota");
    }

    #[test]
    fn generator_stops_after_observing_the_signal() {
        let stop = StopSignal::new();
        let queue = Arc::new(SharedQueue::new(stop.clone()));

        let generator = {
            let queue = Arc::clone(&queue);
            let stop = stop.clone();
            thread::spawn(move || run_arrival_generator(&queue, &stop, sampler(500.0, 2), 1000))
        };

        thread::sleep(Duration::from_millis(30));
        queue.shutdown();
        let inter_arrivals = generator.join().unwrap();

        assert!(!inter_arrivals.is_empty());
        assert!(inter_arrivals.iter().all(|x| x.is_finite() && *x >= 0.0));
        // Everything the generator produced is still in the queue.
        assert!(queue.len() > 0);
    }

    #[test]
    fn generator_caps_recorded_samples_at_the_quota() {
        let stop = StopSignal::new();
        let queue = Arc::new(SharedQueue::new(stop.clone()));
        let quota = 3;

        let generator = {
            let queue = Arc::clone(&queue);
            let stop = stop.clone();
            thread::spawn(move || run_arrival_generator(&queue, &stop, sampler(2000.0, 3), quota))
        };

        // At ~2000 customers/second the generator overshoots the quota of 3
        // well within the sleep below.
        thread::sleep(Duration::from_millis(30));
        queue.shutdown();
        let inter_arrivals = generator.join().unwrap();

        assert_eq!(inter_arrivals.len(), quota);
        assert!(queue.len() >= quota);
    }

    #[test]
    fn observer_samples_until_stopped() {
        let stop = StopSignal::new();
        let queue = Arc::new(SharedQueue::new(stop.clone()));
        queue.enqueue(Customer::arriving_now());
        queue.enqueue(Customer::arriving_now());

        let observer = {
            let queue = Arc::clone(&queue);
            let stop = stop.clone();
            let start = Instant::now();
            thread::spawn(move || {
                run_observer(&queue, &stop, Duration::from_millis(1), start)
            })
        };

        thread::sleep(Duration::from_millis(25));
        queue.shutdown();
        let samples = observer.join().unwrap();

        assert!(samples.accumulator.count() > 0);
        assert_eq!(samples.accumulator.count(), samples.series.len());
        let summary = samples.accumulator.summary();
        assert!(summary.mean >= 0.0);
    }
}
