//! The monitor: single consumer of control events.
//!
//! The monitor owns the dump timer and the shutdown sequencing. Between
//! events it blocks on its channel; it never polls. Dumps and reshuffles go
//! through the shelf's whole-array operations, which take every slot lock in
//! ascending order, so each printed line is a coherent view.

pub mod events;

pub use events::{control_channel, ControlEvent, ControlSender};

use crate::shelf::{self, Shelf};
use crate::sync::ShutdownFlag;
use crossbeam_channel::{after, never, select, Receiver};
use log::{debug, info};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;

/// Statistics returned by the monitor when it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorReport {
    pub dumps: u64,
    pub reshuffles: u64,
}

/// The control-event consumer.
pub struct Monitor {
    shelf: Arc<Shelf>,
    shutdown: ShutdownFlag,
    events: Receiver<ControlEvent>,
    rng: ChaCha8Rng,
    dump_interval: Duration,
    run_timeout: Option<Duration>,
}

impl Monitor {
    pub fn new(
        shelf: Arc<Shelf>,
        shutdown: ShutdownFlag,
        events: Receiver<ControlEvent>,
        rng: ChaCha8Rng,
        dump_interval: Duration,
    ) -> Self {
        Self {
            shelf,
            shutdown,
            events,
            rng,
            dump_interval,
            run_timeout: None,
        }
    }

    /// Arrange for the monitor to initiate shutdown once `timeout` elapses.
    pub fn with_run_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Consume events until shutdown, then set the shutdown flag and return.
    ///
    /// The periodic dump timer is re-armed after each periodic dump; a dump
    /// forced through the event channel does not disturb the schedule. A
    /// disconnected channel counts as a shutdown request.
    pub fn run(mut self) -> MonitorReport {
        let mut report = MonitorReport::default();
        let events = self.events.clone();
        let deadline = match self.run_timeout {
            Some(timeout) => after(timeout),
            None => never(),
        };
        let mut dump_timer = after(self.dump_interval);
        loop {
            select! {
                recv(events) -> event => match event {
                    Ok(ControlEvent::Shutdown) | Err(_) => {
                        info!("shutdown requested");
                        break;
                    }
                    Ok(ControlEvent::Dump) => {
                        debug!("dump requested");
                        self.dump(&mut report);
                    }
                    Ok(ControlEvent::Reshuffle) => {
                        debug!("reshuffle requested");
                        self.reshuffle(&mut report);
                    }
                },
                recv(dump_timer) -> _ => {
                    self.dump(&mut report);
                    dump_timer = after(self.dump_interval);
                },
                recv(deadline) -> _ => {
                    info!("run timeout reached, shutting down");
                    break;
                },
            }
        }
        self.shutdown.set();
        report
    }

    fn dump(&self, report: &mut MonitorReport) {
        let values = self.shelf.snapshot();
        println!("{}", shelf::format_values(&values));
        report.dumps += 1;
    }

    fn reshuffle(&mut self, report: &mut MonitorReport) {
        let values = self.shelf.reshuffle(&mut self.rng);
        println!("{}", shelf::format_values(&values));
        report.reshuffles += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::thread;
    use std::time::Instant;

    // Long enough that the periodic timer never fires during a test.
    const QUIET_INTERVAL: Duration = Duration::from_secs(3600);

    #[test]
    fn shutdown_event_stops_the_monitor_and_sets_the_flag() {
        let shelf = Arc::new(Shelf::with_values(vec![1, 2]));
        let shutdown = ShutdownFlag::new();
        let (tx, rx) = control_channel();
        let monitor = Monitor::new(
            shelf,
            shutdown.clone(),
            rx,
            ChaCha8Rng::seed_from_u64(0),
            QUIET_INTERVAL,
        );
        let handle = thread::spawn(move || monitor.run());
        assert!(tx.shutdown());
        let report = handle.join().unwrap();
        assert!(shutdown.is_set());
        assert_eq!(report, MonitorReport::default());
    }

    #[test]
    fn dump_and_reshuffle_events_are_counted() {
        let shelf = Arc::new(Shelf::with_values(vec![100, 200, 300, 400]));
        let shutdown = ShutdownFlag::new();
        let (tx, rx) = control_channel();
        let monitor = Monitor::new(
            Arc::clone(&shelf),
            shutdown.clone(),
            rx,
            ChaCha8Rng::seed_from_u64(1),
            QUIET_INTERVAL,
        );
        let handle = thread::spawn(move || monitor.run());
        assert!(tx.dump());
        assert!(tx.reshuffle());
        assert!(tx.dump());
        assert!(tx.shutdown());
        let report = handle.join().unwrap();
        assert_eq!(report.dumps, 2);
        assert_eq!(report.reshuffles, 1);
        // The reshuffle redrew every value from [0, 4).
        assert!(shelf.snapshot().iter().all(|&value| value < 4));
    }

    #[test]
    fn periodic_timer_produces_dumps() {
        let shelf = Arc::new(Shelf::with_values(vec![3, 1, 2]));
        let shutdown = ShutdownFlag::new();
        let (tx, rx) = control_channel();
        let monitor = Monitor::new(
            shelf,
            shutdown.clone(),
            rx,
            ChaCha8Rng::seed_from_u64(2),
            Duration::from_millis(10),
        );
        let handle = thread::spawn(move || monitor.run());
        thread::sleep(Duration::from_millis(300));
        assert!(tx.shutdown());
        let report = handle.join().unwrap();
        assert!(
            report.dumps >= 2,
            "expected repeated periodic dumps, got {}",
            report.dumps
        );
    }

    #[test]
    fn dropping_all_senders_stops_the_monitor() {
        let shelf = Arc::new(Shelf::with_values(vec![1, 2]));
        let shutdown = ShutdownFlag::new();
        let (tx, rx) = control_channel();
        drop(tx);
        let report = Monitor::new(
            shelf,
            shutdown.clone(),
            rx,
            ChaCha8Rng::seed_from_u64(3),
            QUIET_INTERVAL,
        )
        .run();
        assert!(shutdown.is_set());
        assert_eq!(report, MonitorReport::default());
    }

    #[test]
    fn run_timeout_initiates_shutdown() {
        let shelf = Arc::new(Shelf::with_values(vec![1, 2]));
        let shutdown = ShutdownFlag::new();
        let (_tx, rx) = control_channel();
        let started = Instant::now();
        Monitor::new(
            shelf,
            shutdown.clone(),
            rx,
            ChaCha8Rng::seed_from_u64(4),
            QUIET_INTERVAL,
        )
        .with_run_timeout(Some(Duration::from_millis(50)))
        .run();
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(shutdown.is_set());
    }
}
