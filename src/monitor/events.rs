//! Control events delivered to the monitor.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::debug;

/// Capacity of the control channel. Request bursts beyond this are coalesced
/// by dropping the excess.
const CONTROL_CHANNEL_CAPACITY: usize = 8;

/// An asynchronous request for the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Stop the run: the monitor sets the shutdown flag and exits its loop.
    Shutdown,
    /// Print a consistent snapshot of the shelf.
    Dump,
    /// Re-randomize every slot, then print the result.
    Reshuffle,
}

/// Producer handle for control events.
///
/// Dump and reshuffle requests never block the caller: when the channel is
/// full the request is dropped, collapsing a burst into the events already
/// queued. Shutdown uses a blocking send and is never dropped.
#[derive(Debug, Clone)]
pub struct ControlSender {
    tx: Sender<ControlEvent>,
}

impl ControlSender {
    /// Request shutdown. Returns false if the monitor is already gone.
    pub fn shutdown(&self) -> bool {
        self.tx.send(ControlEvent::Shutdown).is_ok()
    }

    /// Request a snapshot dump; may be coalesced.
    pub fn dump(&self) -> bool {
        self.try_request(ControlEvent::Dump)
    }

    /// Request a reshuffle; may be coalesced.
    pub fn reshuffle(&self) -> bool {
        self.try_request(ControlEvent::Reshuffle)
    }

    fn try_request(&self, event: ControlEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                debug!("control channel full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Create the control channel: many producers, one monitor consumer.
pub fn control_channel() -> (ControlSender, Receiver<ControlEvent>) {
    let (tx, rx) = bounded(CONTROL_CHANNEL_CAPACITY);
    (ControlSender { tx }, rx)
}
