//! Single-slot handoff between the task thread and the loader thread.

use ferry_common::{BoxError, Record};
use ferry_connector::LoaderProtocolError;
use parking_lot::{Condvar, Mutex};

/// What the producer hands to the consumer through the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    Data(Record),
    End,
}

/// Consumer-side status as seen by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerStatus {
    Running,
    Completed,
    Failed,
}

/// Result of a successful [`RecordChannel::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The signal now occupies the slot.
    Stored,
    /// The consumer already finished normally; the signal was dropped.
    Discarded,
}

/// Why a [`RecordChannel::put`] did not deliver its signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutError {
    /// The consumer failed before or while the producer was waiting for
    /// the slot. The fault itself stays in the channel until taken.
    ConsumerFailed,
    /// `End` was already sent; nothing may follow it.
    StreamEnded,
}

#[derive(Debug)]
struct ChannelState {
    slot: Option<StreamSignal>,
    fault: Option<BoxError>,
    consumer: ConsumerStatus,
    end_sent: bool,
    abandoned: bool,
    delivered: u64,
}

/// Capacity-one channel between exactly one producer and one consumer.
///
/// `put` waits while the slot is occupied and `take` waits while it is
/// empty; every wake-up rechecks the state. The consumer can also leave
/// the channel by completing or by depositing a fault, either of which
/// releases a waiting producer.
#[derive(Debug)]
pub struct RecordChannel {
    state: Mutex<ChannelState>,
    slot_freed: Condvar,
    slot_filled: Condvar,
}

impl Default for RecordChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordChannel {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState {
                slot: None,
                fault: None,
                consumer: ConsumerStatus::Running,
                end_sent: false,
                abandoned: false,
                delivered: 0,
            }),
            slot_freed: Condvar::new(),
            slot_filled: Condvar::new(),
        }
    }

    /// Blocks until the slot is free, then stores `signal`.
    ///
    /// Returns early with [`PutError::ConsumerFailed`] if the consumer has
    /// failed, and with [`Delivery::Discarded`] if it has already completed.
    pub fn put(&self, signal: StreamSignal) -> Result<Delivery, PutError> {
        let mut state = self.state.lock();
        if state.end_sent {
            return Err(PutError::StreamEnded);
        }
        loop {
            let consumer = state.consumer;
            match consumer {
                ConsumerStatus::Failed => return Err(PutError::ConsumerFailed),
                ConsumerStatus::Completed => return Ok(Delivery::Discarded),
                ConsumerStatus::Running if state.slot.is_none() => {
                    state.end_sent = signal == StreamSignal::End;
                    state.slot = Some(signal);
                    self.slot_filled.notify_one();
                    return Ok(Delivery::Stored);
                }
                ConsumerStatus::Running => self.slot_freed.wait(&mut state),
            }
        }
    }

    /// Blocks until a signal is available and removes it from the slot.
    pub fn take(&self) -> Result<StreamSignal, LoaderProtocolError> {
        let mut state = self.state.lock();
        loop {
            if let Some(signal) = state.slot.take() {
                if matches!(signal, StreamSignal::Data(_)) {
                    state.delivered += 1;
                }
                self.slot_freed.notify_one();
                return Ok(signal);
            }
            if state.abandoned {
                return Err(LoaderProtocolError::Aborted);
            }
            self.slot_filled.wait(&mut state);
        }
    }

    /// Marks the consumer as finished normally. Anything left in the slot
    /// is dropped and later puts are discarded.
    pub fn complete(&self) {
        let mut state = self.state.lock();
        if state.consumer == ConsumerStatus::Running {
            state.consumer = ConsumerStatus::Completed;
            state.slot = None;
        }
        self.slot_freed.notify_all();
    }

    /// Deposits the consumer's fault and releases any waiting producer.
    pub fn fail(&self, error: BoxError) {
        let mut state = self.state.lock();
        state.consumer = ConsumerStatus::Failed;
        state.fault = Some(error);
        state.slot = None;
        self.slot_freed.notify_all();
    }

    /// The producer is going away without sending `End`; a consumer
    /// waiting in [`take`](Self::take) is released with an error.
    pub fn abandon(&self) {
        let mut state = self.state.lock();
        state.abandoned = true;
        self.slot_filled.notify_all();
    }

    pub fn consumer_status(&self) -> ConsumerStatus {
        self.state.lock().consumer
    }

    /// Removes the deposited fault. Returns `None` if the consumer has not
    /// failed or the fault was already taken.
    pub fn take_fault(&self) -> Option<BoxError> {
        self.state.lock().fault.take()
    }

    /// Number of data records the consumer has taken so far.
    pub fn delivered(&self) -> u64 {
        self.state.lock().delivered
    }
}
