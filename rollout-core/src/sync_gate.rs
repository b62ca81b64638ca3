//! Blocking wait primitive polling the checkpoint ledger.
use crate::stop::StopSignal;
use anyhow::Result;
use std::time::{Duration, Instant};

/// How a [`SyncGate`] wait ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The predicate became true.
    Satisfied,

    /// The stop signal was observed before the predicate became true.
    Stopped,

    /// The optional deadline elapsed before the predicate became true.
    TimedOut,
}

/// Polls a condition until it holds, the stop signal fires, or an optional
/// deadline elapses.
///
/// Each cycle checks the stop signal first, then refreshes the local view
/// from remote storage, then evaluates the predicate. By default there is no
/// upper bound on the wait: the stop signal is the only escape valve, which
/// keeps the protocol simple at the cost of liveness if the trainer stalls.
/// A deadline can be opted into with [`SyncGate::with_deadline`].
pub struct SyncGate {
    poll_interval: Duration,
    deadline: Option<Duration>,
}

impl SyncGate {
    /// Creates a gate polling at the given interval, waiting unboundedly.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            deadline: None,
        }
    }

    /// Creates a gate that additionally gives up after `deadline`.
    pub fn with_deadline(poll_interval: Duration, deadline: Duration) -> Self {
        Self {
            poll_interval,
            deadline: Some(deadline),
        }
    }

    /// Blocks until `predicate` holds, returning how the wait ended.
    ///
    /// `refresh` runs once per cycle before the predicate and typically pulls
    /// the ledger from remote storage; it may update the local checkpoint
    /// view but must not alter checkpoint identity or order. Errors from
    /// either closure abort the wait and propagate.
    pub fn wait_until<S, F, P>(&self, stop: &S, mut refresh: F, mut predicate: P) -> Result<WaitOutcome>
    where
        S: StopSignal + ?Sized,
        F: FnMut() -> Result<()>,
        P: FnMut() -> Result<bool>,
    {
        let start = Instant::now();
        loop {
            if stop.should_stop() {
                return Ok(WaitOutcome::Stopped);
            }
            refresh()?;
            if predicate()? {
                return Ok(WaitOutcome::Satisfied);
            }
            if let Some(deadline) = self.deadline {
                if start.elapsed() >= deadline {
                    return Ok(WaitOutcome::TimedOut);
                }
            }
            std::thread::sleep(self.poll_interval);
        }
    }
}
