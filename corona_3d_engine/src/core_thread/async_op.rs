/// Completion signal for a queued command
///
/// Every command queued on the core thread hands back an `AsyncOp`. Once the
/// command ran, the op holds its return value, or the error it produced.
/// Dropping the op is fine: the command still runs.

use std::time::Duration;
use crate::error::{Error, Result};

/// Result slot filled by the core thread
pub struct AsyncOp<T> {
    receiver: flume::Receiver<Result<T>>,
}

/// Core-thread side of an [`AsyncOp`]
pub(crate) struct AsyncOpSender<T> {
    sender: flume::Sender<Result<T>>,
}

impl<T> AsyncOpSender<T> {
    /// Deliver the result. Returns the result back if the op was dropped.
    pub(crate) fn complete(self, result: Result<T>) -> std::result::Result<(), Result<T>> {
        self.sender.send(result).map_err(|e| e.into_inner())
    }
}

impl<T> AsyncOp<T> {
    pub(crate) fn channel() -> (AsyncOpSender<T>, AsyncOp<T>) {
        let (sender, receiver) = flume::bounded(1);
        (AsyncOpSender { sender }, AsyncOp { receiver })
    }

    /// An op that is already complete
    pub(crate) fn completed(result: Result<T>) -> Self {
        let (sender, op) = Self::channel();
        // Capacity is one and the receiver is alive, the send cannot fail
        let _ = sender.complete(result);
        op
    }

    /// True when the result is available and has not been taken yet
    pub fn is_complete(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Take the result if the command already ran
    pub fn try_result(&self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => Some(Err(Error::QueueClosed)),
        }
    }

    /// Block until the command ran and return its result
    ///
    /// # Errors
    ///
    /// The command's own error, `CommandPanicked` if it panicked, or
    /// `QueueClosed` if the core thread went away without running it.
    pub fn wait(self) -> Result<T> {
        self.receiver.recv().unwrap_or(Err(Error::QueueClosed))
    }

    /// Block for at most `timeout`
    ///
    /// Returns `Error::Timeout` if the command has not run yet; the op stays
    /// usable and can be waited on again.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(flume::RecvTimeoutError::Timeout) => Err(Error::Timeout),
            Err(flume::RecvTimeoutError::Disconnected) => Err(Error::QueueClosed),
        }
    }
}
