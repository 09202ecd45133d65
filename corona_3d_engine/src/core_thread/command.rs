/// Deferred unit of work executed on the core thread

use std::panic::{self, AssertUnwindSafe};
use crate::error::{Error, Result};
use super::async_op::AsyncOpSender;

/// A command waiting in a pending list or in the execution queue
///
/// The closure owns everything it captured; nothing outside can alter those
/// arguments once the command is built.
pub(crate) struct QueuedCommand<C> {
    id: u64,
    callback: Box<dyn FnOnce(&mut C) + Send>,
}

impl<C: 'static> QueuedCommand<C> {
    /// Wrap a fallible callback and route its outcome to `completion`
    ///
    /// Panics are caught and reported as `Error::CommandPanicked`. When
    /// `report_failure` is set, a failure is also logged, since nobody is
    /// going to wait for it.
    pub(crate) fn new<T, F>(id: u64, callback: F, completion: AsyncOpSender<T>, report_failure: bool) -> Self
    where
        T: Send + 'static,
        F: FnOnce(&mut C) -> Result<T> + Send + 'static,
    {
        let callback = Box::new(move |context: &mut C| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| callback(context)))
                .unwrap_or_else(|payload| Err(Error::CommandPanicked(panic_message(payload.as_ref()))));

            if report_failure {
                if let Err(error) = &result {
                    crate::engine_error!("corona3d::CoreThread", "Command #{} failed: {}", id, error);
                }
            }
            let _ = completion.complete(result);
        });

        Self { id, callback }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn execute(self, context: &mut C) {
        (self.callback)(context);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
