/// CoreThread - command queue feeding the thread that owns the device
///
/// Producers queue commands into their own pending list (one per producer
/// thread). `submit`/`submit_all` move pending lists to the execution queue,
/// which the core thread drains in FIFO order. Internal commands skip the
/// pending lists entirely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, JoinHandle, ThreadId};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use super::async_op::AsyncOp;
use super::command::QueuedCommand;
use super::queue_flags::CoreThreadQueueFlags;
use super::release_queue;

/// Core thread configuration
#[derive(Debug, Clone)]
pub struct CoreThreadConfig {
    /// Name given to the spawned OS thread
    pub thread_name: String,
}

impl Default for CoreThreadConfig {
    fn default() -> Self {
        Self {
            thread_name: "corona3d-core".to_string(),
        }
    }
}

/// Messages consumed by the drain loop
enum CoreMessage<C> {
    Execute(Vec<QueuedCommand<C>>),
    Shutdown,
}

/// Per-producer pending lists
struct PendingQueues<C> {
    /// Producers in first-use order, so `submit_all` is deterministic
    order: Vec<ThreadId>,
    queues: FxHashMap<ThreadId, Vec<QueuedCommand<C>>>,
    closed: bool,
}

impl<C> PendingQueues<C> {
    fn queue_for(&mut self, producer: ThreadId) -> &mut Vec<QueuedCommand<C>> {
        if !self.queues.contains_key(&producer) {
            self.order.push(producer);
        }
        self.queues.entry(producer).or_default()
    }

    fn take(&mut self, producer: Option<ThreadId>) -> Vec<QueuedCommand<C>> {
        let mut batch = Vec::new();
        match producer {
            Some(id) => {
                if let Some(queue) = self.queues.get_mut(&id) {
                    batch.append(queue);
                }
            }
            None => {
                let PendingQueues { order, queues, .. } = self;
                for id in order.iter() {
                    if let Some(queue) = queues.get_mut(id) {
                        batch.append(queue);
                    }
                }
            }
        }
        batch
    }
}

/// Dedicated core thread plus its command queue
///
/// `C` is the context owned by the core thread; every command receives it
/// mutably. Only the core thread ever touches it, so it needs no locking.
///
/// # Example
///
/// ```no_run
/// use corona_3d_engine::corona3d::core_thread::{CoreThread, CoreThreadConfig, CoreThreadQueueFlags};
///
/// let core = CoreThread::spawn(Vec::<u32>::new(), CoreThreadConfig::default())?;
/// core.queue_command(|log: &mut Vec<u32>| { log.push(1); Ok(()) }, CoreThreadQueueFlags::empty())?;
/// core.submit_all(true)?;
/// let log = core.shutdown()?;
/// assert_eq!(log, vec![1]);
/// # Ok::<(), corona_3d_engine::corona3d::Error>(())
/// ```
pub struct CoreThread<C: Send + 'static> {
    sender: flume::Sender<CoreMessage<C>>,
    pending: Mutex<PendingQueues<C>>,
    handle: Mutex<Option<JoinHandle<C>>>,
    thread_id: ThreadId,
    next_command_id: AtomicU64,
}

impl<C: Send + 'static> CoreThread<C> {
    /// Spawn the core thread, moving `context` onto it
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if the OS refuses to create the thread.
    pub fn spawn(context: C, config: CoreThreadConfig) -> Result<Self> {
        let (sender, receiver) = flume::unbounded::<CoreMessage<C>>();

        // Counted before the thread runs so handles dropped right after spawn are deferred
        release_queue::core_thread_started();
        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || drain_loop(context, receiver))
            .map_err(|e| {
                release_queue::core_thread_stopped();
                Error::InitializationFailed(format!(
                    "Failed to spawn core thread '{}': {}", config.thread_name, e
                ))
            })?;

        let thread_id = handle.thread().id();
        crate::engine_debug!("corona3d::CoreThread", "Core thread '{}' started", config.thread_name);

        Ok(Self {
            sender,
            pending: Mutex::new(PendingQueues {
                order: Vec::new(),
                queues: FxHashMap::default(),
                closed: false,
            }),
            handle: Mutex::new(Some(handle)),
            thread_id,
            next_command_id: AtomicU64::new(1),
        })
    }

    /// Id of the core thread
    pub fn core_thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Whether the caller is running on the core thread
    pub fn is_core_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Whether the queue has been shut down
    pub fn is_closed(&self) -> bool {
        self.lock_pending().map(|pending| pending.closed).unwrap_or(true)
    }

    /// Number of commands waiting in the caller's pending list
    pub fn pending_count(&self) -> usize {
        let producer = thread::current().id();
        self.lock_pending()
            .map(|pending| pending.queues.get(&producer).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Queue a command with no return value
    ///
    /// See [`queue_return_command`](Self::queue_return_command) for the
    /// meaning of `flags`.
    pub fn queue_command<F>(&self, command: F, flags: CoreThreadQueueFlags) -> Result<AsyncOp<()>>
    where
        F: FnOnce(&mut C) -> Result<()> + Send + 'static,
    {
        self.queue_return_command(command, flags)
    }

    /// Queue a command whose return value is delivered through an [`AsyncOp`]
    ///
    /// - Without `INTERNAL_QUEUE` the command is appended to the calling
    ///   thread's pending list and runs after the next `submit`/`submit_all`.
    /// - With `INTERNAL_QUEUE` it goes straight to the execution queue.
    /// - With `BLOCK_UNTIL_COMPLETE` this call returns after the command ran
    ///   (a non-internal blocking command submits the caller's pending list
    ///   first, preserving order). The returned op is already complete.
    ///
    /// # Errors
    ///
    /// - `QueueClosed` after [`shutdown`](Self::shutdown)
    /// - `WrongThread` for a blocking command issued from the core thread,
    ///   which could never complete
    pub fn queue_return_command<T, F>(&self, command: F, flags: CoreThreadQueueFlags) -> Result<AsyncOp<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut C) -> Result<T> + Send + 'static,
    {
        let blocking = flags.contains(CoreThreadQueueFlags::BLOCK_UNTIL_COMPLETE);
        if blocking && self.is_core_thread() {
            return Err(Error::WrongThread(
                "blocking command queued from the core thread would never complete".to_string(),
            ));
        }

        let id = self.next_command_id.fetch_add(1, Ordering::Relaxed);
        let (completion, op) = AsyncOp::channel();
        let command = QueuedCommand::new(id, command, completion, !blocking);

        if flags.contains(CoreThreadQueueFlags::INTERNAL_QUEUE) {
            let pending = self.lock_pending()?;
            if pending.closed {
                return Err(Error::QueueClosed);
            }
            self.send(CoreMessage::Execute(vec![command]))?;
        } else {
            let producer = thread::current().id();
            let mut pending = self.lock_pending()?;
            if pending.closed {
                return Err(Error::QueueClosed);
            }
            pending.queue_for(producer).push(command);
            if blocking {
                let batch = pending.take(Some(producer));
                self.send(CoreMessage::Execute(batch))?;
            }
        }

        if blocking {
            Ok(AsyncOp::completed(op.wait()))
        } else {
            Ok(op)
        }
    }

    /// Submit the calling thread's pending commands
    ///
    /// With `blocking`, returns once every command in the execution queue at
    /// call time (including the ones just submitted) has executed.
    pub fn submit(&self, blocking: bool) -> Result<()> {
        self.submit_queues(Some(thread::current().id()), blocking)
    }

    /// Submit the pending commands of every producer thread
    ///
    /// Producers are submitted in the order they first queued a command.
    /// With `blocking`, this is a full drain barrier.
    pub fn submit_all(&self, blocking: bool) -> Result<()> {
        self.submit_queues(None, blocking)
    }

    /// Drain everything, stop the core thread and hand its context back
    ///
    /// Every command queued before this call executes first. Afterwards all
    /// queueing fails with `QueueClosed`.
    pub fn shutdown(&self) -> Result<C> {
        self.shutdown_with(|_: &mut C| Ok(()))
    }

    /// Same as [`shutdown`](Self::shutdown), running `last` after every
    /// other command
    ///
    /// The queue is closed before `last` is queued, so no producer can slip
    /// a command in behind it.
    ///
    /// # Errors
    ///
    /// `last`'s own error (the thread is stopped regardless), `QueueClosed`
    /// if already shut down, `WrongThread` when called from the core thread.
    pub fn shutdown_with<F>(&self, last: F) -> Result<C>
    where
        F: FnOnce(&mut C) -> Result<()> + Send + 'static,
    {
        if self.is_core_thread() {
            return Err(Error::WrongThread("the core thread cannot shut itself down".to_string()));
        }

        let handle = self.handle.lock()
            .map_err(|_| Error::BackendError("Core thread handle lock poisoned".to_string()))?
            .take()
            .ok_or(Error::QueueClosed)?;

        let last_op = {
            let mut pending = self.lock_pending()?;
            pending.closed = true;
            let mut batch = pending.take(None);

            let id = self.next_command_id.fetch_add(1, Ordering::Relaxed);
            let (completion, op) = AsyncOp::channel();
            batch.push(QueuedCommand::new(id, last, completion, false));

            self.send(CoreMessage::Execute(batch))?;
            self.send(CoreMessage::Shutdown)?;
            op
        };

        let context = handle.join()
            .map_err(|_| Error::CommandPanicked("core thread terminated abnormally".to_string()))?;
        crate::engine_debug!("corona3d::CoreThread", "Core thread stopped");

        last_op.wait()?;
        Ok(context)
    }

    fn submit_queues(&self, producer: Option<ThreadId>, blocking: bool) -> Result<()> {
        if blocking && self.is_core_thread() {
            return Err(Error::WrongThread(
                "blocking submit from the core thread would never complete".to_string(),
            ));
        }

        let fence = {
            let mut pending = self.lock_pending()?;
            if pending.closed {
                return Err(Error::QueueClosed);
            }

            let mut batch = pending.take(producer);
            let fence = if blocking {
                let id = self.next_command_id.fetch_add(1, Ordering::Relaxed);
                let (completion, op) = AsyncOp::channel();
                batch.push(QueuedCommand::new(id, |_: &mut C| Ok(()), completion, false));
                Some(op)
            } else {
                None
            };

            if !batch.is_empty() {
                crate::engine_trace!(
                    "corona3d::CoreThread",
                    "Submitting {} command(s), first #{}",
                    batch.len(),
                    batch[0].id()
                );
                self.send(CoreMessage::Execute(batch))?;
            }
            fence
        };

        match fence {
            Some(op) => op.wait(),
            None => Ok(()),
        }
    }

    fn send(&self, message: CoreMessage<C>) -> Result<()> {
        self.sender.send(message).map_err(|_| Error::QueueClosed)
    }

    fn lock_pending(&self) -> Result<MutexGuard<'_, PendingQueues<C>>> {
        self.pending.lock()
            .map_err(|_| Error::BackendError("Core thread queue lock poisoned".to_string()))
    }
}

impl<C: Send + 'static> Drop for CoreThread<C> {
    fn drop(&mut self) {
        let still_running = self.handle.lock().map(|h| h.is_some()).unwrap_or(false);
        if !still_running {
            return;
        }

        if self.is_core_thread() {
            // Cannot join ourselves: stop the loop and let the thread exit on its own
            if let Ok(mut pending) = self.pending.lock() {
                pending.closed = true;
            }
            let _ = self.sender.send(CoreMessage::Shutdown);
            return;
        }

        if let Err(error) = self.shutdown() {
            crate::engine_error!("corona3d::CoreThread", "Core thread shutdown failed: {}", error);
        }
    }
}

/// Body of the core thread: execute batches in arrival order until shutdown
///
/// Core objects released by dropped front-end handles are freed before each
/// batch and once more after the loop ends.
fn drain_loop<C: 'static>(mut context: C, receiver: flume::Receiver<CoreMessage<C>>) -> C {
    while let Ok(message) = receiver.recv() {
        release_queue::release_pending();
        match message {
            CoreMessage::Execute(commands) => {
                for command in commands {
                    command.execute(&mut context);
                }
            }
            CoreMessage::Shutdown => break,
        }
    }

    release_queue::core_thread_stopped();
    let released = release_queue::release_pending();
    if released > 0 {
        crate::engine_trace!("corona3d::CoreThread", "Released {} core object(s) on exit", released);
    }
    context
}

#[cfg(test)]
#[path = "core_thread_tests.rs"]
mod tests;
