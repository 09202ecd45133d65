/// Deferred release of core objects
///
/// A front-end handle dropped on a producer thread hands its core object to
/// this process-wide queue instead of freeing it in place. Every running
/// core thread empties the queue before each batch and once more on exit.
/// While no core thread is alive there is nobody to hand the object to, so
/// it is dropped where it is.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

type Released = Box<dyn Any + Send>;

struct ReleaseQueue {
    sender: flume::Sender<Released>,
    receiver: flume::Receiver<Released>,
}

static RELEASE_QUEUE: OnceLock<ReleaseQueue> = OnceLock::new();
static LIVE_CORE_THREADS: AtomicUsize = AtomicUsize::new(0);

fn queue() -> &'static ReleaseQueue {
    RELEASE_QUEUE.get_or_init(|| {
        let (sender, receiver) = flume::unbounded();
        ReleaseQueue { sender, receiver }
    })
}

/// Hand `object` to the core thread for destruction
pub(crate) fn defer_release<T: Send + 'static>(object: T) {
    if LIVE_CORE_THREADS.load(Ordering::Acquire) == 0 {
        drop(object);
        return;
    }
    // The receiver is static, so this only fails if the process is tearing down
    if let Err(flume::SendError(object)) = queue().sender.send(Box::new(object)) {
        drop(object);
    }
}

/// Free every object released so far, returns how many were freed
pub(crate) fn release_pending() -> usize {
    queue().receiver.try_iter().count()
}

pub(crate) fn core_thread_started() {
    LIVE_CORE_THREADS.fetch_add(1, Ordering::AcqRel);
}

pub(crate) fn core_thread_stopped() {
    LIVE_CORE_THREADS.fetch_sub(1, Ordering::AcqRel);
}

