use bitflags::bitflags;

bitflags! {
    /// Per-submission options for [`CoreThread`](super::CoreThread) commands
    ///
    /// The two bits are independent and may be combined.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CoreThreadQueueFlags: u32 {
        /// Skip the caller's pending list and go straight to the core
        /// thread's execution queue. No `submit` needed.
        const INTERNAL_QUEUE = 1 << 0;
        /// Suspend the caller until the command has executed.
        const BLOCK_UNTIL_COMPLETE = 1 << 1;
    }
}
