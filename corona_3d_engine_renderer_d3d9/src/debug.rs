/// Direct3D 9 device statistics - process-wide counters with a colored report
///
/// The device bumps these counters as it records calls; tools and tests read
/// them from any thread.

use colored::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global device statistics (thread-safe atomic counters)
static DEVICE_STATS: DeviceStatsTracker = DeviceStatsTracker::new();

/// Snapshot of the device counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct D3D9DeviceStats {
    pub draw_calls: u64,
    pub primitives: u64,
    pub state_changes: u64,
    pub clears: u64,
    pub frames_presented: u64,
    /// Calls rejected by the device (nothing bound, unsupported feature, ...)
    pub failed_calls: u64,
}

impl D3D9DeviceStats {
    pub fn total_calls(&self) -> u64 {
        self.draw_calls + self.state_changes + self.clears + self.frames_presented
    }
}

struct DeviceStatsTracker {
    draw_calls: AtomicU64,
    primitives: AtomicU64,
    state_changes: AtomicU64,
    clears: AtomicU64,
    frames_presented: AtomicU64,
    failed_calls: AtomicU64,
}

impl DeviceStatsTracker {
    const fn new() -> Self {
        Self {
            draw_calls: AtomicU64::new(0),
            primitives: AtomicU64::new(0),
            state_changes: AtomicU64::new(0),
            clears: AtomicU64::new(0),
            frames_presented: AtomicU64::new(0),
            failed_calls: AtomicU64::new(0),
        }
    }

    fn get_stats(&self) -> D3D9DeviceStats {
        D3D9DeviceStats {
            draw_calls: self.draw_calls.load(Ordering::Relaxed),
            primitives: self.primitives.load(Ordering::Relaxed),
            state_changes: self.state_changes.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            frames_presented: self.frames_presented.load(Ordering::Relaxed),
            failed_calls: self.failed_calls.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.draw_calls.store(0, Ordering::Relaxed);
        self.primitives.store(0, Ordering::Relaxed);
        self.state_changes.store(0, Ordering::Relaxed);
        self.clears.store(0, Ordering::Relaxed);
        self.frames_presented.store(0, Ordering::Relaxed);
        self.failed_calls.store(0, Ordering::Relaxed);
    }
}

pub(crate) fn record_draw(primitives: u64) {
    DEVICE_STATS.draw_calls.fetch_add(1, Ordering::Relaxed);
    DEVICE_STATS.primitives.fetch_add(primitives, Ordering::Relaxed);
}

pub(crate) fn record_state_change() {
    DEVICE_STATS.state_changes.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_clear() {
    DEVICE_STATS.clears.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_present() {
    DEVICE_STATS.frames_presented.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_failure() {
    DEVICE_STATS.failed_calls.fetch_add(1, Ordering::Relaxed);
}

/// Current device statistics
pub fn get_device_stats() -> D3D9DeviceStats {
    DEVICE_STATS.get_stats()
}

/// Reset every counter to zero
pub fn reset_device_stats() {
    DEVICE_STATS.reset();
}

/// Print device statistics report
pub fn print_device_stats_report() {
    let stats = get_device_stats();

    if stats.total_calls() == 0 && stats.failed_calls == 0 {
        println!("\n{}", "✓ No Direct3D 9 calls recorded".green().bold());
        return;
    }

    println!("\n{}", "=== Direct3D 9 Device Report ===".bright_blue().bold());

    println!("  {} {}", "Frames:".white().bold(), stats.frames_presented);
    println!("  {} {}", "Draw calls:".cyan(), stats.draw_calls);
    println!("  {} {}", "Primitives:".cyan(), stats.primitives);
    println!("  {} {}", "State changes:".bright_black(), stats.state_changes);
    println!("  {} {}", "Clears:".bright_black(), stats.clears);

    if stats.failed_calls > 0 {
        println!("  {} {}", "Failed calls:".red().bold(), stats.failed_calls);
    }

    if stats.frames_presented > 0 {
        println!("\n  {} {:.1} draw call(s) per frame",
            "ℹ".cyan(),
            stats.draw_calls as f64 / stats.frames_presented as f64
        );
    }

    println!("{}\n", "=================================".bright_blue().bold());
}
