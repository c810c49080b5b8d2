//! Simple profiling macros using thread-local storage
//!
//! Lightweight timing of the planner and tree-search phases without changing
//! function signatures. Enable with environment variable: SNAKE_SOLVER_PROFILE=1

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

/// Phases that can be timed
pub const CATEGORIES: [&str; 7] = [
    "astar",
    "ida_star",
    "plan_extract",
    "mcts_select",
    "mcts_expand",
    "mcts_playout",
    "mcts_backprop",
];

const N: usize = CATEGORIES.len();

thread_local! {
    static TIMES: RefCell<[u64; N]> = const { RefCell::new([0; N]) };
    static COUNTS: RefCell<[usize; N]> = const { RefCell::new([0; N]) };
}

// Global aggregators
#[allow(clippy::declare_interior_mutable_const)]
const ZERO_U64: AtomicU64 = AtomicU64::new(0);
#[allow(clippy::declare_interior_mutable_const)]
const ZERO_USIZE: AtomicUsize = AtomicUsize::new(0);
static GLOBAL_TIMES: [AtomicU64; N] = [ZERO_U64; N];
static GLOBAL_COUNTS: [AtomicUsize; N] = [ZERO_USIZE; N];

#[inline]
pub fn is_profiling_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("SNAKE_SOLVER_PROFILE").is_ok())
}

fn category_index(category: &str) -> Option<usize> {
    CATEGORIES.iter().position(|c| *c == category)
}

pub struct ProfileGuard {
    start: Instant,
    slot: usize,
}

impl ProfileGuard {
    pub fn new(category: &'static str) -> Option<Self> {
        if !is_profiling_enabled() {
            return None;
        }
        category_index(category).map(|slot| ProfileGuard {
            start: Instant::now(),
            slot,
        })
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;
        TIMES.with(|t| t.borrow_mut()[self.slot] += elapsed_ns);
        COUNTS.with(|c| c.borrow_mut()[self.slot] += 1);
    }
}

/// Folds this thread's counters into the global totals
pub fn merge_thread_local() {
    if !is_profiling_enabled() {
        return;
    }

    TIMES.with(|t| {
        for (slot, ns) in t.borrow_mut().iter_mut().enumerate() {
            GLOBAL_TIMES[slot].fetch_add(*ns, Ordering::Relaxed);
            *ns = 0;
        }
    });
    COUNTS.with(|c| {
        for (slot, count) in c.borrow_mut().iter_mut().enumerate() {
            GLOBAL_COUNTS[slot].fetch_add(*count, Ordering::Relaxed);
            *count = 0;
        }
    });
}

/// Snapshot of the global totals as (category, nanoseconds, calls)
pub fn totals() -> Vec<(&'static str, u64, usize)> {
    CATEGORIES
        .iter()
        .enumerate()
        .map(|(slot, name)| {
            (
                *name,
                GLOBAL_TIMES[slot].load(Ordering::Relaxed),
                GLOBAL_COUNTS[slot].load(Ordering::Relaxed),
            )
        })
        .collect()
}

pub fn print_report(total_time_ms: u64) {
    if !is_profiling_enabled() {
        return;
    }

    let total_ns = total_time_ms * 1_000_000;

    eprintln!("\n═══════════════════════════════════════════════════════════");
    eprintln!("                 PERFORMANCE PROFILE");
    eprintln!("═══════════════════════════════════════════════════════════");
    eprintln!("Total Time: {}ms\n", total_time_ms);

    for (name, ns, count) in totals() {
        if count == 0 {
            continue;
        }
        let ms = ns as f64 / 1_000_000.0;
        let pct = if total_ns > 0 { 100.0 * ns as f64 / total_ns as f64 } else { 0.0 };
        let avg_us = ns as f64 / (count * 1000) as f64;
        eprintln!(
            "  {:<14} {:>10.2}ms ({:>5.1}%) - {} calls, {:.2}µs avg",
            name, ms, pct, count, avg_us
        );
    }

    eprintln!("═══════════════════════════════════════════════════════════\n");
}

pub fn reset() {
    for slot in 0..N {
        GLOBAL_TIMES[slot].store(0, Ordering::Relaxed);
        GLOBAL_COUNTS[slot].store(0, Ordering::Relaxed);
    }
}

#[macro_export]
macro_rules! profile {
    ($category:expr, $code:block) => {{
        let _guard = $crate::simple_profiler::ProfileGuard::new($category);
        $code
    }};
}
