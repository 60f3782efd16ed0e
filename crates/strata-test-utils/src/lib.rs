//! Test fixtures and drop-tracking types for strata development.
//!
//! Provides ready-made record types (see [`fixtures`]) and two value types
//! that observe their own destruction: [`DropCounter`] and [`Volatile`].
//! Both report into a per-thread tally read with [`drop_count`], so
//! tests running in parallel do not see each other's drops.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::Cell;

pub mod fixtures;

pub use fixtures::{Fragile, Particle, Person, Tracked};

thread_local! {
    static DROPS: Cell<usize> = const { Cell::new(0) };
}

/// Number of tracked values dropped on this thread since the last reset.
pub fn drop_count() -> usize {
    DROPS.with(Cell::get)
}

/// Reset this thread's drop tally to zero.
pub fn reset_drop_count() {
    DROPS.with(|d| d.set(0));
}

fn record_drop() {
    DROPS.with(|d| d.set(d.get() + 1));
}

/// Value that bumps the drop tally when dropped.
///
/// Carries a tag so tests can tell instances apart after moves and swaps.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DropCounter {
    pub tag: u32,
}

impl DropCounter {
    pub fn new(tag: u32) -> Self {
        Self { tag }
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        record_drop();
    }
}

/// Value that bumps the drop tally and then panics if armed.
///
/// The default instance is disarmed.
#[derive(Debug, Default)]
pub struct Volatile {
    armed: bool,
}

impl Volatile {
    /// An instance whose destructor panics.
    pub fn armed() -> Self {
        Self { armed: true }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl Drop for Volatile {
    fn drop(&mut self) {
        record_drop();
        if self.armed {
            panic!("armed value dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_tracks_drops() {
        reset_drop_count();
        drop(DropCounter::new(1));
        drop(vec![DropCounter::default(), DropCounter::default()]);
        assert_eq!(drop_count(), 3);
        reset_drop_count();
        assert_eq!(drop_count(), 0);
    }

    #[test]
    fn armed_volatile_panics_after_counting() {
        reset_drop_count();
        let result = std::panic::catch_unwind(|| drop(Volatile::armed()));
        assert!(result.is_err());
        assert_eq!(drop_count(), 1);
        drop(Volatile::default());
        assert_eq!(drop_count(), 2);
    }
}
