//! Per-thread accounting of [`Tracked`](crate::Tracked) lifecycles.
//!
//! The test harness runs each `#[test]` on its own thread, so a
//! thread-local ledger isolates tests from each other without locking.
//! Call [`reset`] at the start of a test that inspects counts.

use std::cell::Cell;

thread_local! {
    static CREATED: Cell<usize> = const { Cell::new(0) };
    static CLONED: Cell<usize> = const { Cell::new(0) };
    static DEFAULTED: Cell<usize> = const { Cell::new(0) };
    static DROPPED: Cell<usize> = const { Cell::new(0) };
    static CLONE_BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
    static DEFAULT_BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Counts observed on the current thread since the last [`reset`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// Values built with `Tracked::new`.
    pub created: usize,
    /// Successful clones.
    pub cloned: usize,
    /// Values built with `Default::default`.
    pub defaulted: usize,
    /// Drops.
    pub dropped: usize,
}

impl LedgerSnapshot {
    /// Total constructions of any kind.
    pub fn constructed(&self) -> usize {
        self.created + self.cloned + self.defaulted
    }

    /// Values constructed and not yet dropped.
    pub fn live(&self) -> usize {
        self.constructed() - self.dropped
    }
}

/// Zero all counters and disarm any pending failure injection.
pub fn reset() {
    CREATED.with(|c| c.set(0));
    CLONED.with(|c| c.set(0));
    DEFAULTED.with(|c| c.set(0));
    DROPPED.with(|c| c.set(0));
    disarm();
}

/// Current counts.
pub fn snapshot() -> LedgerSnapshot {
    LedgerSnapshot {
        created: CREATED.with(Cell::get),
        cloned: CLONED.with(Cell::get),
        defaulted: DEFAULTED.with(Cell::get),
        dropped: DROPPED.with(Cell::get),
    }
}

/// Allow `n` more clones to succeed, then panic on the next one.
pub fn fail_clone_after(n: usize) {
    CLONE_BUDGET.with(|b| b.set(Some(n)));
}

/// Allow `n` more default constructions to succeed, then panic on the next.
pub fn fail_default_after(n: usize) {
    DEFAULT_BUDGET.with(|b| b.set(Some(n)));
}

/// Cancel any armed failure.
pub fn disarm() {
    CLONE_BUDGET.with(|b| b.set(None));
    DEFAULT_BUDGET.with(|b| b.set(None));
}

pub(crate) fn record_created() {
    CREATED.with(|c| c.set(c.get() + 1));
}

pub(crate) fn record_dropped() {
    DROPPED.with(|c| c.set(c.get() + 1));
}

pub(crate) fn record_cloned() {
    spend(&CLONE_BUDGET, "clone");
    CLONED.with(|c| c.set(c.get() + 1));
}

pub(crate) fn record_defaulted() {
    spend(&DEFAULT_BUDGET, "default construction");
    DEFAULTED.with(|c| c.set(c.get() + 1));
}

fn spend(budget: &'static std::thread::LocalKey<Cell<Option<usize>>>, what: &str) {
    let exhausted = budget.with(|b| match b.get() {
        Some(0) => {
            b.set(None);
            true
        }
        Some(n) => {
            b.set(Some(n - 1));
            false
        }
        None => false,
    });
    if exhausted {
        panic!("injected {what} failure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tracked;

    #[test]
    fn counts_each_lifecycle_event() {
        reset();
        let a = Tracked::new(1);
        let b = a.clone();
        let c = Tracked::default();
        drop(b);
        let snap = snapshot();
        assert_eq!(snap.created, 1);
        assert_eq!(snap.cloned, 1);
        assert_eq!(snap.defaulted, 1);
        assert_eq!(snap.dropped, 1);
        assert_eq!(snap.live(), 2);
        drop((a, c));
        assert_eq!(snapshot().live(), 0);
    }

    #[test]
    fn clone_failure_fires_once_after_budget() {
        reset();
        let original = Tracked::new(7);
        fail_clone_after(2);
        let _first = original.clone();
        let _second = original.clone();
        let third = std::panic::catch_unwind(|| original.clone());
        assert!(third.is_err());
        // Failure is one-shot: the budget disarms after firing.
        let _fourth = original.clone();
        assert_eq!(snapshot().cloned, 3);
    }

    #[test]
    fn default_failure_is_injectable() {
        reset();
        fail_default_after(0);
        assert!(std::panic::catch_unwind(Tracked::default).is_err());
        assert_eq!(snapshot().defaulted, 0);
    }
}
