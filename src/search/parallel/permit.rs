//! Counting semaphore capping how many workers hash at the same time.
//!
//! Workers hold one [`Permit`] while testing a chunk. The number of worker
//! threads can exceed the limit; the surplus blocks in `acquire` until a
//! permit is released.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct State {
    avail: usize,
    /// Highest number of permits held at once.
    peak: usize,
}

#[derive(Debug)]
pub struct ConcurrencyLimit {
    total: usize,
    state: Mutex<State>,
    cv: Condvar,
}

impl ConcurrencyLimit {
    /// `total` is clamped to at least 1.
    pub fn new(total: usize) -> Arc<Self> {
        let total = total.max(1);
        Arc::new(Self {
            total,
            state: Mutex::new(State {
                avail: total,
                peak: 0,
            }),
            cv: Condvar::new(),
        })
    }

    /// Poison-tolerant lock; permits must still be released after a worker panic.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Snapshot; may be stale by the time it is read.
    pub fn available(&self) -> usize {
        self.lock().avail
    }

    pub fn peak_in_use(&self) -> usize {
        self.lock().peak
    }

    /// Take a permit, blocking until one is free.
    pub fn acquire(self: &Arc<Self>) -> Permit {
        let mut st = self.lock();
        while st.avail == 0 {
            st = self.cv.wait(st).unwrap_or_else(PoisonError::into_inner);
        }
        self.take(&mut st)
    }

    fn take(self: &Arc<Self>, st: &mut State) -> Permit {
        st.avail -= 1;
        st.peak = st.peak.max(self.total - st.avail);
        Permit {
            limit: Arc::clone(self),
        }
    }

    fn release(&self) {
        let mut st = self.lock();
        debug_assert!(st.avail < self.total, "permit released twice");
        st.avail = (st.avail + 1).min(self.total);
        drop(st);
        self.cv.notify_one();
    }
}

/// RAII permit; released on drop.
#[derive(Debug)]
pub struct Permit {
    limit: Arc<ConcurrencyLimit>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.limit.release();
    }
}
