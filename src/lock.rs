//! The structural lock guarding child lists.
//!
//! A `ListLock` is a try-lock with a bounded spin. It is not reentrant and is only ever held for a
//! single list operation; closures passed to [`ListLock::with`] must not call back into controls.
//! Callers that need to walk the list take a [`ListLock::snapshot`] and iterate outside the lock.

use crate::error::LockError;
use parking_lot::{Mutex, MutexGuard};
use std::hint;
use std::thread;

/// Attempts before giving up.
const SPIN_LIMIT: u32 = 1 << 14;

/// Every this many failed attempts the spinning thread yields its time slice.
const YIELD_EVERY: u32 = 64;

#[derive(Debug, Default)]
pub struct ListLock<T> {
    inner: Mutex<T>,
    #[cfg(debug_assertions)]
    holder: Mutex<Option<(thread::ThreadId, &'static str)>>,
}

impl<T> ListLock<T> {
    pub fn new(value: T) -> ListLock<T> {
        ListLock {
            inner: Mutex::new(value),
            #[cfg(debug_assertions)]
            holder: Mutex::new(None),
        }
    }

    /// Runs `op` with exclusive access to the list.
    ///
    /// # Panics
    /// In debug builds, if the calling thread already holds this lock.
    pub fn with<R>(&self, op: &'static str, f: impl FnOnce(&mut T) -> R) -> Result<R, LockError> {
        #[cfg(debug_assertions)]
        self.check_recursion(op);

        let mut guard = self.acquire(op)?;

        #[cfg(debug_assertions)]
        {
            *self.holder.lock() = Some((thread::current().id(), op));
        }
        let result = f(&mut guard);
        #[cfg(debug_assertions)]
        {
            *self.holder.lock() = None;
        }

        Ok(result)
    }

    fn acquire(&self, op: &'static str) -> Result<MutexGuard<'_, T>, LockError> {
        for attempt in 1..=SPIN_LIMIT {
            if let Some(guard) = self.inner.try_lock() {
                return Ok(guard);
            }
            if attempt % YIELD_EVERY == 0 {
                thread::yield_now();
            } else {
                hint::spin_loop();
            }
        }
        Err(LockError { op })
    }

    #[cfg(debug_assertions)]
    fn check_recursion(&self, op: &'static str) {
        if let Some((holder, held_by)) = *self.holder.lock() {
            if holder == thread::current().id() {
                panic!(
                    "lock requested by {} but already held by {} on the same thread",
                    op, held_by
                );
            }
        }
    }
}

#[cfg(test)]
impl<T> ListLock<T> {
    /// Holds the lock without going through `with`, as another thread would.
    pub(crate) fn hold(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }
}

impl<T: Clone> ListLock<T> {
    /// Returns a copy of the list, taken inside the critical section.
    pub fn snapshot(&self, op: &'static str) -> Result<T, LockError> {
        self.with(op, |list| list.clone())
    }
}
