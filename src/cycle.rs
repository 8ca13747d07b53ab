//! Construction cycle detection
//!
//! Each scope owns one [`CycleChecker`] holding the cache slots currently
//! under construction and the thread building each of them. Re-entering a
//! slot on the thread that is building it is a cycle. Reaching a slot that
//! another thread is building parks the caller until that construction ends,
//! unless the owning thread is itself (transitively) parked on a slot held by
//! the caller, which is a cycle spread across threads.
//!
//! Parked threads are tracked per scope. A wait loop whose slots live in two
//! different scopes (thread A builds in scope X and waits on scope Y while
//! thread B builds in Y and waits on X) is not visible to either checker, and
//! both threads stay parked.

use crate::{DiError, Result, ServiceKey};
use ahash::RandomState;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::thread::{self, ThreadId};

#[cfg(feature = "logging")]
use tracing::{trace, warn};

#[derive(Default)]
struct State {
    /// Slot -> thread constructing it
    active: HashMap<ServiceKey, ThreadId, RandomState>,
    /// Thread -> slot it is parked on
    waiting: HashMap<ThreadId, ServiceKey, RandomState>,
}

impl State {
    /// Whether `owner` is parked, directly or through other threads, on a slot held by `me`.
    fn blocked_on(&self, mut owner: ThreadId, me: ThreadId) -> bool {
        // Each hop visits a distinct parked thread, so the walk is bounded.
        for _ in 0..=self.waiting.len() {
            if owner == me {
                return true;
            }
            match self.waiting.get(&owner).and_then(|key| self.active.get(key)) {
                Some(&next) => owner = next,
                None => return false,
            }
        }
        false
    }
}

/// Outcome of [`CycleChecker::enter`].
pub(crate) enum Entry<'a> {
    /// The caller now owns construction of the slot.
    Acquired(CycleGuard<'a>),
    /// Another thread finished (or abandoned) the slot; re-read the cache.
    Retry,
}

/// Tracks which cache slots are being constructed in one scope.
#[derive(Default)]
pub(crate) struct CycleChecker {
    state: Mutex<State>,
    released: Condvar,
}

impl CycleChecker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claim construction of `key` for the current thread.
    pub(crate) fn enter(&self, key: ServiceKey) -> Result<Entry<'_>> {
        let me = thread::current().id();
        let mut state = self.state.lock();

        let owner = state.active.get(&key).copied();
        let Some(owner) = owner else {
            state.active.insert(key, me);
            return Ok(Entry::Acquired(CycleGuard { checker: self, key }));
        };

        if state.blocked_on(owner, me) {
            #[cfg(feature = "logging")]
            warn!(
                target: "scoped_di",
                service = key.interface.name(),
                tag = key.tag.name(),
                cross_thread = owner != me,
                "Circular dependency detected"
            );

            return Err(DiError::CircularDependency {
                type_name: key.interface.name(),
                tag: key.tag.name(),
            });
        }

        #[cfg(feature = "logging")]
        trace!(
            target: "scoped_di",
            service = key.interface.name(),
            tag = key.tag.name(),
            "Slot is being constructed on another thread, waiting"
        );

        state.waiting.insert(me, key);
        self.released.wait(&mut state);
        state.waiting.remove(&me);

        Ok(Entry::Retry)
    }

    /// Whether `key` is currently under construction.
    #[cfg(test)]
    pub(crate) fn is_active(&self, key: &ServiceKey) -> bool {
        self.state.lock().active.contains_key(key)
    }

    /// Number of slots currently under construction.
    pub(crate) fn len(&self) -> usize {
        self.state.lock().active.len()
    }
}

/// Releases a claimed slot when dropped, including during unwinding.
pub(crate) struct CycleGuard<'a> {
    checker: &'a CycleChecker,
    key: ServiceKey,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.checker.state.lock().active.remove(&self.key);
        self.checker.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shared;
    use std::sync::Barrier;

    struct A;
    struct B;

    #[test]
    fn test_reentry_on_same_thread_is_cycle() {
        let checker = CycleChecker::new();
        let key = ServiceKey::of::<Shared, A>();

        let _guard = checker.enter(key).unwrap();
        assert!(checker.is_active(&key));

        match checker.enter(key) {
            Err(err) => assert!(err.is_circular()),
            Ok(_) => panic!("expected a cycle error"),
        }
    }

    #[test]
    fn test_guard_releases_slot() {
        let checker = CycleChecker::new();
        let key = ServiceKey::of::<Shared, A>();

        {
            let _guard = checker.enter(key).unwrap();
            assert_eq!(checker.len(), 1);
        }

        assert_eq!(checker.len(), 0);
        assert!(matches!(checker.enter(key), Ok(Entry::Acquired(_))));
    }

    #[test]
    fn test_distinct_slots_do_not_alias() {
        let checker = CycleChecker::new();

        let _a = checker.enter(ServiceKey::of::<Shared, A>()).unwrap();
        let _b = checker.enter(ServiceKey::of::<Shared, B>()).unwrap();

        assert_eq!(checker.len(), 2);
    }

    #[test]
    fn test_other_thread_waits_then_retries() {
        let checker = CycleChecker::new();
        let key = ServiceKey::of::<Shared, A>();
        let barrier = Barrier::new(2);

        thread::scope(|s| {
            let guard = checker.enter(key).unwrap();

            let waiter = s.spawn(|| {
                barrier.wait();
                matches!(checker.enter(key), Ok(Entry::Retry))
            });

            barrier.wait();
            while checker.state.lock().waiting.is_empty() {
                thread::yield_now();
            }
            drop(guard);

            assert!(waiter.join().unwrap());
        });
    }

    #[test]
    fn test_cross_thread_cycle() {
        let checker = CycleChecker::new();
        let key_a = ServiceKey::of::<Shared, A>();
        let key_b = ServiceKey::of::<Shared, B>();
        let barrier = Barrier::new(2);

        thread::scope(|s| {
            let guard_a = checker.enter(key_a).unwrap();

            let other = s.spawn(|| {
                let _guard_b = checker.enter(key_b).unwrap();
                barrier.wait();
                // Parks on A, which is held by the main thread.
                matches!(checker.enter(key_a), Ok(Entry::Retry))
            });

            barrier.wait();
            while !checker.state.lock().waiting.values().any(|key| *key == key_a) {
                thread::yield_now();
            }

            match checker.enter(key_b) {
                Err(err) => assert!(err.is_circular()),
                Ok(_) => panic!("expected a cross-thread cycle"),
            }

            drop(guard_a);
            assert!(other.join().unwrap());
        });
    }
}
