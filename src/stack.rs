//! Ambient scope stack
//!
//! Implicit resolution ([`ServiceRef::new`](crate::ServiceRef::new)) asks the
//! most recently entered scope. The stack is per thread: a scope entered on
//! one thread is invisible to others unless they enter it themselves through
//! a [`ScopeHandle`](crate::ScopeHandle).

use crate::scope::ScopeState;
use crate::{DiError, Result};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{error, trace};

thread_local! {
    static SCOPE_STACK: RefCell<Vec<Arc<ScopeState>>> = const { RefCell::new(Vec::new()) };
}

fn push(scope: Arc<ScopeState>) {
    SCOPE_STACK.with(|stack| stack.borrow_mut().push(scope));
}

/// Remove `scope` from the stack.
///
/// A scope that is not on top is still removed, since its destructor has
/// started, but the broken nesting is reported.
fn pop(scope: &Arc<ScopeState>) -> Result<()> {
    let (removed, result) = SCOPE_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        match stack.last() {
            Some(top) if Arc::ptr_eq(top, scope) => (stack.pop(), Ok(())),
            Some(top) => {
                let err = DiError::mismatched(top.id(), scope.id());
                let position = stack.iter().rposition(|entry| Arc::ptr_eq(entry, scope));
                (position.map(|position| stack.remove(position)), Err(err))
            }
            None => (None, Err(DiError::NoActiveScope)),
        }
    });
    // Dropped outside the borrow.
    drop(removed);
    result
}

/// The most recently entered scope on this thread.
pub(crate) fn top() -> Result<Arc<ScopeState>> {
    SCOPE_STACK.with(|stack| stack.borrow().last().cloned().ok_or(DiError::NoActiveScope))
}

/// Number of scopes entered on this thread.
pub fn depth() -> usize {
    SCOPE_STACK.with(|stack| stack.borrow().len())
}

/// Report an unrecoverable stack violation from a destructor.
///
/// Panics, or aborts when the thread is already unwinding.
pub(crate) fn fail_hard(err: DiError) {
    #[cfg(feature = "logging")]
    error!(target: "scoped_di", error = %err, "Dependency scope stack corrupted");

    if std::thread::panicking() {
        std::process::abort();
    }
    panic!("{err}");
}

/// One push of a scope onto this thread's stack; popped on [`leave`](Self::leave) or drop.
pub(crate) struct StackEntry {
    state: Arc<ScopeState>,
    entered: bool,
    /// Tied to the thread whose stack holds the entry.
    _not_send: PhantomData<*const ()>,
}

impl StackEntry {
    pub(crate) fn enter(state: Arc<ScopeState>) -> Self {
        push(Arc::clone(&state));

        #[cfg(feature = "logging")]
        trace!(target: "scoped_di", scope_id = state.id().id(), depth = depth(), "Scope pushed");

        Self {
            state,
            entered: true,
            _not_send: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn state(&self) -> &Arc<ScopeState> {
        &self.state
    }

    /// Pop the scope. Later calls are no-ops.
    pub(crate) fn leave(&mut self) -> Result<()> {
        if !std::mem::replace(&mut self.entered, false) {
            return Ok(());
        }

        #[cfg(feature = "logging")]
        trace!(target: "scoped_di", scope_id = self.state.id().id(), depth = depth(), "Scope popped");

        pop(&self.state)
    }
}

impl Drop for StackEntry {
    fn drop(&mut self) {
        if let Err(err) = self.leave() {
            fail_hard(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DisposalOrder;

    fn state() -> Arc<ScopeState> {
        Arc::new(ScopeState::new(&[], DisposalOrder::Insertion))
    }

    #[test]
    fn test_empty_stack_has_no_top() {
        assert_eq!(depth(), 0);
        assert!(matches!(top(), Err(DiError::NoActiveScope)));
    }

    #[test]
    fn test_lifo_discipline() {
        let a = state();
        let b = state();

        let mut entry_a = StackEntry::enter(Arc::clone(&a));
        let mut entry_b = StackEntry::enter(Arc::clone(&b));

        assert_eq!(depth(), 2);
        assert!(Arc::ptr_eq(&top().unwrap(), &b));

        entry_b.leave().unwrap();
        assert!(Arc::ptr_eq(&top().unwrap(), &a));

        entry_a.leave().unwrap();
        assert_eq!(depth(), 0);
    }

    #[test]
    fn test_out_of_order_leave_is_reported_and_removed() {
        let a = state();
        let b = state();

        let mut entry_a = StackEntry::enter(Arc::clone(&a));
        let mut entry_b = StackEntry::enter(Arc::clone(&b));

        match entry_a.leave() {
            Err(DiError::MismatchedScope { expected, found }) => {
                assert_eq!(expected, b.id());
                assert_eq!(found, a.id());
            }
            other => panic!("unexpected result: {other:?}"),
        }

        // A is gone; B is still on top and leaves cleanly.
        assert_eq!(depth(), 1);
        entry_b.leave().unwrap();
        assert_eq!(depth(), 0);
    }

    #[test]
    fn test_leave_is_idempotent() {
        let mut entry = StackEntry::enter(state());
        entry.leave().unwrap();
        entry.leave().unwrap();
        assert_eq!(depth(), 0);
    }
}
