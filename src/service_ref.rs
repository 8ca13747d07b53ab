//! Service references
//!
//! A [`ServiceRef`] is a resolved, shared handle to an interface. Creating
//! one resolves against the innermost scope of the current thread.

use crate::scope::ScopeHandle;
use crate::{DiError, Interface, Result, Shared, Tag, stack};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

/// Shared handle to interface `I`, resolved under tag `T`.
///
/// With the default [`Shared`] tag every reference created in the same scope
/// points at the same instance. [`Fresh`](crate::Fresh) builds a new instance
/// for each reference, and user tags get a cache slot of their own.
///
/// The handle keeps its instance alive on its own; it stays valid after the
/// scope that produced it is destroyed.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{Bindings, Fresh, Scope, ServiceRef};
/// use std::sync::Arc;
///
/// let app = Bindings::new().factory::<String, _>(|| Ok(Arc::new("hello".to_string())));
/// let _scope = Scope::new(&[&app]).unwrap();
///
/// let a = ServiceRef::<String>::new().unwrap();
/// let b = ServiceRef::<String>::new().unwrap();
/// assert!(ServiceRef::ptr_eq(&a, &b));
///
/// let fresh = ServiceRef::<String, Fresh>::new().unwrap();
/// assert!(!Arc::ptr_eq(&a.clone().into_arc(), &fresh.into_arc()));
/// ```
pub struct ServiceRef<I: ?Sized + Interface, T: Tag = Shared> {
    inner: Arc<I>,
    _tag: PhantomData<fn() -> T>,
}

impl<I: ?Sized + Interface, T: Tag> ServiceRef<I, T> {
    /// Resolve `I` from the innermost scope of the current thread.
    ///
    /// # Errors
    ///
    /// - [`DiError::NoActiveScope`] when no scope is entered on this thread
    /// - [`DiError::NotFound`] when the scope has no binding for `I`
    /// - [`DiError::CircularDependency`] when `I` is already being built for this tag
    /// - whatever the factory returns
    pub fn new() -> Result<Self> {
        let state = stack::top()?;
        state.resolve::<I, T>().map(Self::from_arc)
    }

    /// Resolve `I` from a specific scope.
    pub fn in_scope(scope: &ScopeHandle) -> Result<Self> {
        scope.resolve::<I, T>().map(Self::from_arc)
    }

    /// Like [`new`](Self::new), but a missing binding yields `Ok(None)`.
    ///
    /// Every other failure, including a missing scope, is still an error.
    pub fn optional() -> Result<Option<Self>> {
        match Self::new() {
            Ok(service) => Ok(Some(service)),
            Err(DiError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    #[inline]
    fn from_arc(inner: Arc<I>) -> Self {
        Self {
            inner,
            _tag: PhantomData,
        }
    }

    /// Whether two references point at the same instance.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }

    /// Unwrap into the underlying shared handle.
    #[inline]
    pub fn into_arc(self) -> Arc<I> {
        self.inner
    }
}

impl<I: ?Sized + Interface, T: Tag> Deref for ServiceRef<I, T> {
    type Target = I;

    #[inline]
    fn deref(&self) -> &I {
        &self.inner
    }
}

impl<I: ?Sized + Interface, T: Tag> AsRef<I> for ServiceRef<I, T> {
    #[inline]
    fn as_ref(&self) -> &I {
        &self.inner
    }
}

impl<I: ?Sized + Interface, T: Tag> Clone for ServiceRef<I, T> {
    #[inline]
    fn clone(&self) -> Self {
        Self::from_arc(Arc::clone(&self.inner))
    }
}

impl<I: ?Sized + Interface, T: Tag> From<ServiceRef<I, T>> for Arc<I> {
    #[inline]
    fn from(service: ServiceRef<I, T>) -> Self {
        service.inner
    }
}

impl<I: ?Sized + Interface + fmt::Debug, T: Tag> fmt::Debug for ServiceRef<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceRef").field(&&*self.inner).finish()
    }
}
