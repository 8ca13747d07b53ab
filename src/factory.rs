//! Factory records for creating service instances
//!
//! A factory record pairs an erased construction thunk with the identity of
//! the interface it is bound to and the implementation it builds. Records
//! are cheap to clone; every clone shares the same thunk.
//!
//! Erased instances are `Arc<dyn Any + Send + Sync>` whose concrete content is
//! an `Arc<I>` for the bound interface `I`. Wrapping the (possibly unsized)
//! interface handle this way lets one map hold every interface, and
//! [`project`] recovers the typed handle on the way out.

use crate::{Component, DiError, Implements, Interface, Result, TypeKey};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::trace;

/// Erased shared handle stored in the instance cache.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Type-erased construction thunk
type Thunk = Arc<dyn Fn() -> Result<Instance> + Send + Sync>;

/// Erase a typed interface handle.
#[inline]
pub(crate) fn erase<I: ?Sized + Interface>(instance: Arc<I>) -> Instance {
    Arc::new(instance)
}

/// Recover the typed interface handle from an erased instance.
#[inline]
pub(crate) fn project<I: ?Sized + Interface>(
    instance: &Instance,
    implementation: TypeKey,
) -> Result<Arc<I>> {
    instance
        .downcast_ref::<Arc<I>>()
        .cloned()
        .ok_or_else(|| DiError::type_mismatch::<I>(implementation.name()))
}

/// Produces fresh implementation instances for one interface binding.
#[derive(Clone)]
pub struct FactoryRecord {
    interface: TypeKey,
    implementation: TypeKey,
    thunk: Thunk,
}

impl FactoryRecord {
    /// Record that builds `C` from a clone of `args` and exposes it as `I`.
    pub fn component<I, C>(args: C::Args) -> Self
    where
        I: ?Sized + Interface,
        C: Component + Implements<I>,
    {
        Self {
            interface: TypeKey::of::<I>(),
            implementation: TypeKey::of::<C>(),
            thunk: Arc::new(move || {
                let instance = Arc::new(C::construct(args.clone())?);
                Ok(erase::<I>(<C as Implements<I>>::upcast(instance)))
            }),
        }
    }

    /// Record backed by a closure returning the interface handle directly.
    pub fn from_fn<I, F>(factory: F) -> Self
    where
        I: ?Sized + Interface,
        F: Fn() -> Result<Arc<I>> + Send + Sync + 'static,
    {
        Self {
            interface: TypeKey::of::<I>(),
            implementation: TypeKey::of::<F>(),
            thunk: Arc::new(move || factory().map(erase::<I>)),
        }
    }

    /// Record that hands out clones of one pre-built handle.
    pub fn instance<I: ?Sized + Interface>(instance: Arc<I>) -> Self {
        let erased = erase::<I>(instance);
        Self {
            interface: TypeKey::of::<I>(),
            implementation: TypeKey::of::<Arc<I>>(),
            thunk: Arc::new(move || Ok(Arc::clone(&erased))),
        }
    }

    /// Identity of the interface this record is bound to.
    #[inline]
    pub fn interface(&self) -> TypeKey {
        self.interface
    }

    /// Identity of the implementation this record produces.
    #[inline]
    pub fn implementation(&self) -> TypeKey {
        self.implementation
    }

    /// Run the thunk, producing a new erased instance.
    #[inline]
    pub fn create(&self) -> Result<Instance> {
        #[cfg(feature = "logging")]
        trace!(
            target: "scoped_di",
            interface = self.interface.name(),
            implementation = self.implementation.name(),
            "Invoking factory"
        );

        (self.thunk)()
    }

    /// Run the thunk and project the result to `I`.
    #[inline]
    pub fn create_typed<I: ?Sized + Interface>(&self) -> Result<Arc<I>> {
        let instance = self.create()?;
        project::<I>(&instance, self.implementation)
    }
}

impl fmt::Debug for FactoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRecord")
            .field("interface", &self.interface)
            .field("implementation", &self.implementation)
            .finish()
    }
}
