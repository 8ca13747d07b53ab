//! Provider traits for dependency injection
//!
//! These traits define what can be requested from a scope (interfaces),
//! what can be bound to them (components), and which cache slot a request
//! uses (tags). Type identity for all three comes from [`TypeKey`].

use crate::Result;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// =============================================================================
// Type identity
// =============================================================================

/// Identity token for a static type.
///
/// Equality and hashing use the `TypeId` only; the name is carried for
/// diagnostics and log output.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Identity of `T`, which may be unsized (`dyn Trait`).
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Human-readable type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Cache slot identity: a tag paired with an interface.
///
/// Two tags against the same interface are two distinct slots.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ServiceKey {
    /// Identity of the tag type
    pub tag: TypeKey,
    /// Identity of the interface type
    pub interface: TypeKey,
}

impl ServiceKey {
    /// Slot for interface `I` under tag `T`.
    #[inline]
    pub fn of<T: Tag, I: ?Sized + 'static>() -> Self {
        Self {
            tag: TypeKey::of::<T>(),
            interface: TypeKey::of::<I>(),
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.interface, self.tag)
    }
}

// =============================================================================
// Interfaces and implementations
// =============================================================================

/// Marker trait for anything that can be requested from a scope.
///
/// This is automatically implemented for all `Send + Sync + 'static` types,
/// sized or not. Trait objects qualify when the trait has `Send + Sync` as
/// supertraits:
///
/// ```rust
/// trait Printer: Send + Sync {
///     fn print(&self, text: &str);
/// }
///
/// fn assert_interface<I: ?Sized + scoped_di::Interface>() {}
/// assert_interface::<dyn Printer>();
/// ```
pub trait Interface: Send + Sync + 'static {}

impl<T: ?Sized + Send + Sync + 'static> Interface for T {}

/// Upcast from a concrete implementation to the interface it is bound to.
///
/// Every type implements itself. Implementations of trait-object interfaces
/// are declared with [`implements!`](crate::implements).
pub trait Implements<I: ?Sized + Interface>: Send + Sync + 'static {
    /// Convert a shared handle to the implementation into one to the interface.
    fn upcast(self: Arc<Self>) -> Arc<I>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    #[inline]
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// A concrete type that a binding table knows how to construct.
///
/// `Args` are captured by value when the binding is declared and cloned for
/// every construction, so a factory can run any number of times. A component
/// may resolve its own dependencies by creating
/// [`ServiceRef`](crate::ServiceRef)s inside `construct`.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{Component, Result};
///
/// struct FilePrinter {
///     path: String,
/// }
///
/// impl Component for FilePrinter {
///     type Args = String;
///
///     fn construct(path: String) -> Result<Self> {
///         Ok(FilePrinter { path })
///     }
/// }
/// ```
pub trait Component: Sized + Send + Sync + 'static {
    /// Arguments captured at binding time.
    type Args: Clone + Send + Sync + 'static;

    /// Build a fresh instance from a copy of the captured arguments.
    fn construct(args: Self::Args) -> Result<Self>;
}

/// Declare which trait-object interfaces a type implements.
///
/// ```rust
/// use scoped_di::implements;
///
/// trait Printer: Send + Sync {}
/// trait Sink: Send + Sync {}
///
/// struct ConsolePrinter;
/// impl Printer for ConsolePrinter {}
/// impl Sink for ConsolePrinter {}
///
/// implements!(ConsolePrinter => dyn Printer, dyn Sink);
/// ```
#[macro_export]
macro_rules! implements {
    ($implementation:ty => $($interface:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$interface> for $implementation {
                #[inline]
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$interface> {
                    self
                }
            }
        )+
    };
}

// =============================================================================
// Tags
// =============================================================================

/// Compile-time marker selecting a cache slot.
///
/// Requests with the same tag type share one instance per scope; different
/// tags get distinct instances. User tags only need an empty impl:
///
/// ```rust
/// struct Audit;
/// impl scoped_di::Tag for Audit {}
/// ```
pub trait Tag: 'static {
    /// Whether resolutions under this tag go through the instance cache.
    const CACHED: bool = true;
}

/// Default tag: one cached instance per scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Shared;

impl Tag for Shared {}

/// Bypass the cache and construct a brand-new instance on every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fresh;

impl Tag for Fresh {
    const CACHED: bool = false;
}
