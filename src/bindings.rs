//! Binding tables
//!
//! A [`Bindings`] value records which implementation backs each interface.
//! It is a plain data value: building it has no side effects, and scopes
//! copy what they need out of it when they are entered.

use crate::factory::FactoryRecord;
use crate::{Component, Implements, Interface, Result, TypeKey};
use ahash::RandomState;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::debug;

/// Declarative table of interface bindings.
///
/// Every `(interface, implementation)` pair is recorded. When an interface
/// has several implementations, the most recently registered one is the one
/// a scope will use.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{implements, Bindings, Component, Result};
///
/// trait Printer: Send + Sync {
///     fn print(&self, text: &str);
/// }
///
/// struct ConsolePrinter;
///
/// impl Printer for ConsolePrinter {
///     fn print(&self, text: &str) {
///         println!("{text}");
///     }
/// }
///
/// impl Component for ConsolePrinter {
///     type Args = ();
///
///     fn construct(_: ()) -> Result<Self> {
///         Ok(ConsolePrinter)
///     }
/// }
///
/// implements!(ConsolePrinter => dyn Printer);
///
/// let app = Bindings::new().bind::<dyn Printer, ConsolePrinter>();
/// assert!(app.contains::<dyn Printer>());
/// ```
#[derive(Clone, Default)]
pub struct Bindings {
    /// Interface -> implementations, oldest first
    interfaces: HashMap<TypeKey, Vec<FactoryRecord>, RandomState>,
}

impl Bindings {
    /// Create an empty binding table.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `I` to component `C`, constructed from a clone of `args` each time.
    pub fn service<I, C>(self, args: C::Args) -> Self
    where
        I: ?Sized + Interface,
        C: Component + Implements<I>,
    {
        self.insert(FactoryRecord::component::<I, C>(args))
    }

    /// Bind `I` to a component that takes no arguments.
    #[inline]
    pub fn bind<I, C>(self) -> Self
    where
        I: ?Sized + Interface,
        C: Component<Args = ()> + Implements<I>,
    {
        self.service::<I, C>(())
    }

    /// Bind `I` to a closure producing the interface handle.
    ///
    /// The closure may resolve other services through
    /// [`ServiceRef`](crate::ServiceRef).
    pub fn factory<I, F>(self, factory: F) -> Self
    where
        I: ?Sized + Interface,
        F: Fn() -> Result<Arc<I>> + Send + Sync + 'static,
    {
        self.insert(FactoryRecord::from_fn::<I, F>(factory))
    }

    /// Bind `I` to one pre-built handle, shared by every resolution.
    pub fn instance<I: ?Sized + Interface>(self, instance: Arc<I>) -> Self {
        self.insert(FactoryRecord::instance::<I>(instance))
    }

    /// Append every binding of `other`, as if it had been declared here.
    pub fn merge(mut self, other: &Bindings) -> Self {
        for records in other.interfaces.values() {
            for record in records {
                self = self.insert(record.clone());
            }
        }
        self
    }

    fn insert(mut self, record: FactoryRecord) -> Self {
        let interface = record.interface();
        let implementation = record.implementation();

        #[cfg(feature = "logging")]
        debug!(
            target: "scoped_di",
            interface = interface.name(),
            implementation = implementation.name(),
            "Registering binding"
        );

        let records = self.interfaces.entry(interface).or_default();
        // Re-binding the same implementation replaces it and makes it the newest.
        records.retain(|existing| existing.implementation() != implementation);
        records.push(record);
        self
    }

    /// Number of bound interfaces.
    #[inline]
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    /// Whether no interface is bound.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Whether `I` has at least one binding.
    #[inline]
    pub fn contains<I: ?Sized + Interface>(&self) -> bool {
        self.interfaces.contains_key(&TypeKey::of::<I>())
    }

    /// Implementations recorded for `I`, oldest first.
    pub fn implementations<I: ?Sized + Interface>(&self) -> Vec<TypeKey> {
        self.interfaces
            .get(&TypeKey::of::<I>())
            .map(|records| records.iter().map(FactoryRecord::implementation).collect())
            .unwrap_or_default()
    }

    /// Every record, grouped by interface, oldest implementation first.
    pub(crate) fn records(&self) -> impl Iterator<Item = &FactoryRecord> {
        self.interfaces.values().flatten()
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.interfaces.iter().map(|(interface, records)| {
                let implementations: Vec<TypeKey> =
                    records.iter().map(FactoryRecord::implementation).collect();
                (interface, implementations)
            }))
            .finish()
    }
}
