//! # scoped-di - Scoped Dependency Injection for Rust
//!
//! Bind interfaces to implementations in plain binding tables, enter a scope
//! over one or more tables, and resolve services from anywhere below it with
//! [`ServiceRef`]. Scopes nest: resolution always asks the innermost one, and
//! destroying a scope releases everything it built.
//!
//! ## Features
//!
//! - **Interfaces as trait objects** - bind `dyn Trait` to any implementing type
//! - **Ambient scopes** - components resolve their own dependencies without a container argument
//! - **Tagged caching** - [`Shared`] instances per scope, [`Fresh`] per request, or your own tags
//! - **Cycle detection** - circular dependencies fail with an error instead of overflowing the stack
//! - **Thread-safe** - share a scope across threads through a [`ScopeHandle`]
//! - **Observable** - optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use scoped_di::{implements, Bindings, Component, Result, Scope, ServiceRef};
//!
//! trait Printer: Send + Sync {
//!     fn print(&self, text: &str) -> String;
//! }
//!
//! struct ConsolePrinter;
//!
//! impl Printer for ConsolePrinter {
//!     fn print(&self, text: &str) -> String {
//!         format!("console: {text}")
//!     }
//! }
//!
//! impl Component for ConsolePrinter {
//!     type Args = ();
//!
//!     fn construct(_: ()) -> Result<Self> {
//!         Ok(ConsolePrinter)
//!     }
//! }
//!
//! implements!(ConsolePrinter => dyn Printer);
//!
//! struct Greeter {
//!     printer: ServiceRef<dyn Printer>,
//! }
//!
//! impl Component for Greeter {
//!     type Args = ();
//!
//!     fn construct(_: ()) -> Result<Self> {
//!         Ok(Greeter { printer: ServiceRef::new()? })
//!     }
//! }
//!
//! let app = Bindings::new()
//!     .bind::<dyn Printer, ConsolePrinter>()
//!     .bind::<Greeter, Greeter>();
//!
//! let _scope = Scope::new(&[&app]).unwrap();
//! let greeter = ServiceRef::<Greeter>::new().unwrap();
//! assert_eq!(greeter.printer.print("hello"), "console: hello");
//! ```
//!
//! ## Tags
//!
//! ```rust
//! use scoped_di::{Bindings, Fresh, Scope, ServiceRef, Tag};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! static NEXT: AtomicU32 = AtomicU32::new(0);
//!
//! struct RequestId(u32);
//!
//! // A user tag gets a cache slot of its own in every scope.
//! struct Audit;
//! impl Tag for Audit {}
//!
//! let app = Bindings::new()
//!     .factory::<RequestId, _>(|| Ok(Arc::new(RequestId(NEXT.fetch_add(1, Ordering::SeqCst)))));
//! let _scope = Scope::new(&[&app]).unwrap();
//!
//! let a = ServiceRef::<RequestId>::new().unwrap();
//! let b = ServiceRef::<RequestId>::new().unwrap();
//! let audit = ServiceRef::<RequestId, Audit>::new().unwrap();
//! let fresh = ServiceRef::<RequestId, Fresh>::new().unwrap();
//!
//! assert_eq!(a.0, b.0);
//! assert_ne!(a.0, audit.0);
//! assert_ne!(a.0, fresh.0);
//! ```
//!
//! ## Nested Scopes
//!
//! ```rust
//! use scoped_di::{Bindings, Scope, ServiceRef};
//! use std::sync::Arc;
//!
//! struct AppConfig { name: String }
//!
//! let production = Bindings::new().instance(Arc::new(AppConfig { name: "prod".into() }));
//! let testing = Bindings::new().instance(Arc::new(AppConfig { name: "test".into() }));
//!
//! let _outer = Scope::new(&[&production]).unwrap();
//! assert_eq!(ServiceRef::<AppConfig>::new().unwrap().name, "prod");
//!
//! {
//!     let _inner = Scope::new(&[&testing]).unwrap();
//!     assert_eq!(ServiceRef::<AppConfig>::new().unwrap().name, "test");
//! }
//!
//! assert_eq!(ServiceRef::<AppConfig>::new().unwrap().name, "prod");
//! ```

mod bindings;
mod cycle;
mod error;
mod factory;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod scope;
mod service_ref;
pub mod stack;
mod storage;

pub use bindings::Bindings;
pub use error::*;
pub use factory::{FactoryRecord, Instance};
pub use provider::*;
pub use scope::{
    DisposalOrder, EnteredScope, Scope, ScopeBuilder, ScopeHandle, ScopeId, current,
};
pub use service_ref::ServiceRef;

#[cfg(feature = "derive")]
pub use scoped_di_derive::Component;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Bindings, Component, DiError, DisposalOrder, Fresh, Implements, Interface, Result, Scope,
        ScopeHandle, ServiceRef, Shared, Tag, implements,
    };
    pub use std::sync::Arc;
}
