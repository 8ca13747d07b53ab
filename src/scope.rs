//! Dependency scopes
//!
//! A [`Scope`] snapshots one or more binding tables, caches the instances it
//! constructs, and sits on the ambient stack for as long as it lives. Scopes
//! must be destroyed in the reverse order they were entered.

use crate::cycle::{CycleChecker, Entry};
use crate::factory::{FactoryRecord, Instance, project};
use crate::stack::{self, StackEntry};
use crate::storage::{ImplTable, InstanceCache};
use crate::{Bindings, DiError, Interface, Result, ServiceKey, Shared, Tag, TypeKey};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Unique scope identifier.
///
/// Each scope gets a unique ID for tracking and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    /// Generate a new unique scope ID.
    #[inline]
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope-{}", self.0)
    }
}

/// Order in which a scope releases its cached instances when destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalOrder {
    /// Oldest instance first
    #[default]
    Insertion,
    /// Newest instance first, so dependents go before their dependencies
    Reverse,
}

// =============================================================================
// Scope state
// =============================================================================

/// Everything a scope owns; shared between the scope, its handles and the stack.
pub(crate) struct ScopeState {
    id: ScopeId,
    impls: ImplTable,
    instances: InstanceCache,
    checker: CycleChecker,
    disposal: DisposalOrder,
    closed: AtomicBool,
}

impl ScopeState {
    pub(crate) fn new(bindings: &[&Bindings], disposal: DisposalOrder) -> Self {
        let mut impls = ImplTable::new();
        for table in bindings {
            impls.register(table);
        }

        Self {
            id: ScopeId::next(),
            impls,
            instances: InstanceCache::new(),
            checker: CycleChecker::new(),
            disposal,
            closed: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> ScopeId {
        self.id
    }

    #[inline]
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Resolve interface `I` under tag `T` against this scope.
    pub(crate) fn resolve<I: ?Sized + Interface, T: Tag>(&self) -> Result<Arc<I>> {
        if self.is_closed() {
            return Err(DiError::ScopeClosed { scope: self.id });
        }

        let Some(record) = self.impls.get(&TypeKey::of::<I>()) else {
            #[cfg(feature = "logging")]
            debug!(
                target: "scoped_di",
                service = std::any::type_name::<I>(),
                scope_id = self.id.0,
                "Service interface is not bound in scope"
            );
            return Err(DiError::not_found::<I>());
        };

        if !T::CACHED {
            #[cfg(feature = "logging")]
            trace!(
                target: "scoped_di",
                service = std::any::type_name::<I>(),
                scope_id = self.id.0,
                "Creating fresh instance"
            );
            return record.create_typed::<I>();
        }

        let instance = self.resolve_cached(record, ServiceKey::of::<T, I>())?;
        project::<I>(&instance, record.implementation())
    }

    /// Cached resolution: read, claim, construct, then write with a re-check.
    fn resolve_cached(&self, record: &FactoryRecord, key: ServiceKey) -> Result<Instance> {
        loop {
            if let Some(instance) = self.instances.get(&key) {
                #[cfg(feature = "logging")]
                trace!(
                    target: "scoped_di",
                    service = key.interface.name(),
                    tag = key.tag.name(),
                    scope_id = self.id.0,
                    "Service resolved from scope cache"
                );
                return Ok(instance);
            }

            let _guard = match self.checker.enter(key)? {
                Entry::Acquired(guard) => guard,
                Entry::Retry => continue,
            };

            // Another thread may have committed between the read and the claim.
            if let Some(instance) = self.instances.get(&key) {
                return Ok(instance);
            }

            let instance = record.create()?;
            // The scope may have been destroyed while the factory ran.
            let Some((instance, stored)) = self.instances.insert_or_get(key, instance) else {
                return Err(DiError::ScopeClosed { scope: self.id });
            };

            #[cfg(feature = "logging")]
            debug!(
                target: "scoped_di",
                service = key.interface.name(),
                implementation = record.implementation().name(),
                tag = key.tag.name(),
                scope_id = self.id.0,
                stored,
                "Constructed shared instance"
            );
            #[cfg(not(feature = "logging"))]
            let _ = stored;

            return Ok(instance);
        }
    }

    /// Drop every cached instance and refuse further resolutions.
    fn release(&self) {
        self.closed.store(true, Ordering::Release);
        let released = self.instances.drain(self.disposal);

        #[cfg(feature = "logging")]
        if !released.is_empty() {
            debug!(
                target: "scoped_di",
                scope_id = self.id.0,
                released = released.len(),
                order = ?self.disposal,
                "Released cached instances"
            );
        }

        for (_key, instance) in released {
            drop(instance);
        }
    }
}

// =============================================================================
// Scope
// =============================================================================

/// A lifetime region owning a binding snapshot and an instance cache.
///
/// Constructing a scope pushes it on the current thread's scope stack;
/// dropping it pops it and releases every instance it cached. Scopes must be
/// dropped in reverse order of construction. Dropping one that is not on top
/// panics; use [`close`](Self::close) to get the error instead.
///
/// A scope is tied to the thread that entered it. Use [`handle`](Self::handle)
/// to resolve from other threads.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{Bindings, Scope, ServiceRef};
///
/// #[derive(Debug)]
/// struct Config {
///     name: String,
/// }
///
/// let app = Bindings::new().instance(std::sync::Arc::new(Config { name: "app".into() }));
///
/// let scope = Scope::new(&[&app]).unwrap();
/// let config = ServiceRef::<Config>::new().unwrap();
/// assert_eq!(config.name, "app");
/// # drop(scope);
/// ```
pub struct Scope {
    entry: StackEntry,
}

impl Scope {
    /// Enter a new scope built from `bindings`.
    ///
    /// When several tables bind the same interface the last one wins.
    pub fn new(bindings: &[&Bindings]) -> Result<Self> {
        Self::builder().bindings_all(bindings).enter()
    }

    /// Start configuring a scope.
    #[inline]
    pub fn builder<'a>() -> ScopeBuilder<'a> {
        ScopeBuilder::new()
    }

    #[inline]
    fn state(&self) -> &Arc<ScopeState> {
        self.entry.state()
    }

    /// The scope identifier.
    #[inline]
    pub fn id(&self) -> ScopeId {
        self.state().id
    }

    /// Number of bound interfaces.
    #[inline]
    pub fn len(&self) -> usize {
        self.state().impls.len()
    }

    /// Whether no interface is bound.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cached instances.
    #[inline]
    pub fn cached_len(&self) -> usize {
        self.state().instances.len()
    }

    /// Number of slots currently under construction.
    #[inline]
    pub fn constructing(&self) -> usize {
        self.state().checker.len()
    }

    /// Whether `I` is bound in this scope.
    #[inline]
    pub fn contains<I: ?Sized + Interface>(&self) -> bool {
        self.state().impls.contains(&TypeKey::of::<I>())
    }

    /// Whether `(T, I)` already has a cached instance.
    #[inline]
    pub fn is_cached<I: ?Sized + Interface, T: Tag>(&self) -> bool {
        self.state().instances.contains(&ServiceKey::of::<T, I>())
    }

    /// Resolve `I` under tag `T` from this scope.
    ///
    /// The scope is made the top of the stack for the duration of the call, so
    /// dependencies resolved by factories come from this scope too.
    pub fn resolve<I: ?Sized + Interface, T: Tag>(&self) -> Result<Arc<I>> {
        resolve_entered::<I, T>(self.state())
    }

    /// Construct every bound interface under the [`Shared`] tag.
    ///
    /// Surfaces missing bindings, cycles and factory failures up front and
    /// leaves the cache warm. Stops at the first error.
    pub fn validate(&self) -> Result<()> {
        let mut entry = StackEntry::enter(Arc::clone(self.state()));
        let state = entry.state();

        #[cfg(feature = "logging")]
        debug!(
            target: "scoped_di",
            scope_id = state.id.0,
            services = state.impls.len(),
            "Validating scope"
        );

        let result = state.impls.records().try_for_each(|record| {
            let key = ServiceKey {
                tag: TypeKey::of::<Shared>(),
                interface: record.interface(),
            };
            state.resolve_cached(record, key).map(drop)
        });

        entry.leave()?;
        result
    }

    /// A thread-safe handle to this scope.
    #[inline]
    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            state: Arc::clone(self.state()),
        }
    }

    /// Destroy the scope, reporting broken nesting instead of panicking.
    ///
    /// Cached instances are released whether or not the scope was on top.
    pub fn close(mut self) -> Result<()> {
        self.destroy()
    }

    fn destroy(&mut self) -> Result<()> {
        if self.state().is_closed() {
            return Ok(());
        }

        let left = self.entry.leave();
        self.state().release();

        #[cfg(feature = "logging")]
        debug!(
            target: "scoped_di",
            scope_id = self.state().id.0,
            depth = stack::depth(),
            "Left dependency scope"
        );

        left
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if let Err(err) = self.destroy() {
            stack::fail_hard(err);
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id())
            .field("services", &self.len())
            .field("cached", &self.cached_len())
            .finish()
    }
}

fn resolve_entered<I: ?Sized + Interface, T: Tag>(state: &Arc<ScopeState>) -> Result<Arc<I>> {
    let mut entry = StackEntry::enter(Arc::clone(state));
    let result = entry.state().resolve::<I, T>();
    entry.leave()?;
    result
}

// =============================================================================
// Scope builder
// =============================================================================

/// Builder for scopes with non-default options.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{Bindings, DisposalOrder, Scope};
///
/// let app = Bindings::new().instance(std::sync::Arc::new(42u32));
///
/// let scope = Scope::builder()
///     .bindings(&app)
///     .disposal(DisposalOrder::Reverse)
///     .enter()
///     .unwrap();
/// assert!(scope.contains::<u32>());
/// # drop(scope);
/// ```
#[derive(Debug, Default)]
pub struct ScopeBuilder<'a> {
    bindings: Vec<&'a Bindings>,
    disposal: DisposalOrder,
}

impl<'a> ScopeBuilder<'a> {
    /// Create a new scope builder.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding table. Later tables override earlier ones.
    pub fn bindings(mut self, bindings: &'a Bindings) -> Self {
        self.bindings.push(bindings);
        self
    }

    /// Add several binding tables in order.
    pub fn bindings_all(mut self, bindings: &[&'a Bindings]) -> Self {
        self.bindings.extend_from_slice(bindings);
        self
    }

    /// Set the release order for cached instances.
    pub fn disposal(mut self, disposal: DisposalOrder) -> Self {
        self.disposal = disposal;
        self
    }

    /// Build the scope and push it on the current thread's stack.
    pub fn enter(self) -> Result<Scope> {
        if self.bindings.is_empty() {
            return Err(DiError::NoBindings);
        }

        let state = Arc::new(ScopeState::new(&self.bindings, self.disposal));

        #[cfg(feature = "logging")]
        debug!(
            target: "scoped_di",
            scope_id = state.id.0,
            tables = self.bindings.len(),
            services = state.impls.len(),
            depth = stack::depth() + 1,
            "Entered dependency scope"
        );

        Ok(Scope {
            entry: StackEntry::enter(state),
        })
    }
}

// =============================================================================
// Handles
// =============================================================================

/// Cloneable, `Send + Sync` reference to a scope.
///
/// A handle does not keep cached instances alive past the scope's
/// destruction; resolving through it afterwards fails with
/// [`DiError::ScopeClosed`].
#[derive(Clone)]
pub struct ScopeHandle {
    state: Arc<ScopeState>,
}

impl ScopeHandle {
    /// The scope identifier.
    #[inline]
    pub fn id(&self) -> ScopeId {
        self.state.id
    }

    /// Whether the scope has been destroyed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Resolve `I` under tag `T`, with this scope on top of the current
    /// thread's stack for the duration of the call.
    pub fn resolve<I: ?Sized + Interface, T: Tag>(&self) -> Result<Arc<I>> {
        resolve_entered::<I, T>(&self.state)
    }

    /// Push the scope on the current thread's stack until the guard is dropped.
    pub fn enter(&self) -> Result<EnteredScope> {
        if self.is_closed() {
            return Err(DiError::ScopeClosed { scope: self.state.id });
        }

        Ok(EnteredScope {
            entry: StackEntry::enter(Arc::clone(&self.state)),
        })
    }
}

impl std::fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeHandle")
            .field("id", &self.state.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A scope entered on another thread through [`ScopeHandle::enter`].
///
/// Dropping it pops the scope from this thread's stack but leaves the cache
/// alone; only the owning [`Scope`] releases instances.
pub struct EnteredScope {
    entry: StackEntry,
}

impl EnteredScope {
    /// The scope identifier.
    #[inline]
    pub fn id(&self) -> ScopeId {
        self.entry.state().id
    }

    /// Leave the scope, reporting broken nesting instead of panicking.
    pub fn close(mut self) -> Result<()> {
        self.entry.leave()
    }
}

/// Handle to the top scope of the current thread.
pub fn current() -> Result<ScopeHandle> {
    stack::top().map(|state| ScopeHandle { state })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Component, Fresh, ServiceRef, implements};
    use std::sync::Barrier;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    trait Counter: Send + Sync {
        fn next(&self) -> usize;
    }

    #[derive(Default)]
    struct Ctr {
        count: AtomicUsize,
    }

    impl Counter for Ctr {
        fn next(&self) -> usize {
            self.count.fetch_add(1, Ordering::SeqCst) + 1
        }
    }

    impl Component for Ctr {
        type Args = ();

        fn construct(_: ()) -> Result<Self> {
            Ok(Ctr::default())
        }
    }

    implements!(Ctr => dyn Counter);

    struct Audit;
    impl Tag for Audit {}

    fn counters() -> Bindings {
        Bindings::new().bind::<dyn Counter, Ctr>()
    }

    #[test]
    fn test_scope_ids_unique() {
        let s1 = ScopeId::next();
        let s2 = ScopeId::next();
        let s3 = ScopeId::next();

        assert_ne!(s1.id(), s2.id());
        assert_ne!(s2.id(), s3.id());
    }

    #[test]
    fn test_scope_display() {
        let display = format!("{}", ScopeId::next());
        assert!(display.starts_with("scope-"));
    }

    #[test]
    fn test_empty_binding_list_is_rejected() {
        assert!(matches!(Scope::new(&[]), Err(DiError::NoBindings)));
        assert_eq!(stack::depth(), 0);
    }

    #[test]
    fn test_scope_enters_and_leaves_stack() {
        let bindings = counters();
        {
            let scope = Scope::new(&[&bindings]).unwrap();
            assert_eq!(stack::depth(), 1);
            assert_eq!(current().unwrap().id(), scope.id());
        }
        assert_eq!(stack::depth(), 0);
        assert!(matches!(current(), Err(DiError::NoActiveScope)));
    }

    #[test]
    fn test_shared_resolution_is_cached() {
        let bindings = counters();
        let scope = Scope::new(&[&bindings]).unwrap();

        let a = scope.resolve::<dyn Counter, Shared>().unwrap();
        let b = scope.resolve::<dyn Counter, Shared>().unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.next(), 1);
        assert_eq!(b.next(), 2);
        assert!(scope.is_cached::<dyn Counter, Shared>());
        assert_eq!(scope.cached_len(), 1);
    }

    #[test]
    fn test_user_tag_gets_its_own_slot() {
        let bindings = counters();
        let scope = Scope::new(&[&bindings]).unwrap();

        let shared = scope.resolve::<dyn Counter, Shared>().unwrap();
        let audit = scope.resolve::<dyn Counter, Audit>().unwrap();
        let audit_again = scope.resolve::<dyn Counter, Audit>().unwrap();

        assert!(!Arc::ptr_eq(&shared, &audit));
        assert!(Arc::ptr_eq(&audit, &audit_again));
        assert_eq!(scope.cached_len(), 2);
    }

    #[test]
    fn test_fresh_bypasses_cache() {
        let bindings = counters();
        let scope = Scope::new(&[&bindings]).unwrap();

        let a = scope.resolve::<dyn Counter, Fresh>().unwrap();
        let b = scope.resolve::<dyn Counter, Fresh>().unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(scope.cached_len(), 0);
    }

    #[test]
    fn test_scopes_do_not_share_instances() {
        let bindings = counters();

        let first = {
            let scope = Scope::new(&[&bindings]).unwrap();
            scope.resolve::<dyn Counter, Shared>().unwrap()
        };
        let scope = Scope::new(&[&bindings]).unwrap();
        let second = scope.resolve::<dyn Counter, Shared>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_destruction_releases_cache() {
        let bindings = counters();
        let scope = Scope::new(&[&bindings]).unwrap();
        let handle = scope.handle();

        let instance = scope.resolve::<dyn Counter, Shared>().unwrap();
        assert_eq!(Arc::strong_count(&instance), 2);

        drop(scope);

        assert_eq!(Arc::strong_count(&instance), 1);
        assert!(handle.is_closed());
        assert!(matches!(
            handle.resolve::<dyn Counter, Shared>(),
            Err(DiError::ScopeClosed { .. })
        ));
    }

    struct Tracked {
        dropped: Arc<AtomicBool>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_construction_finishing_after_destruction_is_not_cached() {
        let dropped = Arc::new(AtomicBool::new(false));
        let started = Arc::new(Barrier::new(2));
        let resume = Arc::new(Barrier::new(2));

        let bindings = {
            let (dropped, started, resume) =
                (Arc::clone(&dropped), Arc::clone(&started), Arc::clone(&resume));
            Bindings::new().factory::<Tracked, _>(move || {
                started.wait();
                resume.wait();
                Ok(Arc::new(Tracked {
                    dropped: Arc::clone(&dropped),
                }))
            })
        };

        let scope = Scope::new(&[&bindings]).unwrap();
        let handle = scope.handle();

        let worker = {
            let handle = handle.clone();
            thread::spawn(move || handle.resolve::<Tracked, Shared>().map(drop))
        };

        started.wait();
        drop(scope);
        resume.wait();

        assert!(matches!(
            worker.join().unwrap(),
            Err(DiError::ScopeClosed { .. })
        ));
        // Released even though a handle is still alive.
        assert!(dropped.load(Ordering::SeqCst));
        assert!(handle.is_closed());
    }

    struct Noisy {
        label: &'static str,
        released: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Drop for Noisy {
        fn drop(&mut self) {
            self.released.lock().unwrap().push(self.label);
        }
    }

    struct Early(#[allow(dead_code)] Noisy);
    struct Late(#[allow(dead_code)] Noisy);

    fn released_in(order: DisposalOrder) -> Vec<&'static str> {
        let released = Arc::new(Mutex::new(Vec::new()));
        let (early, late) = (Arc::clone(&released), Arc::clone(&released));

        let bindings = Bindings::new()
            .factory::<Early, _>(move || {
                Ok(Arc::new(Early(Noisy {
                    label: "early",
                    released: Arc::clone(&early),
                })))
            })
            .factory::<Late, _>(move || {
                Ok(Arc::new(Late(Noisy {
                    label: "late",
                    released: Arc::clone(&late),
                })))
            });

        let scope = Scope::builder()
            .bindings(&bindings)
            .disposal(order)
            .enter()
            .unwrap();

        scope.resolve::<Early, Shared>().unwrap();
        scope.resolve::<Late, Shared>().unwrap();
        drop(scope);

        let released = released.lock().unwrap().clone();
        released
    }

    #[test]
    fn test_disposal_order() {
        assert_eq!(released_in(DisposalOrder::Insertion), vec!["early", "late"]);
        assert_eq!(released_in(DisposalOrder::Reverse), vec!["late", "early"]);
    }

    #[test]
    fn test_close_reports_mismatch() {
        let bindings = counters();
        let a = Scope::new(&[&bindings]).unwrap();
        let b = Scope::new(&[&bindings]).unwrap();
        let (a_id, b_id) = (a.id(), b.id());

        match a.close() {
            Err(DiError::MismatchedScope { expected, found }) => {
                assert_eq!(expected, b_id);
                assert_eq!(found, a_id);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        b.close().unwrap();
        assert_eq!(stack::depth(), 0);
    }

    #[test]
    #[should_panic(expected = "Mismatched dependency scope stack")]
    fn test_drop_out_of_order_panics() {
        let bindings = counters();
        let a = Scope::new(&[&bindings]).unwrap();
        let _b = Scope::new(&[&bindings]).unwrap();
        drop(a);
    }

    #[test]
    fn test_validate_warms_cache() {
        let bindings = counters().factory::<u32, _>(|| Ok(Arc::new(7)));
        let scope = Scope::new(&[&bindings]).unwrap();

        scope.validate().unwrap();

        assert_eq!(scope.cached_len(), 2);
        assert!(scope.is_cached::<dyn Counter, Shared>());
        assert!(scope.is_cached::<u32, Shared>());
    }

    #[test]
    fn test_validate_reports_missing_dependency() {
        let bindings = Bindings::new().factory::<u32, _>(|| {
            let missing = ServiceRef::<u64>::new()?;
            Ok(Arc::new(*missing as u32))
        });
        let scope = Scope::new(&[&bindings]).unwrap();

        assert!(matches!(scope.validate(), Err(DiError::NotFound { .. })));
        assert_eq!(scope.cached_len(), 0);
        assert_eq!(stack::depth(), 1);
    }

    #[test]
    fn test_concurrent_first_resolution_builds_once() {
        static BUILT: AtomicUsize = AtomicUsize::new(0);

        let bindings = Bindings::new().factory::<dyn Counter, _>(|| {
            BUILT.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            Ok(Arc::new(Ctr::default()) as Arc<dyn Counter>)
        });
        let scope = Scope::new(&[&bindings]).unwrap();
        let handle = scope.handle();
        let barrier = Barrier::new(8);

        let resolved: Vec<Arc<dyn Counter>> = thread::scope(|s| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    let handle = handle.clone();
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        handle.resolve::<dyn Counter, Shared>().unwrap()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(BUILT.load(Ordering::SeqCst), 1);
        assert!(resolved.iter().all(|c| Arc::ptr_eq(c, &resolved[0])));
        assert_eq!(scope.constructing(), 0);
    }

    #[test]
    fn test_handle_enter_on_worker_thread() {
        let bindings = counters();
        let scope = Scope::new(&[&bindings]).unwrap();
        let handle = scope.handle();
        let local = scope.resolve::<dyn Counter, Shared>().unwrap();

        let remote = thread::spawn(move || {
            assert!(matches!(
                ServiceRef::<dyn Counter>::new(),
                Err(DiError::NoActiveScope)
            ));

            let entered = handle.enter().unwrap();
            let counter = ServiceRef::<dyn Counter>::new().unwrap();
            entered.close().unwrap();
            counter.into_arc()
        })
        .join()
        .unwrap();

        assert!(Arc::ptr_eq(&local, &remote));
    }
}
