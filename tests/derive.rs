//! `#[derive(Component)]` against a live scope.

use scoped_di::{Bindings, Component, DiError, Fresh, Scope, ServiceRef, implements};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

trait Printer: Send + Sync {
    fn print(&self, text: &str) -> String;
}

#[derive(Component)]
struct ConsolePrinter;

impl Printer for ConsolePrinter {
    fn print(&self, text: &str) -> String {
        format!("console: {text}")
    }
}

implements!(ConsolePrinter => dyn Printer);

struct Metrics;

#[derive(Component)]
struct Greeter {
    #[inject]
    printer: ServiceRef<dyn Printer>,
    #[inject(optional)]
    metrics: Option<ServiceRef<Metrics>>,
    greeted: AtomicU64,
}

impl Greeter {
    fn greet(&self) -> String {
        self.greeted.fetch_add(1, Ordering::SeqCst);
        self.printer.print("hello")
    }
}

#[derive(Component)]
struct Stamp(#[inject] ServiceRef<Greeter, Fresh>);

#[test]
fn test_derived_component_resolves_fields() {
    let app = Bindings::new()
        .bind::<dyn Printer, ConsolePrinter>()
        .bind::<Greeter, Greeter>();
    let _scope = Scope::new(&[&app]).unwrap();

    let greeter = ServiceRef::<Greeter>::new().unwrap();
    assert_eq!(greeter.greet(), "console: hello");
    assert!(greeter.metrics.is_none());
    assert_eq!(greeter.greeted.load(Ordering::SeqCst), 1);
}

#[test]
fn test_optional_field_is_filled_when_bound() {
    let app = Bindings::new()
        .bind::<dyn Printer, ConsolePrinter>()
        .bind::<Greeter, Greeter>()
        .instance(Arc::new(Metrics));
    let _scope = Scope::new(&[&app]).unwrap();

    let greeter = ServiceRef::<Greeter>::new().unwrap();
    assert!(greeter.metrics.is_some());
}

#[test]
fn test_missing_required_field_fails_construction() {
    let app = Bindings::new().bind::<Greeter, Greeter>();
    let _scope = Scope::new(&[&app]).unwrap();

    match ServiceRef::<Greeter>::new() {
        Err(DiError::NotFound { type_name, .. }) => assert!(type_name.contains("Printer")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("printer is not bound"),
    }
}

#[test]
fn test_tuple_struct_with_tagged_field() {
    let app = Bindings::new()
        .bind::<dyn Printer, ConsolePrinter>()
        .bind::<Greeter, Greeter>()
        .bind::<Stamp, Stamp>();
    let _scope = Scope::new(&[&app]).unwrap();

    let a = ServiceRef::<Stamp, Fresh>::new().unwrap();
    let b = ServiceRef::<Stamp, Fresh>::new().unwrap();
    assert!(!ServiceRef::ptr_eq(&a.0, &b.0));
}
