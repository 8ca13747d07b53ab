#![no_main]

//! Fuzz target for scope stack discipline
//!
//! Enters, resolves from and closes scopes in arbitrary order. Out-of-order
//! closes must report a mismatch, never corrupt the stack.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scoped_di::{Bindings, DiError, DisposalOrder, Fresh, Scope, ServiceRef, Tag, stack};
use std::sync::Arc;

struct Audit;
impl Tag for Audit {}

#[derive(Debug, Arbitrary)]
struct Config {
    id: u32,
}

#[derive(Debug, Arbitrary)]
enum ScopeOp {
    EnterWithConfig(Config),
    EnterWithCounter { reverse: bool },
    ResolveConfig,
    ResolveCounterShared,
    ResolveCounterFresh,
    ResolveCounterAudit,
    Validate,
    CloseTop,
    CloseAt(u8),
}

fuzz_target!(|ops: Vec<ScopeOp>| {
    let counter = Bindings::new().factory::<u64, _>(|| Ok(Arc::new(0)));
    let mut scopes: Vec<Scope> = Vec::new();

    for op in ops.into_iter().take(100) {
        match op {
            ScopeOp::EnterWithConfig(config) => {
                let bindings = Bindings::new().instance(Arc::new(config.id));
                scopes.push(Scope::new(&[&bindings, &counter]).unwrap());
            }
            ScopeOp::EnterWithCounter { reverse } => {
                let order = if reverse {
                    DisposalOrder::Reverse
                } else {
                    DisposalOrder::Insertion
                };
                let scope = Scope::builder().bindings(&counter).disposal(order).enter().unwrap();
                scopes.push(scope);
            }
            ScopeOp::ResolveConfig => match ServiceRef::<u32>::new() {
                Ok(_) | Err(DiError::NotFound { .. }) | Err(DiError::NoActiveScope) => {}
                Err(other) => panic!("unexpected error: {other}"),
            },
            ScopeOp::ResolveCounterShared => {
                let result = ServiceRef::<u64>::new();
                assert_eq!(result.is_ok(), !scopes.is_empty());
            }
            ScopeOp::ResolveCounterFresh => {
                let result = ServiceRef::<u64, Fresh>::new();
                assert_eq!(result.is_ok(), !scopes.is_empty());
            }
            ScopeOp::ResolveCounterAudit => {
                let result = ServiceRef::<u64, Audit>::new();
                assert_eq!(result.is_ok(), !scopes.is_empty());
            }
            ScopeOp::Validate => {
                if let Some(scope) = scopes.last() {
                    scope.validate().unwrap();
                }
            }
            ScopeOp::CloseTop => {
                if let Some(scope) = scopes.pop() {
                    scope.close().unwrap();
                }
            }
            ScopeOp::CloseAt(index) => {
                if scopes.is_empty() {
                    continue;
                }
                let index = index as usize % scopes.len();
                let on_top = index == scopes.len() - 1;
                let result = scopes.remove(index).close();
                assert_eq!(result.is_ok(), on_top);
            }
        }

        assert_eq!(stack::depth(), scopes.len());
    }

    // Innermost first
    while let Some(scope) = scopes.pop() {
        scope.close().unwrap();
    }
});
