#![no_main]

//! Fuzz target for concurrent resolution through scope handles
//!
//! Every thread resolving the same tagged slot must observe one instance,
//! and the factory must run once per slot.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scoped_di::{Bindings, Scope, ServiceRef, Shared, Tag};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

struct Audit;
impl Tag for Audit {}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum ConcurrentOp {
    Shared,
    Audit,
    EnterAndResolve,
}

#[derive(Debug, Arbitrary)]
struct Input {
    threads: u8,
    ops: Vec<ConcurrentOp>,
}

fuzz_target!(|input: Input| {
    let threads = (input.threads % 8) as usize + 1;
    let ops: Vec<ConcurrentOp> = input.ops.into_iter().take(50).collect();

    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    let bindings = Bindings::new().factory::<String, _>(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(String::from("shared")))
    });

    let scope = Scope::new(&[&bindings]).unwrap();
    let handle = scope.handle();

    let seen: Vec<Vec<(bool, usize)>> = thread::scope(|s| {
        let workers: Vec<_> = (0..threads)
            .map(|_| {
                let handle = handle.clone();
                let ops = &ops;
                s.spawn(move || {
                    ops.iter()
                        .map(|op| match op {
                            ConcurrentOp::Shared => {
                                let value = handle.resolve::<String, Shared>().unwrap();
                                (true, Arc::as_ptr(&value) as usize)
                            }
                            ConcurrentOp::Audit => {
                                let value = handle.resolve::<String, Audit>().unwrap();
                                (false, Arc::as_ptr(&value) as usize)
                            }
                            ConcurrentOp::EnterAndResolve => {
                                let entered = handle.enter().unwrap();
                                let value = ServiceRef::<String>::new().unwrap().into_arc();
                                entered.close().unwrap();
                                (true, Arc::as_ptr(&value) as usize)
                            }
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    let mut shared = seen.iter().flatten().filter(|(s, _)| *s).map(|(_, p)| *p);
    if let Some(first) = shared.next() {
        assert!(shared.all(|p| p == first));
    }
    let mut audit = seen.iter().flatten().filter(|(s, _)| !*s).map(|(_, p)| *p);
    if let Some(first) = audit.next() {
        assert!(audit.all(|p| p == first));
    }

    assert_eq!(built.load(Ordering::SeqCst), scope.cached_len());
    scope.close().unwrap();
});
