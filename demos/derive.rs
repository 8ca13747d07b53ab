//! Example demonstrating the #[derive(Component)] macro
//!
//! Run with:
//!   cargo run --example derive --features derive

use scoped_di::{Bindings, Component, Scope, ServiceRef, implements};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[allow(dead_code)]
struct Database {
    url: String,
}

trait Cache: Send + Sync {
    fn size(&self) -> usize;
}

#[derive(Component)]
struct MemoryCache;

impl Cache for MemoryCache {
    fn size(&self) -> usize {
        1024
    }
}

implements!(MemoryCache => dyn Cache);

#[allow(dead_code)]
struct Logger {
    level: String,
}

// Service with injected dependencies
#[derive(Component)]
struct UserService {
    #[inject]
    db: ServiceRef<Database>,
    #[inject]
    cache: ServiceRef<dyn Cache>,
    #[inject(optional)]
    logger: Option<ServiceRef<Logger>>,
    // Non-injected field uses Default
    request_count: AtomicU64,
}

impl UserService {
    fn handle(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn main() {
    let app = Bindings::new()
        .instance(Arc::new(Database {
            url: "postgres://localhost".into(),
        }))
        .bind::<dyn Cache, MemoryCache>()
        .bind::<UserService, UserService>();

    let _scope = Scope::new(&[&app]).unwrap();
    let service = ServiceRef::<UserService>::new().unwrap();

    println!("Database: {}", service.db.url);
    println!("Cache size: {}", service.cache.size());
    println!("Logger bound: {}", service.logger.is_some());
    println!("Requests handled: {}", service.handle());
}
