//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use scoped_di::{Bindings, DisposalOrder, Fresh, Scope, ServiceRef};
use std::sync::Arc;

#[allow(dead_code)]
struct Database {
    url: String,
}

#[allow(dead_code)]
struct RequestContext {
    request_id: String,
}

fn main() {
    // JSON if logging-json is enabled, pretty if logging-pretty is enabled
    scoped_di::logging::builder().trace().di_only().init();

    println!("=== scoped-di Logging Demo ===\n");

    // Logs: "Registering binding"
    let app = Bindings::new().instance(Arc::new(Database {
        url: "postgres://localhost/mydb".into(),
    }));
    let request = Bindings::new().factory::<RequestContext, _>(|| {
        Ok(Arc::new(RequestContext {
            request_id: "req-12345".into(),
        }))
    });

    // Logs: "Entered dependency scope", "Scope pushed"
    let _root = Scope::new(&[&app]).unwrap();

    // Logs: "Constructed shared instance", then "Service resolved from scope cache"
    let _db = ServiceRef::<Database>::new().unwrap();
    let _db_again = ServiceRef::<Database>::new().unwrap();

    {
        let request_scope = Scope::builder()
            .bindings(&app)
            .bindings(&request)
            .disposal(DisposalOrder::Reverse)
            .enter()
            .unwrap();

        // Logs: "Creating fresh instance"
        let _ctx = ServiceRef::<RequestContext, Fresh>::new().unwrap();

        // Logs: "Service interface is not bound in scope"
        assert!(ServiceRef::<i32>::optional().unwrap().is_none());

        // Logs: "Validating scope"
        request_scope.validate().unwrap();

        // Logs: "Released cached instances", "Left dependency scope"
    }

    println!("\n=== Demo Complete ===");
    println!("Tip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (colorful output)");
}
