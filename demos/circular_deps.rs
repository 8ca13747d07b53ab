//! A three-step dependency cycle is reported instead of overflowing the stack.
//!
//! Run with:
//!   cargo run --example circular_deps

use scoped_di::{Bindings, Component, DiError, Result, Scope, ServiceRef};

#[allow(dead_code)]
struct Orders(ServiceRef<Billing>);
#[allow(dead_code)]
struct Billing(ServiceRef<Shipping>);
#[allow(dead_code)]
struct Shipping(ServiceRef<Orders>);

impl Component for Orders {
    type Args = ();

    fn construct(_: ()) -> Result<Self> {
        Ok(Orders(ServiceRef::new()?))
    }
}

impl Component for Billing {
    type Args = ();

    fn construct(_: ()) -> Result<Self> {
        Ok(Billing(ServiceRef::new()?))
    }
}

impl Component for Shipping {
    type Args = ();

    fn construct(_: ()) -> Result<Self> {
        Ok(Shipping(ServiceRef::new()?))
    }
}

fn main() -> Result<()> {
    #[cfg(feature = "logging")]
    scoped_di::logging::init();

    let app = Bindings::new()
        .bind::<Orders, Orders>()
        .bind::<Billing, Billing>()
        .bind::<Shipping, Shipping>();

    let scope = Scope::new(&[&app])?;

    match ServiceRef::<Orders>::new() {
        Err(DiError::CircularDependency { type_name, tag }) => {
            println!("Cycle detected at {type_name} (tag {tag})");
        }
        Err(other) => return Err(other),
        Ok(_) => unreachable!("orders depend on themselves"),
    }

    println!("Cached after failure: {}", scope.cached_len());
    scope.close()
}
