//! Two scopes over two binding tables: the same greeter prints to the
//! console in one and appends to a file in the other.
//!
//! Run with:
//!   cargo run --example greeter

use scoped_di::{Bindings, Component, Result, Scope, ServiceRef, implements};
use std::fs::OpenOptions;
use std::io::{self, Write};

trait Printer: Send + Sync {
    fn print(&self, text: &str) -> io::Result<()>;
}

struct ConsolePrinter;

impl Printer for ConsolePrinter {
    fn print(&self, text: &str) -> io::Result<()> {
        println!("{text}");
        Ok(())
    }
}

impl Component for ConsolePrinter {
    type Args = ();

    fn construct(_: ()) -> Result<Self> {
        Ok(ConsolePrinter)
    }
}

struct FilePrinter {
    path: String,
}

impl Printer for FilePrinter {
    fn print(&self, text: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{text}")
    }
}

impl Component for FilePrinter {
    type Args = String;

    fn construct(path: String) -> Result<Self> {
        Ok(FilePrinter { path })
    }
}

implements!(ConsolePrinter => dyn Printer);
implements!(FilePrinter => dyn Printer);

struct Greeter {
    printer: ServiceRef<dyn Printer>,
}

impl Greeter {
    fn greet(&self) -> io::Result<()> {
        self.printer.print("Hello, world!")
    }
}

impl Component for Greeter {
    type Args = ();

    fn construct(_: ()) -> Result<Self> {
        Ok(Greeter {
            printer: ServiceRef::new()?,
        })
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "logging")]
    scoped_di::logging::init();

    let console = Bindings::new()
        .bind::<Greeter, Greeter>()
        .bind::<dyn Printer, ConsolePrinter>();
    let file = Bindings::new()
        .bind::<Greeter, Greeter>()
        .service::<dyn Printer, FilePrinter>("log.txt".into());

    {
        let _scope = Scope::new(&[&console])?;
        ServiceRef::<Greeter>::new()?.greet()?;
    }

    {
        let _scope = Scope::new(&[&file])?;
        ServiceRef::<Greeter>::new()?.greet()?;
        println!("Appended a greeting to log.txt");
    }

    Ok(())
}
