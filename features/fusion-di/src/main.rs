use std::{process::ExitCode, rc::Rc};

use fusion_di::{Container, DynError, Inject, Injectable, PropertyLedger, Singleton};
use tracing_subscriber::EnvFilter;

/// Logging service injected into [MyClass]
trait ILog {
    fn info(&self, msg: &str);
}

/// Lazily constructed the first time "ILog" is injected
struct Log;
impl ILog for Log {
    fn info(&self, msg: &str) {
        println!("{msg}");
    }
}
impl Injectable for Log {}
impl Singleton for Log {
    const DEPENDENCY_ID: &'static str = "ILog";
    type Contract = dyn ILog;

    fn construct() -> Result<Self, DynError> {
        Ok(Log)
    }

    fn into_contract(self: Rc<Self>) -> Rc<dyn ILog> {
        self
    }
}

#[derive(Default)]
struct MyClass {
    log: Inject<dyn ILog>,
}
impl Injectable for MyClass {
    fn declare(ledger: &mut PropertyLedger<Self>) {
        ledger.inject("log", "ILog", |c| &mut c.log);
    }
}
impl MyClass {
    fn my_function(&self) {
        // The logging service was constructed and injected along with MyClass
        self.log.info("Hello world!");
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let container = Container::new();
    container.enable_verbose(std::env::var_os("FUSION_VERBOSE").is_some());

    let my_object = container
        .declare_singleton::<Log>()
        .and_then(|_| container.make_injectable::<MyClass>())
        .and_then(|_| container.create_default::<MyClass>());

    match my_object {
        Ok(my_object) => {
            my_object.my_function();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to construct MyClass: {e}");
            ExitCode::FAILURE
        }
    }
}
