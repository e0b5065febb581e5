//! Fusion DI wires shared services into objects after they are constructed.
//!
//! It consists of three parts:
//! 1. Declarations: a type is made [Injectable] and lists the properties to inject in its
//!    ledger, a [Singleton] additionally registers a lazy constructor under a dependency id.
//! 2. The [Container]: maps dependency ids to singleton constructors and to the singletons
//!    built so far.
//! 3. Construction: [Container::create] builds a value and fills every [Inject] property
//!    of its ledger, building missing singletons on demand.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use fusion_di::{Container, DynError, Inject, Injectable, PropertyLedger, Singleton};
//!
//! trait Log {
//!     fn info(&self, msg: &str);
//! }
//!
//! struct ConsoleLog;
//! impl Log for ConsoleLog {
//!     fn info(&self, msg: &str) {
//!         println!("{msg}");
//!     }
//! }
//! impl Injectable for ConsoleLog {}
//! impl Singleton for ConsoleLog {
//!     const DEPENDENCY_ID: &'static str = "ILog";
//!     type Contract = dyn Log;
//!
//!     fn construct() -> Result<Self, DynError> {
//!         Ok(ConsoleLog)
//!     }
//!
//!     fn into_contract(self: Rc<Self>) -> Rc<dyn Log> {
//!         self
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Greeter {
//!     log: Inject<dyn Log>,
//! }
//! impl Injectable for Greeter {
//!     fn declare(ledger: &mut PropertyLedger<Self>) {
//!         ledger.inject("log", "ILog", |g| &mut g.log);
//!     }
//! }
//!
//! let container = Container::new();
//! container.declare_singleton::<ConsoleLog>().unwrap();
//! container.make_injectable::<Greeter>().unwrap();
//!
//! // The log singleton is lazily created here
//! let greeter = container.create_default::<Greeter>().unwrap();
//! greeter.log.info("Hello world!");
//! ```
//!
//! Circular dependencies between singletons recurse until the stack overflows, unless
//! [Container::enable_circular_dependency_check] is on; they can also be found up front
//! with [Container::validate].

pub mod container;
pub mod dependency_graph;
pub mod errors;
pub mod factories;
pub mod global;
pub mod ledger;
pub mod logger;
pub mod settings;
pub mod types;

mod guard;
mod interceptor;
mod registry;

pub use container::Container;
pub use dependency_graph::{DependencyGraph, DependencyGraphError, DependencyGraphErrors};
pub use errors::InjectError;
pub use factories::{Injectable, Singleton};
pub use global::*;
pub use ledger::{Inject, PropertyLedger};
pub use logger::{Logger, NullLogger, TracingLogger};
pub use settings::Settings;
pub use types::{ConstructionId, DependencyId, DynError, Instance, TypeInfo};
