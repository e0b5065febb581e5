use std::rc::Rc;

use crate::{ledger::PropertyLedger, types::DynError};

/// A type whose properties are injected by the container after construction
///
/// Types are made injectable once per container with
/// [Container::make_injectable](crate::Container::make_injectable), and are then
/// constructed through [Container::create](crate::Container::create).
pub trait Injectable: Sized + 'static {
    /// Records the properties to inject, in the order they are declared
    ///
    /// Types without injected properties can keep the default.
    fn declare(_ledger: &mut PropertyLedger<Self>) {}
}

/// An [Injectable] that is lazily constructed at most once per container,
/// and injected wherever its dependency id is requested
///
/// # Example
/// ```rust
/// use std::rc::Rc;
/// use fusion_di::{Container, DynError, Injectable, Singleton};
///
/// trait Log {
///     fn info(&self, msg: &str);
/// }
///
/// struct ConsoleLog;
/// impl Log for ConsoleLog {
///     fn info(&self, msg: &str) {
///         println!("{msg}");
///     }
/// }
/// impl Injectable for ConsoleLog {}
/// impl Singleton for ConsoleLog {
///     const DEPENDENCY_ID: &'static str = "ILog";
///     type Contract = dyn Log;
///
///     fn construct() -> Result<Self, DynError> {
///         Ok(ConsoleLog)
///     }
///
///     fn into_contract(self: Rc<Self>) -> Rc<dyn Log> {
///         self
///     }
/// }
///
/// let container = Container::new();
/// container.declare_singleton::<ConsoleLog>().unwrap();
/// let log = container.instantiate_singleton::<dyn Log>("ILog").unwrap();
/// log.info("Hello world!");
/// ```
pub trait Singleton: Injectable {
    /// The id the singleton is registered under
    const DEPENDENCY_ID: &'static str;

    /// The type the singleton is stored and resolved as, usually a trait object
    type Contract: ?Sized + 'static;

    /// Builds the raw singleton, before its own properties are injected
    fn construct() -> Result<Self, DynError>;

    fn into_contract(self: Rc<Self>) -> Rc<Self::Contract>;
}
