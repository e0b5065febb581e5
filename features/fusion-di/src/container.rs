use std::{
    any::{type_name, TypeId},
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt::Debug,
    rc::Rc,
    sync::Arc,
};

use crate::{
    errors::InjectError,
    factories::{Injectable, Singleton},
    guard::InjectionsInProgress,
    ledger::{Binding, Inject, PropertyLedger},
    logger::{Logger, TracingLogger},
    registry::{SingletonConstructor, SingletonRegistry},
    settings::Settings,
    types::{ConstructionId, DependencyId, Instance, TypeInfo},
};

/// Container holding singleton constructors, built singletons and the ledgers of
/// every injectable type
///
/// Cloning is cheap, clones share the same state. The container is confined to
/// the thread that created it; for a process wide instance see [global](crate::global).
#[derive(Clone)]
pub struct Container(pub(crate) Rc<ContainerInner>);

pub struct ContainerInner {
    pub(crate) settings: Cell<Settings>,
    pub(crate) logger: RefCell<Rc<dyn Logger>>,
    pub(crate) registry: RefCell<SingletonRegistry>,
    pub(crate) injectables: RefCell<HashMap<TypeId, InjectableEntry>>,
    pub(crate) in_progress: RefCell<InjectionsInProgress>,
    pub(crate) constructor_stack: RefCell<Vec<&'static str>>,
    next_construction_id: Cell<ConstructionId>,
}

/// Class level data of a type: its ledger and, once made injectable, its construction id
pub(crate) struct InjectableEntry {
    pub info: TypeInfo,
    pub construction_id: Option<ConstructionId>,
    pub ledger: Vec<Binding>,
}
impl InjectableEntry {
    fn new(info: TypeInfo) -> Self {
        InjectableEntry {
            info,
            construction_id: None,
            ledger: Vec::new(),
        }
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.0.registry.borrow();
        let mut map = f.debug_struct("Container");
        for (id, constructor) in registry.known_constructors() {
            let val = if registry.is_instantiated(&id) {
                "instantiated"
            } else {
                constructor.type_name
            };
            map.field(&id, &val);
        }
        map.finish()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Container(Rc::new(ContainerInner {
            settings: Cell::new(settings),
            logger: RefCell::new(Rc::new(TracingLogger)),
            registry: RefCell::new(SingletonRegistry::default()),
            injectables: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(InjectionsInProgress::default()),
            constructor_stack: RefCell::new(Vec::new()),
            next_construction_id: Cell::new(1),
        }))
    }

    pub fn settings(&self) -> Settings {
        self.0.settings.get()
    }

    fn update_settings(&self, update: impl FnOnce(Settings) -> Settings) {
        self.0.settings.set(update(self.0.settings.get()));
    }

    pub fn enable_injector(&self) {
        self.update_settings(|s| s.with_injector(true));
    }

    /// Types created while disabled keep their injected properties unset
    pub fn disable_injector(&self) {
        self.update_settings(|s| s.with_injector(false));
    }

    pub fn enable_automatic_singletons(&self) {
        self.update_settings(|s| s.with_automatic_singletons(true));
    }

    /// Singletons declared while disabled are made injectable, but their constructor is not
    /// registered
    pub fn disable_automatic_singletons(&self) {
        self.update_settings(|s| s.with_automatic_singletons(false));
    }

    pub fn enable_circular_dependency_check(&self) {
        self.update_settings(|s| s.with_circular_check(true));
    }

    pub fn disable_circular_dependency_check(&self) {
        self.update_settings(|s| s.with_circular_check(false));
    }

    pub fn enable_verbose(&self, enable: bool) {
        self.update_settings(|s| s.with_verbose(enable));
    }

    pub fn set_logger(&self, logger: Rc<dyn Logger>) {
        *self.0.logger.borrow_mut() = logger;
    }

    pub(crate) fn logger(&self) -> Rc<dyn Logger> {
        self.0.logger.borrow().clone()
    }

    pub(crate) fn verbose(&self, msg: impl FnOnce() -> String) {
        if self.settings().verbose {
            self.logger().info(&msg());
        }
    }
}

// Singleton registry
impl Container {
    /// Registers an already built singleton, replacing any singleton built for the id
    ///
    /// The id then resolves to `singleton` without any constructor being invoked.
    pub fn register_singleton<T: ?Sized + 'static>(
        &self,
        dependency_id: impl Into<DependencyId>,
        singleton: Rc<T>,
    ) {
        self.register_instance(dependency_id.into(), Instance::new(singleton));
    }

    /// Registers many already built singletons at once
    pub fn register_singletons<Id: Into<DependencyId>>(
        &self,
        singletons: impl IntoIterator<Item = (Id, Instance)>,
    ) {
        for (dependency_id, instance) in singletons {
            self.register_instance(dependency_id.into(), instance);
        }
    }

    fn register_instance(&self, dependency_id: DependencyId, instance: Instance) {
        self.verbose(|| format!("@@@@ Manually registered singleton: {dependency_id}"));
        self.0
            .registry
            .borrow_mut()
            .register_instance(dependency_id, instance);
    }

    /// Drops every built singleton, constructors stay registered
    pub fn clear_singletons(&self) {
        self.0.registry.borrow_mut().clear_instances();
    }

    /// True if a constructor is registered for the id
    pub fn is_singleton_registered(&self, dependency_id: &str) -> bool {
        self.0.registry.borrow().is_registered(dependency_id)
    }

    /// True if a singleton has been built or registered for the id
    pub fn is_singleton_instantiated(&self, dependency_id: &str) -> bool {
        self.0.registry.borrow().is_instantiated(dependency_id)
    }

    /// Returns the singleton for the id, constructing it on first request
    pub fn instantiate_singleton<T: ?Sized + 'static>(
        &self,
        dependency_id: &str,
    ) -> Result<Rc<T>, InjectError> {
        self.instantiate(dependency_id)?
            .downcast::<T>()
            .map_err(|actual_type| InjectError::DowncastFailed {
                dependency_id: dependency_id.to_string(),
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    /// Untyped [Container::instantiate_singleton]
    pub fn instantiate(&self, dependency_id: &str) -> Result<Instance, InjectError> {
        self.verbose(|| format!("<<<< Requesting singleton: {dependency_id}"));

        self.resolve(dependency_id).inspect_err(|err| {
            let logger = self.logger();
            logger.error(&format!("Failed to instantiate singleton {dependency_id}"));
            logger.error(&err.to_string());
        })
    }

    fn resolve(&self, dependency_id: &str) -> Result<Instance, InjectError> {
        let existing = self.0.registry.borrow().instance(dependency_id);
        if let Some(existing) = existing {
            self.verbose(|| format!("= Singleton already exists: {dependency_id}"));
            return Ok(existing);
        }

        let constructor = self.0.registry.borrow().constructor(dependency_id);
        let Some(constructor) = constructor else {
            return Err(self.unresolved(dependency_id));
        };

        self.verbose(|| format!("= Lazily instantiating singleton: {dependency_id}"));

        // Only cached once fully injected, a failed attempt is retried on the next request
        let instance = (constructor.construct)(self)?;
        self.0
            .registry
            .borrow_mut()
            .register_instance(dependency_id.to_string(), instance.clone());

        self.verbose(|| format!("= Lazily instantiated singleton: {dependency_id}"));
        Ok(instance)
    }

    fn unresolved(&self, dependency_id: &str) -> InjectError {
        let known = self.0.registry.borrow().known_constructors();
        let err = InjectError::UnresolvedDependency {
            dependency_id: dependency_id.to_string(),
            construction_stack: self.0.constructor_stack.borrow().clone(),
            known_constructors: known.iter().map(|(id, _)| id.clone()).collect(),
        };

        let available: Vec<_> = known
            .iter()
            .map(|(id, product)| format!("\t{id} -> {product}"))
            .collect();
        let logger = self.logger();
        logger.error(&err.to_string());
        logger.info(&format!("Available constructors:\n{}", available.join("\n")));

        err
    }

    /// Every dependency id with a built singleton, sorted
    pub fn instantiated_singletons(&self) -> Vec<DependencyId> {
        self.0.registry.borrow().instantiated_ids()
    }
}

// Declarations
impl Container {
    /// Makes `T` constructible through [Container::create], recording its ledger
    ///
    /// Returns the construction id assigned to `T`. Fails with [InjectError::DoubleWrap]
    /// if `T` has already been made injectable in this container.
    pub fn make_injectable<T: Injectable>(&self) -> Result<ConstructionId, InjectError> {
        let info = TypeInfo::of::<T>();
        self.verbose(|| format!("@@@@ Making type injectable: {info}"));

        let mut injectables = self.0.injectables.borrow_mut();
        let entry = injectables
            .entry(info.type_id)
            .or_insert_with(|| InjectableEntry::new(info));

        if let Some(construction_id) = entry.construction_id {
            return Err(InjectError::DoubleWrap {
                type_name: info.type_name,
                construction_id,
            });
        }

        let construction_id = self.0.next_construction_id.get();
        self.0.next_construction_id.set(construction_id + 1);
        entry.construction_id = Some(construction_id);

        T::declare(&mut PropertyLedger::new(&mut entry.ledger));

        Ok(construction_id)
    }

    /// Makes `S` injectable and, if automatic singletons are enabled, registers its
    /// constructor under [Singleton::DEPENDENCY_ID]
    ///
    /// A constructor registered earlier under the same id is replaced.
    pub fn declare_singleton<S: Singleton>(&self) -> Result<ConstructionId, InjectError> {
        let dependency_id = S::DEPENDENCY_ID;
        self.verbose(|| format!("@@@@ Registering singleton {dependency_id}"));

        let construction_id = self.make_injectable::<S>()?;

        if !self.settings().automatic_singletons {
            return Ok(construction_id);
        }

        self.verbose(|| format!("@@@@ Caching constructor for singleton: {dependency_id}"));

        let construct = |container: &Container| -> Result<Instance, InjectError> {
            let singleton = container.intercept::<S>(|| {
                S::construct().map_err(|error| InjectError::ConstructionFailure {
                    product: type_name::<S>(),
                    dependency_id: Some(S::DEPENDENCY_ID.to_string()),
                    error: Arc::new(error),
                })
            })?;

            Ok(Instance::new(S::into_contract(Rc::new(singleton))))
        };

        self.0.registry.borrow_mut().register_constructor(
            dependency_id.to_string(),
            SingletonConstructor {
                product: TypeInfo::of::<S>(),
                construct: Rc::new(construct),
            },
        );

        Ok(construction_id)
    }

    /// Appends a property to the ledger of `T`
    ///
    /// Can be called before or after `T` is made injectable, entries accumulate.
    pub fn inject_property<T: Injectable, D: ?Sized + 'static>(
        &self,
        property: &'static str,
        dependency_id: impl Into<DependencyId>,
        accessor: fn(&mut T) -> &mut Inject<D>,
    ) {
        let info = TypeInfo::of::<T>();
        let dependency_id = dependency_id.into();
        self.verbose(|| {
            format!("@@@@ Setup to inject {dependency_id} to property {property} in {info}")
        });

        let mut injectables = self.0.injectables.borrow_mut();
        let entry = injectables
            .entry(info.type_id)
            .or_insert_with(|| InjectableEntry::new(info));
        PropertyLedger::new(&mut entry.ledger).inject(property, dependency_id, accessor);
    }

    /// The (property, dependency id) pairs recorded for `T`, in injection order
    pub fn ledger_of<T: 'static>(&self) -> Vec<(&'static str, DependencyId)> {
        self.0
            .injectables
            .borrow()
            .get(&TypeId::of::<T>())
            .map(|entry| {
                entry
                    .ledger
                    .iter()
                    .map(|binding| (binding.property, binding.dependency_id.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Calls `f` with the given argument and the listed dependencies, resolved anew on every call
    ///
    /// ```rust
    /// use std::rc::Rc;
    /// use fusion_di::Container;
    ///
    /// let container = Container::new();
    /// container.register_singleton("IGreeting", Rc::new("Hello".to_string()));
    ///
    /// let greet = container.injectable_fn(&["IGreeting"], |name: String, deps| {
    ///     let greeting = deps[0].downcast::<String>().unwrap();
    ///     format!("{greeting} {name}")
    /// });
    /// assert_eq!(greet("world".to_string()).unwrap(), "Hello world");
    /// ```
    pub fn injectable_fn<A, R, F>(
        &self,
        dependency_ids: &[&str],
        f: F,
    ) -> impl Fn(A) -> Result<R, InjectError>
    where
        F: Fn(A, Vec<Instance>) -> R,
    {
        let container = self.clone();
        let dependency_ids: Vec<DependencyId> =
            dependency_ids.iter().map(|id| id.to_string()).collect();

        move |args| {
            let dependencies = dependency_ids
                .iter()
                .map(|id| container.instantiate(id))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(f(args, dependencies))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{logger::tests::RecordingLogger, types::DynError};

    trait Clock {
        fn now(&self) -> u64;
    }

    struct FixedClock;
    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            42
        }
    }
    impl Injectable for FixedClock {}
    impl Singleton for FixedClock {
        const DEPENDENCY_ID: &'static str = "IClock";
        type Contract = dyn Clock;

        fn construct() -> Result<Self, DynError> {
            Ok(FixedClock)
        }

        fn into_contract(self: Rc<Self>) -> Rc<dyn Clock> {
            self
        }
    }

    struct OtherClock;
    impl Clock for OtherClock {
        fn now(&self) -> u64 {
            7
        }
    }
    impl Injectable for OtherClock {}
    impl Singleton for OtherClock {
        const DEPENDENCY_ID: &'static str = "IClock";
        type Contract = dyn Clock;

        fn construct() -> Result<Self, DynError> {
            Ok(OtherClock)
        }

        fn into_contract(self: Rc<Self>) -> Rc<dyn Clock> {
            self
        }
    }

    #[derive(Default)]
    struct Report {
        clock: Inject<dyn Clock>,
    }
    impl Injectable for Report {
        fn declare(ledger: &mut PropertyLedger<Self>) {
            ledger.inject("clock", "IClock", |r| &mut r.clock);
        }
    }

    #[test]
    fn resolves_declared_singleton_by_contract() {
        let container = Container::new();
        container.declare_singleton::<FixedClock>().unwrap();

        assert!(container.is_singleton_registered("IClock"));
        assert!(!container.is_singleton_instantiated("IClock"));

        let clock = container.instantiate_singleton::<dyn Clock>("IClock").unwrap();
        assert_eq!(clock.now(), 42);
        assert!(container.is_singleton_instantiated("IClock"));
    }

    #[test]
    fn last_declared_singleton_wins() {
        let container = Container::new();
        container.declare_singleton::<FixedClock>().unwrap();
        container.declare_singleton::<OtherClock>().unwrap();

        let clock = container.instantiate_singleton::<dyn Clock>("IClock").unwrap();
        assert_eq!(clock.now(), 7);
    }

    #[test]
    fn making_a_type_injectable_twice_fails() {
        let container = Container::new();
        let id = container.make_injectable::<Report>().unwrap();

        let err = container.make_injectable::<Report>().unwrap_err();

        assert!(matches!(
            err,
            InjectError::DoubleWrap { construction_id, .. } if construction_id == id
        ));
        assert_eq!(container.ledger_of::<Report>().len(), 1);
    }

    #[test]
    fn construction_ids_increase() {
        let container = Container::new();
        let first = container.declare_singleton::<FixedClock>().unwrap();
        let second = container.make_injectable::<Report>().unwrap();

        assert!(second > first);
    }

    #[test]
    fn disabled_automatic_singletons_skip_constructor_registration() {
        let container =
            Container::with_settings(Settings::default().with_automatic_singletons(false));
        container.declare_singleton::<FixedClock>().unwrap();

        assert!(!container.is_singleton_registered("IClock"));
        // Still injectable, declaring it again is a double wrap
        assert!(container.declare_singleton::<FixedClock>().is_err());
    }

    #[test]
    fn property_declarations_accumulate() {
        #[derive(Default)]
        struct Dashboard {
            clock: Inject<dyn Clock>,
            title: Inject<String>,
        }
        impl Injectable for Dashboard {
            fn declare(ledger: &mut PropertyLedger<Self>) {
                ledger.inject("clock", "IClock", |d| &mut d.clock);
            }
        }

        let container = Container::new();
        container.inject_property::<Dashboard, String>("title", "ITitle", |d| &mut d.title);
        container.make_injectable::<Dashboard>().unwrap();

        assert_eq!(
            container.ledger_of::<Dashboard>(),
            vec![("title", "ITitle".to_string()), ("clock", "IClock".to_string())]
        );
    }

    #[test]
    fn downcast_failure_names_both_types() {
        let container = Container::new();
        container.register_singleton("IClock", Rc::new(5_u32));

        match container.instantiate_singleton::<dyn Clock>("IClock") {
            Err(InjectError::DowncastFailed {
                dependency_id,
                actual_type,
                ..
            }) => {
                assert_eq!(dependency_id, "IClock");
                assert_eq!(actual_type, type_name::<u32>());
            }
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("a u32 resolved as a clock"),
        }
    }

    #[test]
    fn unresolved_dependency_is_logged_with_known_constructors() {
        let logger = Rc::new(RecordingLogger::default());
        let container = Container::new();
        container.set_logger(logger.clone());
        container.declare_singleton::<FixedClock>().unwrap();

        let err = container.instantiate("IMissing").unwrap_err();

        match &err {
            InjectError::UnresolvedDependency {
                known_constructors, ..
            } => assert_eq!(known_constructors, &vec!["IClock".to_string()]),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(logger.errors.borrow().iter().any(|e| e.contains("IMissing")));
        assert!(logger.infos.borrow().iter().any(|i| i.contains("\tIClock -> ")));
    }

    #[test]
    fn verbose_mode_only_changes_logging() {
        let logger = Rc::new(RecordingLogger::default());
        let container = Container::new();
        container.set_logger(logger.clone());

        container.register_singleton("IQuiet", Rc::new(1_u8));
        assert!(logger.infos.borrow().is_empty());

        container.enable_verbose(true);
        container.register_singleton("ILoud", Rc::new(2_u8));
        let loud = container.instantiate_singleton::<u8>("ILoud").unwrap();
        container.enable_verbose(false);

        assert_eq!(*loud, 2);
        let infos = logger.infos.borrow();
        assert!(infos.iter().any(|i| i.contains("Manually registered singleton: ILoud")));
        assert!(infos.iter().any(|i| i.contains("Singleton already exists: ILoud")));
    }

    #[test]
    fn injectable_fn_resolves_on_every_call() {
        let container = Container::new();
        let calls = Rc::new(Cell::new(0_u32));
        container.register_singleton("ICounter", calls.clone());

        let bump = container.injectable_fn(&["ICounter"], |by: u32, deps| {
            let counter = deps[0].downcast::<Cell<u32>>().unwrap();
            counter.set(counter.get() + by);
            counter.get()
        });

        assert_eq!(bump(2).unwrap(), 2);
        assert_eq!(bump(3).unwrap(), 5);
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn injectable_fn_fails_for_unknown_dependency() {
        let container = Container::new();
        container.set_logger(Rc::new(crate::logger::NullLogger));

        let f = container.injectable_fn(&["INope"], |_: (), _| ());

        assert!(matches!(
            f(()),
            Err(InjectError::UnresolvedDependency { .. })
        ));
    }
}
