//! The process wide container and free functions operating on it.
//!
//! A [Container] is confined to one thread, so "process wide" means one container per
//! thread; an application doing its wiring on the main thread sees a single registry.
//! Tests should prefer their own [Container] over this shared one.

use std::rc::Rc;

use crate::{
    container::Container,
    errors::InjectError,
    factories::{Injectable, Singleton},
    logger::Logger,
    types::{ConstructionId, DependencyId, Instance},
};

thread_local! {
    static GLOBAL_CONTAINER: Container = Container::new();
}

/// Returns a handle to the global container of the current thread
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
///
/// fusion_di::global().register_singleton("IGreeting", Rc::new("Hello from global!".to_string()));
/// assert!(fusion_di::is_singleton_instantiated("IGreeting"));
/// ```
pub fn global() -> Container {
    GLOBAL_CONTAINER.with(Container::clone)
}

/// Runs `f` with the global container of the current thread
pub fn with_global<R>(f: impl FnOnce(&Container) -> R) -> R {
    GLOBAL_CONTAINER.with(f)
}

pub fn register_singleton<T: ?Sized + 'static>(
    dependency_id: impl Into<DependencyId>,
    singleton: Rc<T>,
) {
    with_global(|c| c.register_singleton(dependency_id, singleton))
}

pub fn register_singletons<Id: Into<DependencyId>>(
    singletons: impl IntoIterator<Item = (Id, Instance)>,
) {
    with_global(|c| c.register_singletons(singletons))
}

pub fn clear_singletons() {
    with_global(Container::clear_singletons)
}

pub fn is_singleton_registered(dependency_id: &str) -> bool {
    with_global(|c| c.is_singleton_registered(dependency_id))
}

pub fn is_singleton_instantiated(dependency_id: &str) -> bool {
    with_global(|c| c.is_singleton_instantiated(dependency_id))
}

pub fn instantiate_singleton<T: ?Sized + 'static>(
    dependency_id: &str,
) -> Result<Rc<T>, InjectError> {
    global().instantiate_singleton(dependency_id)
}

pub fn make_injectable<T: Injectable>() -> Result<ConstructionId, InjectError> {
    with_global(Container::make_injectable::<T>)
}

pub fn declare_singleton<S: Singleton>() -> Result<ConstructionId, InjectError> {
    with_global(Container::declare_singleton::<S>)
}

pub fn create<T: Injectable>(construct: impl FnOnce() -> T) -> Result<T, InjectError> {
    global().create(construct)
}

pub fn enable_injector() {
    with_global(Container::enable_injector)
}

pub fn disable_injector() {
    with_global(Container::disable_injector)
}

pub fn enable_automatic_singletons() {
    with_global(Container::enable_automatic_singletons)
}

pub fn disable_automatic_singletons() {
    with_global(Container::disable_automatic_singletons)
}

pub fn enable_circular_dependency_check() {
    with_global(Container::enable_circular_dependency_check)
}

pub fn disable_circular_dependency_check() {
    with_global(Container::disable_circular_dependency_check)
}

pub fn enable_verbose(enable: bool) {
    with_global(|c| c.enable_verbose(enable))
}

pub fn set_logger(logger: Rc<dyn Logger>) {
    with_global(|c| c.set_logger(logger))
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn free_functions_share_one_container_per_thread() {
        // Each test runs on its own thread, so this starts from a fresh container
        register_singleton("IShared", Rc::new(11_u32));

        let first = instantiate_singleton::<u32>("IShared").unwrap();
        let second = global().instantiate_singleton::<u32>("IShared").unwrap();
        assert!(Rc::ptr_eq(&first, &second));

        let other_thread = thread::spawn(|| is_singleton_instantiated("IShared"))
            .join()
            .unwrap();
        assert!(!other_thread);

        clear_singletons();
        assert!(!is_singleton_instantiated("IShared"));
    }

    #[test]
    fn switches_apply_to_global_container() {
        disable_injector();
        assert!(!global().settings().injector_enabled);
        enable_injector();
        assert!(global().settings().injector_enabled);

        enable_circular_dependency_check();
        assert!(with_global(|c| c.settings().circular_check));
        disable_circular_dependency_check();
    }
}
