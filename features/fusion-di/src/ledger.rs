use std::{
    any::{type_name, Any},
    fmt::Debug,
    marker::PhantomData,
    ops::Deref,
    rc::Rc,
};

use crate::{
    container::Container,
    errors::InjectError,
    types::DependencyId,
};

/// A property filled in by the container after construction
///
/// Starts out unset. The container sets it when the owning type is created through
/// [Container::create](crate::Container::create) with the injector enabled; tests doing
/// manual injection can [set](Inject::set) it themselves.
pub struct Inject<T: ?Sized> {
    slot: Option<Rc<T>>,
}
impl<T: ?Sized> Default for Inject<T> {
    fn default() -> Self {
        Inject { slot: None }
    }
}
impl<T: ?Sized> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Inject {
            slot: self.slot.clone(),
        }
    }
}
impl<T: ?Sized> Debug for Inject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.slot.is_some() { "set" } else { "unset" };
        f.debug_tuple("Inject").field(&state).finish()
    }
}
impl<T: ?Sized> Deref for Inject<T> {
    type Target = T;

    /// # Panics
    /// If the property has not been injected
    fn deref(&self) -> &Self::Target {
        match &self.slot {
            Some(value) => value,
            None => panic!(
                "Injected property of type '{}' accessed before injection",
                type_name::<T>()
            ),
        }
    }
}
impl<T: ?Sized> Inject<T> {
    pub fn new(value: Rc<T>) -> Self {
        Inject { slot: Some(value) }
    }

    pub fn get(&self) -> Option<&Rc<T>> {
        self.slot.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.slot.is_some()
    }

    pub fn set(&mut self, value: Rc<T>) {
        self.slot = Some(value);
    }
}

type AssignFn = dyn Fn(&mut dyn Any, &Container) -> Result<(), InjectError>;

/// One recorded (property, dependency id) pair of a type's ledger
#[derive(Clone)]
pub(crate) struct Binding {
    pub property: &'static str,
    pub dependency_id: DependencyId,
    assign: Rc<AssignFn>,
}
impl Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("property", &self.property)
            .field("dependency_id", &self.dependency_id)
            .finish()
    }
}
impl Binding {
    pub(crate) fn new<T: 'static, D: ?Sized + 'static>(
        property: &'static str,
        dependency_id: DependencyId,
        accessor: fn(&mut T) -> &mut Inject<D>,
    ) -> Self {
        let id = dependency_id.clone();
        let assign = move |target: &mut dyn Any, container: &Container| -> Result<(), InjectError> {
            let resolved = container.instantiate_singleton::<D>(&id)?;
            let target = target
                .downcast_mut::<T>()
                .ok_or(InjectError::NotInjectable(type_name::<T>()))?;
            accessor(target).set(resolved);
            Ok(())
        };

        Binding {
            property,
            dependency_id,
            assign: Rc::new(assign),
        }
    }

    /// Resolves the dependency and writes it into the property of `target`
    pub(crate) fn inject(
        &self,
        target: &mut dyn Any,
        container: &Container,
    ) -> Result<(), InjectError> {
        (self.assign)(target, container)
    }
}

/// Records the injected properties of `T`, in declaration order
///
/// Handed to [Injectable::declare](crate::Injectable::declare).
pub struct PropertyLedger<'a, T> {
    bindings: &'a mut Vec<Binding>,
    _marker: PhantomData<fn(&mut T)>,
}

impl<'a, T: 'static> PropertyLedger<'a, T> {
    pub(crate) fn new(bindings: &'a mut Vec<Binding>) -> Self {
        PropertyLedger {
            bindings,
            _marker: PhantomData,
        }
    }

    /// Inject the dependency `dependency_id` into the property returned by `accessor`
    ///
    /// ```rust
    /// use fusion_di::{Inject, Injectable, PropertyLedger};
    ///
    /// trait Clock {}
    ///
    /// struct Scheduler {
    ///     clock: Inject<dyn Clock>,
    /// }
    /// impl Injectable for Scheduler {
    ///     fn declare(ledger: &mut PropertyLedger<Self>) {
    ///         ledger.inject("clock", "IClock", |s| &mut s.clock);
    ///     }
    /// }
    /// ```
    pub fn inject<D: ?Sized + 'static>(
        &mut self,
        property: &'static str,
        dependency_id: impl Into<DependencyId>,
        accessor: fn(&mut T) -> &mut Inject<D>,
    ) -> &mut Self {
        self.bindings
            .push(Binding::new(property, dependency_id.into(), accessor));
        self
    }
}
