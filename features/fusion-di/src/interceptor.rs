use std::{any::Any, sync::Arc};

use crate::{
    container::Container,
    errors::InjectError,
    factories::Injectable,
    guard::{InjectionGuard, StackFrame},
    ledger::Binding,
    types::{ConstructionId, DynError, TypeInfo},
};

// Construction of injectable types
impl Container {
    /// Builds `T` with `construct`, then injects every property of its ledger
    ///
    /// `T` must have been made injectable. Properties are injected in ledger order; the
    /// first failing resolution aborts construction and the partially injected value is dropped.
    /// With the injector disabled the raw value is returned untouched.
    pub fn create<T: Injectable>(&self, construct: impl FnOnce() -> T) -> Result<T, InjectError> {
        self.intercept(|| Ok(construct()))
    }

    /// [Container::create] with a fallible constructor
    ///
    /// Constructor errors are returned as [InjectError::ConstructionFailure].
    pub fn try_create<T, E>(
        &self,
        construct: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, InjectError>
    where
        T: Injectable,
        E: Into<DynError>,
    {
        self.intercept(|| {
            construct().map_err(|error| InjectError::ConstructionFailure {
                product: std::any::type_name::<T>(),
                dependency_id: None,
                error: Arc::new(error.into()),
            })
        })
    }

    pub fn create_default<T: Injectable + Default>(&self) -> Result<T, InjectError> {
        self.create(T::default)
    }

    pub(crate) fn intercept<T: Injectable>(
        &self,
        construct: impl FnOnce() -> Result<T, InjectError>,
    ) -> Result<T, InjectError> {
        let info = TypeInfo::of::<T>();
        let construction_id = self.construction_id(info)?;

        self.verbose(|| format!("++++ Constructing injectable type: {info}"));
        let _frame = self
            .settings()
            .verbose
            .then(|| StackFrame::push(self, info.type_name));

        let mut raw = construct()?;

        if !self.settings().injector_enabled {
            return Ok(raw);
        }

        if let Err(err) = self.inject_properties(construction_id, info, &mut raw) {
            self.logger().error(&format!(
                "Failed to construct {info} due to an error while injecting its properties."
            ));
            return Err(err);
        }

        Ok(raw)
    }

    fn construction_id(&self, info: TypeInfo) -> Result<ConstructionId, InjectError> {
        self.0
            .injectables
            .borrow()
            .get(&info.type_id)
            .and_then(|entry| entry.construction_id)
            .ok_or(InjectError::NotInjectable(info.type_name))
    }

    fn inject_properties(
        &self,
        construction_id: ConstructionId,
        info: TypeInfo,
        target: &mut dyn Any,
    ) -> Result<(), InjectError> {
        self.verbose(|| format!(">>>> Resolving dependencies for new instance of {info}."));

        // Cloned out so no borrow is held while dependencies are constructed
        let ledger: Vec<Binding> = self
            .0
            .injectables
            .borrow()
            .get(&info.type_id)
            .map(|entry| entry.ledger.clone())
            .unwrap_or_default();

        let _guard = match self.settings().circular_check {
            true => Some(InjectionGuard::enter(self, construction_id, info.type_name)?),
            false => None,
        };

        for binding in &ledger {
            self.verbose(|| {
                format!(
                    ">>>> Injecting {} into {}",
                    binding.dependency_id, binding.property
                )
            });
            binding.inject(target, self)?;
        }

        Ok(())
    }
}
