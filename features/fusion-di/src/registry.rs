use std::{collections::HashMap, fmt::Debug, rc::Rc};

use crate::{
    container::Container,
    errors::InjectError,
    types::{DependencyId, Instance, TypeInfo},
};

pub(crate) type ConstructFn = dyn Fn(&Container) -> Result<Instance, InjectError>;

/// Lazily invoked constructor of a singleton
#[derive(Clone)]
pub(crate) struct SingletonConstructor {
    /// The type being constructed
    pub product: TypeInfo,
    pub construct: Rc<ConstructFn>,
}
impl Debug for SingletonConstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SingletonConstructor")
            .field(&self.product.type_name)
            .finish()
    }
}

/// Singleton constructors and the singletons built so far, by dependency id
#[derive(Default, Debug)]
pub(crate) struct SingletonRegistry {
    constructors: HashMap<DependencyId, SingletonConstructor>,
    instances: HashMap<DependencyId, Instance>,
}

impl SingletonRegistry {
    /// Stores a constructor, replacing any previous one for the id
    pub fn register_constructor(
        &mut self,
        dependency_id: DependencyId,
        constructor: SingletonConstructor,
    ) -> Option<SingletonConstructor> {
        self.constructors.insert(dependency_id, constructor)
    }

    /// Stores a built singleton, replacing any previous one for the id
    pub fn register_instance(
        &mut self,
        dependency_id: DependencyId,
        instance: Instance,
    ) -> Option<Instance> {
        self.instances.insert(dependency_id, instance)
    }

    pub fn instance(&self, dependency_id: &str) -> Option<Instance> {
        self.instances.get(dependency_id).cloned()
    }

    pub fn constructor(&self, dependency_id: &str) -> Option<SingletonConstructor> {
        self.constructors.get(dependency_id).cloned()
    }

    pub fn is_registered(&self, dependency_id: &str) -> bool {
        self.constructors.contains_key(dependency_id)
    }

    pub fn is_instantiated(&self, dependency_id: &str) -> bool {
        self.instances.contains_key(dependency_id)
    }

    /// Drops every built singleton, constructors are kept
    pub fn clear_instances(&mut self) {
        self.instances.clear();
    }

    /// Every known constructor as (dependency id, product), sorted by id
    pub fn known_constructors(&self) -> Vec<(DependencyId, TypeInfo)> {
        let mut known: Vec<_> = self
            .constructors
            .iter()
            .map(|(id, constructor)| (id.clone(), constructor.product))
            .collect();
        known.sort_by(|a, b| a.0.cmp(&b.0));
        known
    }

    /// Every dependency id with a built singleton, sorted
    pub fn instantiated_ids(&self) -> Vec<DependencyId> {
        let mut ids: Vec<_> = self.instances.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constructor_of<T: 'static>() -> SingletonConstructor {
        SingletonConstructor {
            product: TypeInfo::of::<T>(),
            construct: Rc::new(|_| Ok(Instance::new(Rc::new(0_u8)))),
        }
    }

    #[test]
    fn last_constructor_registration_wins() {
        let mut registry = SingletonRegistry::default();
        registry.register_constructor("IClock".into(), constructor_of::<u8>());
        let previous = registry.register_constructor("IClock".into(), constructor_of::<u16>());

        assert_eq!(previous.map(|c| c.product), Some(TypeInfo::of::<u8>()));
        assert_eq!(
            registry.constructor("IClock").map(|c| c.product),
            Some(TypeInfo::of::<u16>())
        );
    }

    #[test]
    fn clearing_keeps_constructors() {
        let mut registry = SingletonRegistry::default();
        registry.register_constructor("IClock".into(), constructor_of::<u8>());
        registry.register_instance("IClock".into(), Instance::new(Rc::new(1_u8)));
        assert!(registry.is_instantiated("IClock"));

        registry.clear_instances();

        assert!(!registry.is_instantiated("IClock"));
        assert!(registry.is_registered("IClock"));
    }

    #[test]
    fn known_constructors_are_sorted() {
        let mut registry = SingletonRegistry::default();
        registry.register_constructor("b".into(), constructor_of::<u8>());
        registry.register_constructor("a".into(), constructor_of::<u16>());

        let ids: Vec<_> = registry
            .known_constructors()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
