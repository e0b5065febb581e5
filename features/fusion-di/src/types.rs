use std::{
    any::{Any, TypeId},
    fmt::Debug,
    rc::Rc,
};

/// Boxed error produced by user constructors
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// String token naming a service contract, e.g. `"ILog"`
pub type DependencyId = String;

/// Id assigned to a type when it is made injectable
pub type ConstructionId = u64;

/// A resolved service, type erased
///
/// Holds an `Rc<T>` for any `T: ?Sized`, so trait object contracts
/// (`Rc<dyn Logger>`) can be stored and handed out unchanged.
/// Cloning an [Instance] never clones the service itself.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    value: Rc<dyn Any>,
}

impl Instance {
    pub fn new<T: ?Sized + 'static>(instance: Rc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            value: Rc::new(instance),
        }
    }

    /// Returns the service as the type it was stored as
    ///
    /// On mismatch the name of the stored type is returned.
    pub fn downcast<T: ?Sized + 'static>(&self) -> Result<Rc<T>, &'static str> {
        match self.value.downcast_ref::<Rc<T>>() {
            Some(downcasted) => Ok(downcasted.clone()),
            None => Err(self.info.type_name),
        }
    }
}
impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}
