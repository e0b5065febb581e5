use crate::{container::Container, errors::InjectError, types::ConstructionId};

/// Types whose properties are being injected right now, outermost first
#[derive(Default, Debug)]
pub(crate) struct InjectionsInProgress {
    active: Vec<(ConstructionId, &'static str)>,
}

impl InjectionsInProgress {
    fn enter(&mut self, id: ConstructionId, type_name: &'static str) -> Result<(), InjectError> {
        if let Some(pos) = self.active.iter().position(|(active, _)| *active == id) {
            let mut chain: Vec<_> = self.active[pos..].iter().map(|(_, name)| *name).collect();
            chain.push(type_name);

            return Err(InjectError::CircularDependency { type_name, chain });
        }

        self.active.push((id, type_name));
        Ok(())
    }

    fn exit(&mut self, id: ConstructionId) {
        if let Some(pos) = self.active.iter().rposition(|(active, _)| *active == id) {
            self.active.remove(pos);
        }
    }
}

/// Marks a type as being injected until dropped
pub(crate) struct InjectionGuard<'c> {
    container: &'c Container,
    id: ConstructionId,
}

impl<'c> InjectionGuard<'c> {
    /// Fails with [InjectError::CircularDependency] if the type is already being injected
    pub fn enter(
        container: &'c Container,
        id: ConstructionId,
        type_name: &'static str,
    ) -> Result<Self, InjectError> {
        container
            .0
            .in_progress
            .borrow_mut()
            .enter(id, type_name)?;
        Ok(InjectionGuard { container, id })
    }
}

impl Drop for InjectionGuard<'_> {
    fn drop(&mut self) {
        self.container.0.in_progress.borrow_mut().exit(self.id);
    }
}

/// Keeps a type name on the verbose constructor stack until dropped
pub(crate) struct StackFrame<'c> {
    container: &'c Container,
}

impl<'c> StackFrame<'c> {
    pub fn push(container: &'c Container, type_name: &'static str) -> Self {
        container.0.constructor_stack.borrow_mut().push(type_name);
        StackFrame { container }
    }
}

impl Drop for StackFrame<'_> {
    fn drop(&mut self) {
        self.container.0.constructor_stack.borrow_mut().pop();
    }
}
