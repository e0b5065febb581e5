use std::sync::Arc;

use thiserror::Error;

use crate::types::{ConstructionId, DependencyId, DynError};

/// Errors raised while resolving, constructing or declaring injectables
#[derive(Error, Debug, Clone)]
pub enum InjectError {
    /// No constructor and no instance is known for the dependency id
    #[error("No constructor found for singleton '{dependency_id}'{}", format_stack(.construction_stack))]
    UnresolvedDependency {
        dependency_id: DependencyId,
        /// Types under construction when the lookup failed, outermost first.
        /// Only recorded in verbose mode.
        construction_stack: Vec<&'static str>,
        /// Every dependency id a constructor is registered for
        known_constructors: Vec<DependencyId>,
    },

    /// A constructor returned an error
    #[error("Constructor for '{product}' failed - error: {error}")]
    ConstructionFailure {
        product: &'static str,
        /// Set when the failing constructor was building a singleton
        dependency_id: Option<DependencyId>,
        error: Arc<DynError>,
    },

    /// The same type was reentered while its properties were being injected
    #[error("'{type_name}' has already been injected, a circular dependency exists through {}", .chain.join(" -> "))]
    CircularDependency {
        type_name: &'static str,
        chain: Vec<&'static str>,
    },

    /// The type was made injectable twice in the same container
    #[error("'{type_name}' has already been made injectable with id {construction_id}")]
    DoubleWrap {
        type_name: &'static str,
        construction_id: ConstructionId,
    },

    /// The type is constructed through the container but was never made injectable
    #[error("'{0}' has not been made injectable")]
    NotInjectable(&'static str),

    #[error("Failed to downcast '{dependency_id}', required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        dependency_id: DependencyId,
        required_type: &'static str,
        actual_type: &'static str,
    },
}

impl InjectError {
    /// The dependency id the error is about, if any
    pub fn dependency_id(&self) -> Option<&str> {
        match self {
            InjectError::UnresolvedDependency { dependency_id, .. }
            | InjectError::DowncastFailed { dependency_id, .. } => Some(dependency_id),
            InjectError::ConstructionFailure { dependency_id, .. } => dependency_id.as_deref(),
            _ => None,
        }
    }
}

fn format_stack(stack: &[&'static str]) -> String {
    if stack.is_empty() {
        return String::new();
    }
    format!(" - constructor stack: {}", stack.join(" -> "))
}
