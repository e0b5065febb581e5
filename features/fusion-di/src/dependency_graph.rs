use std::{
    any::TypeId,
    collections::{BTreeMap, HashSet},
};

use thiserror::Error;

use crate::{container::Container, types::DependencyId};

/// Graph of every dependency id known to a [Container]
///
/// Built from the registered singletons and the ledgers of the declared types, without
/// constructing anything. Used to find missing and circular dependencies up front.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Dependency ids resolvable by the container, and what each of them injects
    map: BTreeMap<DependencyId, DependencyGraphEntry>,
    /// Injectable types that are not singletons, by type name
    consumers: BTreeMap<&'static str, Vec<DependencyId>>,
}

#[derive(Debug)]
struct DependencyGraphEntry {
    provided_by: &'static str,
    dependencies: Vec<DependencyId>,
}

impl DependencyGraph {
    pub fn new(container: &Container) -> Self {
        let mut graph = Self::default();
        let registry = container.0.registry.borrow();
        let injectables = container.0.injectables.borrow();

        let dependencies_of = |type_id: TypeId| -> Vec<DependencyId> {
            injectables
                .get(&type_id)
                .map(|entry| {
                    entry
                        .ledger
                        .iter()
                        .map(|binding| binding.dependency_id.clone())
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut singleton_types = HashSet::new();
        for (dependency_id, product) in registry.known_constructors() {
            singleton_types.insert(product.type_id);
            graph.map.insert(
                dependency_id,
                DependencyGraphEntry {
                    provided_by: product.type_name,
                    dependencies: dependencies_of(product.type_id),
                },
            );
        }

        // Built singletons are final, their constructors will never run again
        for dependency_id in registry.instantiated_ids() {
            graph.map.insert(
                dependency_id,
                DependencyGraphEntry {
                    provided_by: "registered instance",
                    dependencies: Vec::new(),
                },
            );
        }

        for entry in injectables.values() {
            if entry.construction_id.is_some() && !singleton_types.contains(&entry.info.type_id) {
                graph
                    .consumers
                    .insert(entry.info.type_name, dependencies_of(entry.info.type_id));
            }
        }

        graph
    }

    /// The ids the given id injects, or `None` if the id is unknown
    pub fn dependencies(&self, dependency_id: &str) -> Option<&[DependencyId]> {
        self.map
            .get(dependency_id)
            .map(|entry| entry.dependencies.as_slice())
    }

    /// Validate the graph
    ///
    /// Returns a list of all issues
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();

        for (required_by, dependencies) in &self.consumers {
            for dependency in dependencies {
                if !self.map.contains_key(dependency) {
                    errors.push(DependencyGraphError::MissingDependency {
                        dependency: dependency.clone(),
                        required_by: required_by.to_string(),
                    });
                }
            }
        }

        for dependency_id in self.map.keys() {
            let mut dependency_chain = Vec::new();
            check_recurse(
                self,
                &mut checked,
                &mut errors,
                &mut dependency_chain,
                dependency_id,
            );
        }

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }

        return Ok(());

        fn check_recurse<'g>(
            graph: &'g DependencyGraph,
            checked: &mut HashSet<&'g str>,
            errors: &mut Vec<DependencyGraphError>,
            dependency_chain: &mut Vec<&'g str>,
            dependency_id: &'g str,
        ) {
            // Circular Dependency Check
            if let Some(pos) = dependency_chain.iter().position(|id| *id == dependency_id) {
                let mut chain: Vec<DependencyId> = dependency_chain[pos..]
                    .iter()
                    .map(|id| id.to_string())
                    .collect();
                chain.push(dependency_id.to_string());

                errors.push(DependencyGraphError::CircularDependency {
                    from: dependency_chain[pos].to_string(),
                    to: dependency_chain[dependency_chain.len() - 1].to_string(),
                    chain,
                });
                return;
            }

            // Skip other checks if already checked
            if !checked.insert(dependency_id) {
                return;
            };

            let Some(entry) = graph.map.get(dependency_id) else {
                return;
            };

            dependency_chain.push(dependency_id);

            for dependency in &entry.dependencies {
                if !graph.map.contains_key(dependency) {
                    errors.push(DependencyGraphError::MissingDependency {
                        dependency: dependency.clone(),
                        required_by: format!("{} ({})", dependency_id, entry.provided_by),
                    });
                    continue;
                }

                check_recurse(graph, checked, errors, dependency_chain, dependency);
            }

            dependency_chain.pop();
        }
    }
}

impl Container {
    /// Graph of every resolvable dependency id and what it injects
    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::new(self)
    }

    /// Reports every missing and circular dependency without constructing anything
    pub fn validate(&self) -> Result<(), DependencyGraphErrors> {
        self.dependency_graph().check()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: DependencyId,
        required_by: String,
    },
    #[error("A Circular Dependency exists between '{from}' and '{to}' through {chain:?}")]
    CircularDependency {
        from: DependencyId,
        to: DependencyId,
        chain: Vec<DependencyId>,
    },
}
impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{DynError, Inject, Injectable, PropertyLedger, Singleton};

    macro_rules! singleton {
        ($name:ident, $id:literal $(, $field:ident => $dep:literal)*) => {
            #[derive(Default)]
            struct $name {
                $($field: Inject<u8>,)*
            }
            impl Injectable for $name {
                #[allow(unused_variables)]
                fn declare(ledger: &mut PropertyLedger<Self>) {
                    $(ledger.inject(stringify!($field), $dep, |s| &mut s.$field);)*
                }
            }
            impl Singleton for $name {
                const DEPENDENCY_ID: &'static str = $id;
                type Contract = $name;

                fn construct() -> Result<Self, DynError> {
                    Ok(Self::default())
                }

                fn into_contract(self: Rc<Self>) -> Rc<Self> {
                    self
                }
            }
        };
    }

    singleton!(First, "IFirst", second => "ISecond");
    singleton!(Second, "ISecond", third => "IThird");
    singleton!(Third, "IThird", first => "IFirst");
    singleton!(Leaf, "ILeaf");
    singleton!(NeedsMissing, "INeedsMissing", gone => "IGone");

    #[test]
    fn detects_cycle_through_three_singletons() {
        let container = Container::new();
        container.declare_singleton::<First>().unwrap();
        container.declare_singleton::<Second>().unwrap();
        container.declare_singleton::<Third>().unwrap();

        let errors = container.validate().unwrap_err().errors;

        assert_eq!(
            errors,
            vec![DependencyGraphError::CircularDependency {
                from: "IFirst".into(),
                to: "IThird".into(),
                chain: vec![
                    "IFirst".into(),
                    "ISecond".into(),
                    "IThird".into(),
                    "IFirst".into()
                ],
            }]
        );
    }

    #[test]
    fn reports_missing_dependency() {
        let container = Container::new();
        container.declare_singleton::<NeedsMissing>().unwrap();
        container.declare_singleton::<Leaf>().unwrap();

        let errors = container.validate().unwrap_err().errors;

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            DependencyGraphError::MissingDependency { dependency, .. } if dependency == "IGone"
        ));
    }

    #[test]
    fn registered_instances_satisfy_dependencies() {
        let container = Container::new();
        container.declare_singleton::<NeedsMissing>().unwrap();
        container.register_singleton("IGone", Rc::new(1_u8));

        assert!(container.validate().is_ok());
        assert_eq!(
            container.dependency_graph().dependencies("INeedsMissing"),
            Some(&["IGone".to_string()][..])
        );
    }

    #[test]
    fn checks_plain_injectables() {
        #[derive(Default)]
        struct Page {
            leaf: Inject<u8>,
        }
        impl Injectable for Page {
            fn declare(ledger: &mut PropertyLedger<Self>) {
                ledger.inject("leaf", "ILeaf", |p| &mut p.leaf);
            }
        }

        let container = Container::new();
        container.make_injectable::<Page>().unwrap();
        assert!(container.validate().is_err());

        container.declare_singleton::<Leaf>().unwrap();
        assert!(container.validate().is_ok());
    }
}
