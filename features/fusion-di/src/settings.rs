/// Mode switches of a [Container](crate::Container)
///
/// Every switch can be flipped at any time on the container, and takes effect on the next
/// relevant operation. Already constructed objects are never revisited.
///
/// # Example
/// ```rust
/// use fusion_di::{Container, Settings};
///
/// let container = Container::with_settings(
///     Settings::default()
///         .with_circular_check(true)
///         .with_verbose(true),
/// );
/// assert!(container.settings().circular_check);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Inject properties after construction. Disable for manual injection in tests.
    pub injector_enabled: bool,
    /// Register the constructor of declared singletons
    pub automatic_singletons: bool,
    /// Detect circular dependencies instead of recursing until the stack overflows.
    /// Costs a lookup per injected object.
    pub circular_check: bool,
    /// Emit diagnostics for every declaration, resolution and injection
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            injector_enabled: true,
            automatic_singletons: true,
            circular_check: false,
            verbose: false,
        }
    }
}

impl Settings {
    pub fn with_injector(mut self, enabled: bool) -> Self {
        self.injector_enabled = enabled;
        self
    }

    pub fn with_automatic_singletons(mut self, enabled: bool) -> Self {
        self.automatic_singletons = enabled;
        self
    }

    pub fn with_circular_check(mut self, enabled: bool) -> Self {
        self.circular_check = enabled;
        self
    }

    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();

        assert!(settings.injector_enabled);
        assert!(settings.automatic_singletons);
        assert!(!settings.circular_check);
        assert!(!settings.verbose);
    }

    #[test]
    fn setters_only_touch_their_switch() {
        let settings = Settings::default().with_injector(false);

        assert_eq!(
            settings,
            Settings {
                injector_enabled: false,
                ..Settings::default()
            }
        );
    }
}
