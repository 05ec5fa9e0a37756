use parking_lot::RwLock;
use std::collections::HashMap;

/// Access to the environment variables the runner hands to a step.
///
/// Everything the toolkit knows about its host (file command paths, inputs,
/// runner metadata) arrives through this trait, so callers can swap the real
/// process environment for an in-memory one.
pub trait Environment: Send + Sync {
    /// Read a variable. Returns `None` when it is not set or not valid Unicode.
    fn get(&self, name: &str) -> Option<String>;

    /// Set a variable for the remainder of the current process.
    fn set(&self, name: &str, value: &str);

    /// Read a variable, treating an empty value as absent.
    fn get_non_empty(&self, name: &str) -> Option<String> {
        self.get(name).filter(|value| !value.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set(&self, name: &str, value: &str) {
        std::env::set_var(name, value);
    }
}

/// An environment backed by a map. Nothing leaks into the process.
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    variables: RwLock<HashMap<String, String>>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of `(name, value)` pairs.
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let variables = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            variables: RwLock::new(variables),
        }
    }

    /// Remove a variable.
    pub fn remove(&self, name: &str) {
        self.variables.write().remove(name);
    }

    /// Snapshot of every variable currently set.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.variables.read().clone()
    }
}

impl Environment for MemoryEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        self.variables.read().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.variables
            .write()
            .insert(name.to_string(), value.to_string());
    }
}
