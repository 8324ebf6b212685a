//! Name → function registry.
//!
//! The registry is an ordinary value owned by whoever composes the program;
//! functions do not know which registries hold them. Several independent
//! registries can coexist.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::function::ParametricFunction;
use crate::models::library;

#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Arc<ParametricFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with every fixed-arity builtin.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for function in library::builtins() {
            // Builtin names are distinct and non-empty.
            let name = function.name().unwrap_or_default().to_string();
            registry.functions.insert(name, function);
        }
        registry
    }

    /// Register a named function. Anonymous functions and taken names are
    /// rejected.
    pub fn add(&mut self, function: Arc<ParametricFunction>) -> Result<()> {
        let Some(name) = function.name() else {
            return Err(Error::Save("cannot register an anonymous function".to_string()));
        };
        if self.functions.contains_key(name) {
            return Err(Error::Save(format!(
                "cannot save {name:?}: a function with that name already exists"
            )));
        }
        let name = name.to_string();
        debug!(function = %name, "registered function");
        self.functions.insert(name, function);
        Ok(())
    }

    /// Shared handle to the function called `name`.
    pub fn load(&self, name: &str) -> Result<Arc<ParametricFunction>> {
        self.get(name).cloned()
    }

    pub fn get(&self, name: &str) -> Result<&Arc<ParametricFunction>> {
        self.functions
            .get(name)
            .ok_or_else(|| Error::Load(format!("no function named {name:?}")))
    }

    pub fn remove(&mut self, name: &str) -> Result<Arc<ParametricFunction>> {
        let removed = self
            .functions
            .remove(name)
            .ok_or_else(|| Error::Load(format!("cannot remove {name:?}: no function with that name")))?;
        debug!(function = %name, "removed function");
        Ok(removed)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Arc<ParametricFunction>> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn clear(&mut self) {
        self.functions.clear();
    }
}
