//! Construction of non-request complex parameters.

use log::debug;
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashMap;

type Factory = Box<dyn Fn(&Map<String, Value>) -> Result<Box<dyn Any>, String>>;

/// Type-name keyed factories for service parameters.
///
/// Factories receive the typed-parameter data registered on the descriptor as their
/// constructor arguments.
#[derive(Default)]
pub struct Container {
    factories: HashMap<String, Factory>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind<F>(mut self, type_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Result<Box<dyn Any>, String> + 'static,
    {
        self.factories.insert(type_name.into(), Box::new(factory));
        self
    }

    pub fn make(&self, type_name: &str, arguments: &Map<String, Value>) -> Result<Box<dyn Any>, String> {
        debug!("Resolving service {} with {} argument(s)", type_name, arguments.len());
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| format!("Target class [{}] does not exist.", type_name))?;
        factory(arguments)
    }
}
