//! Routine lookup by name.

use std::collections::BTreeMap;

use qc_model::{DuplicateKindError, MessageRegistry};

use crate::routine::RoutineFactory;
use crate::routines::BUILTIN_FACTORIES;

/// Routine factories keyed by their exact name.
#[derive(Debug, Clone, Default)]
pub struct RoutineRegistry {
    factories: BTreeMap<&'static str, RoutineFactory>,
}

impl RoutineRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every bundled routine.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for factory in BUILTIN_FACTORIES {
            registry.register(*factory);
        }
        registry
    }

    /// Adds a factory, replacing any previous one with the same name.
    pub fn register(&mut self, factory: RoutineFactory) -> Option<RoutineFactory> {
        self.factories.insert(factory.name, factory)
    }

    pub fn get(&self, name: &str) -> Option<&RoutineFactory> {
        self.factories.get(name)
    }

    /// Factories in name order.
    pub fn factories(&self) -> impl Iterator<Item = &RoutineFactory> {
        self.factories.values()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Message registry covering the built-in kinds and every kind the
    /// registered routines can raise.
    pub fn message_registry(&self) -> Result<MessageRegistry, DuplicateKindError> {
        let mut messages = MessageRegistry::with_builtins();
        for factory in self.factories.values() {
            messages.register_all(factory.message_kinds)?;
        }
        Ok(messages)
    }
}
