use std::collections::BTreeMap;

use crate::error::DuplicateKindError;
use crate::kinds::BUILTIN_KINDS;
use crate::message::MessageKind;

/// Lookup of message kinds by identifier, used to rebuild messages from
/// their codes.
#[derive(Debug, Clone, Default)]
pub struct MessageRegistry {
    kinds: BTreeMap<&'static str, MessageKind>,
}

impl MessageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the kinds raised while reading data.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in BUILTIN_KINDS {
            registry.kinds.insert(kind.id(), *kind);
        }
        registry
    }

    /// Adds a kind. Registering the same kind twice is a no-op.
    pub fn register(&mut self, kind: MessageKind) -> Result<(), DuplicateKindError> {
        match self.kinds.get(kind.id()) {
            Some(existing) if existing.same_templates(&kind) => Ok(()),
            Some(_) => Err(DuplicateKindError {
                id: kind.id().to_string(),
            }),
            None => {
                self.kinds.insert(kind.id(), kind);
                Ok(())
            }
        }
    }

    pub fn register_all<'a>(
        &mut self,
        kinds: impl IntoIterator<Item = &'a MessageKind>,
    ) -> Result<(), DuplicateKindError> {
        kinds.into_iter().try_for_each(|kind| self.register(*kind))
    }

    pub fn get(&self, id: &str) -> Option<MessageKind> {
        self.kinds.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.kinds.contains_key(id)
    }

    /// Registered kinds, ordered by identifier.
    pub fn kinds(&self) -> impl Iterator<Item = MessageKind> + '_ {
        self.kinds.values().copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{MISSING_VALUE, UNPARSEABLE_NUMBER};
    use crate::message::Message;

    fn other_text(_: &Message) -> String {
        String::new()
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = MessageRegistry::with_builtins();
        assert_eq!(registry.len(), BUILTIN_KINDS.len());
        assert_eq!(registry.get("MissingValue"), Some(MISSING_VALUE));
        assert!(registry.get("NoSuchKind").is_none());
    }

    #[test]
    fn test_reregistering_same_kind_is_allowed() {
        let mut registry = MessageRegistry::with_builtins();
        registry.register(UNPARSEABLE_NUMBER).unwrap();
        assert_eq!(registry.len(), BUILTIN_KINDS.len());
    }

    #[test]
    fn test_conflicting_templates_are_rejected() {
        let mut registry = MessageRegistry::with_builtins();
        let clash = MessageKind::new("MissingValue", other_text, other_text);
        let err = registry.register(clash).unwrap_err();
        assert_eq!(err.id, "MissingValue");
    }
}
