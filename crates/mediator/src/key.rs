//! # Message Type Keys
//!
//! Every table in the registry is indexed by the declared type of a message,
//! never by its value.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The three kinds of message the mediator routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// An action with exactly one handler.
    Command,
    /// A request for data with exactly one handler.
    Query,
    /// Something that happened; zero or more handlers.
    Notification,
}

impl MessageKind {
    /// Lowercase label used in errors and log records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Query => "query",
            Self::Notification => "notification",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key derived from a message's declared type.
///
/// Identity is the `TypeId` alone. The name is carried for diagnostics only,
/// so two keys for the same type are always equal and two distinct types
/// never collide even if their names print the same.
#[derive(Debug, Clone, Copy)]
pub struct MessageTypeKey {
    id: TypeId,
    name: &'static str,
}

impl MessageTypeKey {
    /// Key for the declared type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Human-readable type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Underlying type identity.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for MessageTypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageTypeKey {}

impl Hash for MessageTypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for MessageTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Alpha;
    struct Beta;

    mod shadow {
        pub struct Alpha;
    }

    #[test]
    fn test_same_type_same_key() {
        assert_eq!(MessageTypeKey::of::<Alpha>(), MessageTypeKey::of::<Alpha>());
    }

    #[test]
    fn test_distinct_types_never_collide() {
        let keys: HashSet<_> = [
            MessageTypeKey::of::<Alpha>(),
            MessageTypeKey::of::<Beta>(),
            MessageTypeKey::of::<shadow::Alpha>(),
            MessageTypeKey::of::<u32>(),
            MessageTypeKey::of::<i32>(),
        ]
        .into_iter()
        .collect();

        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn test_generic_instantiations_are_distinct() {
        assert_ne!(
            MessageTypeKey::of::<Vec<u8>>(),
            MessageTypeKey::of::<Vec<u16>>()
        );
    }

    #[test]
    fn test_name_is_type_name() {
        let key = MessageTypeKey::of::<Alpha>();
        assert!(key.name().ends_with("Alpha"));
        assert_eq!(key.to_string(), key.name());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(MessageKind::Command.to_string(), "command");
        assert_eq!(MessageKind::Query.to_string(), "query");
        assert_eq!(MessageKind::Notification.to_string(), "notification");
    }
}
