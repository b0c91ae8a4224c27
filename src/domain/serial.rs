//! Name-based serialization, always scoped to an explicit sub-tree.

use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, Visitor};
use serde::{Serialize, Serializer};

use crate::domain::arena::{NodeId, NodeRef, Registry};
use crate::domain::error::{DomainError, DomainResult};

impl Registry {
    /// A category serializes to its bare name.
    pub fn serialize(&self, id: NodeId) -> DomainResult<String> {
        Ok(self.name(id)?.to_string())
    }

    /// Find the direct child of `subtree` called `name`.
    pub fn deserialize(&self, subtree: NodeId, name: &str) -> DomainResult<NodeId> {
        let owner = self.node_ref(subtree)?;
        owner
            .child(name)
            .map(|child| child.id())
            .ok_or_else(|| DomainError::DoesNotExist {
                name: name.to_string(),
                owner: owner.name().to_string(),
                choices: owner.children().map(|c| c.name().to_string()).collect(),
            })
    }
}

impl<'a> NodeRef<'a> {
    pub fn serialize_name(&self) -> &'a str {
        self.name()
    }

    pub fn deserialize(&self, name: &str) -> DomainResult<NodeRef<'a>> {
        let registry = self.registry();
        registry.node_ref(registry.deserialize(self.id(), name)?)
    }

    /// Seed that deserializes a name against this node's children.
    pub fn seed(&self) -> ScopedSeed<'a> {
        ScopedSeed { scope: *self }
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// [`DeserializeSeed`] resolving a category name among the children of `scope`.
#[derive(Clone, Copy)]
pub struct ScopedSeed<'a> {
    scope: NodeRef<'a>,
}

impl<'de, 'a> DeserializeSeed<'de> for ScopedSeed<'a> {
    type Value = NodeRef<'a>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_str(self)
    }
}

impl<'de, 'a> Visitor<'de> for ScopedSeed<'a> {
    type Value = NodeRef<'a>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "the name of a category under '{}'", self.scope.name())
    }

    fn visit_str<E: de::Error>(self, name: &str) -> Result<Self::Value, E> {
        self.scope.deserialize(name).map_err(E::custom)
    }
}
