//! Validated, per-instance attribute slot restricted to the options of one tree.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use itertools::Itertools;
use tracing::trace;

use crate::domain::arena::{NodeId, Registry};
use crate::domain::error::{DomainError, DomainResult};

/// Identity of an owning instance.
///
/// Descriptors only hold weak references to tokens: once the owner (and with
/// it the token) is dropped, its stored value can no longer be read.
#[derive(Debug, Default)]
pub struct InstanceToken(Arc<()>);

impl InstanceToken {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

/// Anything carrying an [`InstanceToken`] can own descriptor values.
pub trait Owner {
    fn token(&self) -> &InstanceToken;
}

impl Owner for InstanceToken {
    fn token(&self) -> &InstanceToken {
        self
    }
}

#[derive(Debug)]
struct Slot {
    owner: Weak<()>,
    value: NodeId,
}

impl Slot {
    fn is_live(&self) -> bool {
        self.owner.strong_count() > 0
    }
}

/// Attribute restricted to the direct children of `tree`.
#[derive(Debug)]
pub struct Descriptor {
    attr: String,
    tree: NodeId,
    members: Vec<(NodeId, String)>,
    default: Option<NodeId>,
    allow_none: bool,
    values: HashMap<usize, Slot>,
}

impl Descriptor {
    /// The tree's options are captured here; trees never change after definition.
    pub fn new(registry: &Registry, attr: &str, tree: NodeId) -> DomainResult<Self> {
        let members = registry
            .node_ref(tree)?
            .children()
            .map(|c| (c.id(), c.name().to_string()))
            .collect();
        Ok(Self {
            attr: attr.to_string(),
            tree,
            members,
            default: None,
            allow_none: false,
            values: HashMap::new(),
        })
    }

    pub fn with_default(mut self, registry: &Registry, default: NodeId) -> DomainResult<Self> {
        self.check_member(registry, default)?;
        self.default = Some(default);
        Ok(self)
    }

    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }

    pub fn attr(&self) -> &str {
        &self.attr
    }

    pub fn tree(&self) -> NodeId {
        self.tree
    }

    pub fn default_value(&self) -> Option<NodeId> {
        self.default
    }

    fn check_member(&self, registry: &Registry, value: NodeId) -> DomainResult<()> {
        if self.members.iter().any(|(id, _)| *id == value) {
            return Ok(());
        }
        let rejected = registry
            .name(value)
            .map(str::to_string)
            .unwrap_or_else(|_| format!("{:?}", value));
        Err(DomainError::InvalidValue(format!(
            "'{}' is not a valid option for '{}'. Try [{}]",
            rejected,
            self.attr,
            self.members.iter().map(|(_, name)| name).join(", ")
        )))
    }

    /// Store `value` for `owner`; `None` clears the slot.
    pub fn set(&mut self, registry: &Registry, owner: &impl Owner, value: Option<NodeId>) -> DomainResult<()> {
        self.purge();
        let token = owner.token();
        match value {
            None => {
                if !self.allow_none && self.default.is_none() {
                    return Err(DomainError::InvalidValue(format!(
                        "None not allowed for '{}'",
                        self.attr
                    )));
                }
                self.values.remove(&token.key());
            }
            Some(value) => {
                self.check_member(registry, value)?;
                self.values.insert(
                    token.key(),
                    Slot {
                        owner: Arc::downgrade(&token.0),
                        value,
                    },
                );
            }
        }
        trace!("{} set to {:?}", self.attr, value);
        Ok(())
    }

    /// Stored value for `owner`, else the default.
    pub fn get(&self, owner: &impl Owner) -> Option<NodeId> {
        let token = owner.token();
        self.values
            .get(&token.key())
            .filter(|slot| Weak::ptr_eq(&slot.owner, &Arc::downgrade(&token.0)) && slot.is_live())
            .map(|slot| slot.value)
            .or(self.default)
    }

    /// Forget the value stored for `owner`.
    pub fn evict(&mut self, owner: &impl Owner) {
        self.values.remove(&owner.token().key());
    }

    /// Drop slots whose owners no longer exist.
    pub fn purge(&mut self) {
        self.values.retain(|_, slot| slot.is_live());
    }

    /// Number of owners with a stored value.
    pub fn len(&self) -> usize {
        self.values.values().filter(|slot| slot.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
