//! Sibling ordering between categories sharing an owner.

use std::cmp::Ordering;

use crate::domain::arena::{NodeId, NodeRef, Registry};
use crate::domain::error::{DomainError, DomainResult};

impl Registry {
    /// Owner shared by both nodes.
    ///
    /// When several owners are shared, the first owner of `left` (in
    /// registration order) that also owns `right` wins.
    pub fn common_parent(&self, left: NodeId, right: NodeId) -> DomainResult<NodeId> {
        let l = self.node(left)?;
        let r = self.node(right)?;
        l.parents
            .iter()
            .copied()
            .find(|owner| r.parents.contains(owner))
            .ok_or_else(|| DomainError::NoCommonOwner {
                left: l.name.clone(),
                right: r.name.clone(),
            })
    }

    /// Compare two categories by their declaration rank under a common owner.
    pub fn compare(&self, left: NodeId, right: NodeId) -> DomainResult<Ordering> {
        let owner = self.common_parent(left, right)?;
        let rank = |id: NodeId| -> DomainResult<usize> {
            self.parent_index(id, owner)?.ok_or_else(|| {
                DomainError::InvalidValue(format!("{:?} has no rank under {:?}", id, owner))
            })
        };
        Ok(rank(left)?.cmp(&rank(right)?))
    }

    pub fn lt(&self, left: NodeId, right: NodeId) -> DomainResult<bool> {
        Ok(self.compare(left, right)? == Ordering::Less)
    }

    pub fn gt(&self, left: NodeId, right: NodeId) -> DomainResult<bool> {
        Ok(self.compare(left, right)? == Ordering::Greater)
    }
}

impl NodeRef<'_> {
    /// Fallible comparison, reporting why two nodes cannot be ordered.
    pub fn try_cmp(&self, other: &NodeRef<'_>) -> DomainResult<Ordering> {
        if !std::ptr::eq(self.registry(), other.registry()) {
            return Err(DomainError::InvalidValue(format!(
                "'{}' and '{}' belong to different registries",
                self.name(),
                other.name()
            )));
        }
        self.registry().compare(self.id(), other.id())
    }
}

/// Nodes without a common owner are incomparable: `<` and `>` are both false.
impl PartialOrd for NodeRef<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        self.try_cmp(other).ok()
    }
}
