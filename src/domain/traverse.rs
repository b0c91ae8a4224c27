//! Walking category trees: descendants, ancestors, family and rendering.

use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{NodeId, NodeRef, Registry};
use crate::domain::error::DomainResult;

/// Depth-first, pre-order walk below a node.
///
/// Every call to [`Registry::descendants`] starts a fresh walk, so the same
/// sequence can be produced any number of times.
pub struct Descendants<'a> {
    registry: &'a Registry,
    stack: Vec<NodeId>,
}

impl<'a> Descendants<'a> {
    fn new(start: NodeRef<'a>, include_self: bool) -> Self {
        let mut stack = Vec::new();
        if include_self {
            stack.push(start.id());
        } else {
            // Push children in reverse order for left-to-right traversal
            stack.extend(start.data().children.iter().rev());
        }
        Self {
            registry: start.registry(),
            stack,
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.registry.get(current) {
                self.stack.extend(node.data().children.iter().rev());
                return Some(node);
            }
        }
        None
    }
}

impl Registry {
    #[instrument(level = "trace", skip(self))]
    pub fn descendants(&self, id: NodeId, include_self: bool) -> DomainResult<Descendants<'_>> {
        Ok(Descendants::new(self.node_ref(id)?, include_self))
    }

    /// Chain of first-owner links above a node.
    ///
    /// Root first by default; node first when `ascending`. With
    /// `include_self` the node itself closes (or opens) the chain. Nodes with
    /// several owners are walked through the owner that registered them first.
    #[instrument(level = "trace", skip(self))]
    pub fn ancestors(&self, id: NodeId, ascending: bool, include_self: bool) -> DomainResult<Vec<NodeId>> {
        let mut ancestors = Vec::new();
        if include_self {
            ancestors.push(id);
        }
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            ancestors.push(parent);
            current = parent;
        }
        if !ascending {
            ancestors.reverse();
        }
        Ok(ancestors)
    }

    /// Ancestors (root first), the node itself, then its descendants.
    pub fn family(&self, id: NodeId) -> DomainResult<Vec<NodeId>> {
        let mut family = self.ancestors(id, false, false)?;
        family.push(id);
        family.extend(self.descendants(id, false)?.map(|n| n.id()));
        Ok(family)
    }

    /// Top of the first-owner chain.
    pub fn root(&self, id: NodeId) -> DomainResult<NodeId> {
        let mut root = id;
        while let Some(parent) = self.node(root)?.parent {
            root = parent;
        }
        Ok(root)
    }

    /// Number of levels in the sub-tree below and including `id`.
    pub fn depth(&self, id: NodeId) -> DomainResult<usize> {
        let node = self.node_ref(id)?;
        Ok(1 + node
            .children()
            .map(|child| self.depth(child.id()).unwrap_or(0))
            .max()
            .unwrap_or(0))
    }

    /// Descendants without children, in pre-order.
    pub fn leaves(&self, id: NodeId) -> DomainResult<Vec<NodeId>> {
        Ok(self
            .descendants(id, false)?
            .filter(|n| n.is_leaf())
            .map(|n| n.id())
            .collect())
    }

    /// Render the sub-tree below `id`, marking abstract categories when asked.
    pub fn to_tree_string(&self, id: NodeId, mark_abstract: bool) -> DomainResult<Tree<String>> {
        let node = self.node_ref(id)?;
        Ok(build_tree(node, mark_abstract))
    }
}

fn label(node: NodeRef<'_>, mark_abstract: bool) -> String {
    if mark_abstract && node.is_abstract() {
        format!("{} (abstract)", node.name())
    } else {
        node.name().to_string()
    }
}

fn build_tree(node: NodeRef<'_>, mark_abstract: bool) -> Tree<String> {
    let leaves: Vec<_> = node
        .children()
        .map(|child| build_tree(child, mark_abstract))
        .collect();
    Tree::new(label(node, mark_abstract)).with_leaves(leaves)
}

impl<'a> NodeRef<'a> {
    pub fn descendants(&self, include_self: bool) -> Descendants<'a> {
        Descendants::new(*self, include_self)
    }

    pub fn ancestors(&self, ascending: bool, include_self: bool) -> DomainResult<Vec<NodeRef<'a>>> {
        let registry = self.registry();
        Ok(registry
            .ancestors(self.id(), ascending, include_self)?
            .into_iter()
            .filter_map(|id| registry.get(id))
            .collect())
    }

    pub fn family(&self) -> DomainResult<Vec<NodeRef<'a>>> {
        let registry = self.registry();
        Ok(registry
            .family(self.id())?
            .into_iter()
            .filter_map(|id| registry.get(id))
            .collect())
    }

    pub fn root(&self) -> DomainResult<NodeRef<'a>> {
        let registry = self.registry();
        registry.node_ref(registry.root(self.id())?)
    }
}
