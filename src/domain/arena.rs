use std::collections::{BTreeMap, HashMap};
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// Handle of a category node inside a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

/// Handle of an external item class inside a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub(crate) Index);

/// One named option of a hierarchical enumeration.
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub name: String,
    /// Set only by the node's own definition, never inherited from owners
    pub is_abstract: bool,
    /// First owner that registered this node, None for roots
    pub parent: Option<NodeId>,
    /// Every owner in registration order, without duplicates
    pub parents: Vec<NodeId>,
    /// Rank of this node among each owner's children
    pub parent_index: HashMap<NodeId, usize>,
    /// Direct children in declaration order
    pub children: Vec<NodeId>,
    /// Constraint on children: only nodes whose item derives from it are registered
    pub item_class: Option<ItemId>,
    /// Attribute under which owners are linked back onto children's items
    pub related_name: Option<String>,
    /// Payload item class this node designates
    pub item: Option<ItemId>,
    /// Non-category entries of the definition
    pub attributes: BTreeMap<String, String>,
}

impl CategoryNode {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            is_abstract: false,
            parent: None,
            parents: Vec::new(),
            parent_index: HashMap::new(),
            children: Vec::new(),
            item_class: None,
            related_name: None,
            item: None,
            attributes: BTreeMap::new(),
        }
    }
}

/// Ordered, duplicate-free set of categories pointing at one item class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelatedLinks(Vec<NodeId>);

impl RelatedLinks {
    pub fn add(&mut self, id: NodeId) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }
}

/// Value stored in an item class attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Plain(String),
    Related(RelatedLinks),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Plain(value) => write!(f, "{}", value),
            AttrValue::Related(links) => write!(f, "<{} related>", links.len()),
        }
    }
}

/// External payload class that categories may designate.
#[derive(Debug, Clone)]
pub struct ItemClass {
    pub name: String,
    pub base: Option<ItemId>,
    pub attributes: BTreeMap<String, AttrValue>,
}

/// Arena holding every category node and item class of a set of trees.
///
/// Nodes are only ever added through [`Registry::define`]; once defined their
/// shape never changes, so handles stay valid for the registry's lifetime.
#[derive(Debug, Default)]
pub struct Registry {
    pub(crate) nodes: Arena<CategoryNode>,
    pub(crate) items: Arena<ItemClass>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of category nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Register an external item class, optionally deriving from `base`.
    #[instrument(level = "debug", skip(self))]
    pub fn define_item(&mut self, name: &str, base: Option<ItemId>) -> DomainResult<ItemId> {
        if let Some(base) = base {
            self.item(base)?;
        }
        let idx = self.items.insert(ItemClass {
            name: name.to_string(),
            base,
            attributes: BTreeMap::new(),
        });
        Ok(ItemId(idx))
    }

    /// Set a plain attribute on an item class.
    ///
    /// A related-link set already stored under `name` is never overwritten.
    pub fn set_item_attribute(&mut self, item: ItemId, name: &str, value: &str) -> DomainResult<()> {
        let class = self
            .items
            .get_mut(item.0)
            .ok_or_else(|| DomainError::UnknownItem(format!("{:?}", item)))?;
        if let Some(AttrValue::Related(_)) = class.attributes.get(name) {
            return Err(DomainError::InvalidValue(format!(
                "'{}' attribute '{}' holds related categories",
                class.name, name
            )));
        }
        class
            .attributes
            .insert(name.to_string(), AttrValue::Plain(value.to_string()));
        Ok(())
    }

    pub fn item(&self, id: ItemId) -> DomainResult<&ItemClass> {
        self.items
            .get(id.0)
            .ok_or_else(|| DomainError::UnknownItem(format!("{:?}", id)))
    }

    /// True if `item` is `of` or derives from it through `base` links.
    pub fn is_subclass(&self, item: ItemId, of: ItemId) -> bool {
        let mut current = Some(item);
        while let Some(id) = current {
            if id == of {
                return true;
            }
            current = self.items.get(id.0).and_then(|c| c.base);
        }
        false
    }

    /// Look up an attribute on an item class, falling back to its bases.
    pub fn item_attribute(&self, item: ItemId, name: &str) -> Option<(ItemId, &AttrValue)> {
        let mut current = Some(item);
        while let Some(id) = current {
            let class = self.items.get(id.0)?;
            if let Some(value) = class.attributes.get(name) {
                return Some((id, value));
            }
            current = class.base;
        }
        None
    }

    /// Categories linked onto `item` under the related attribute `name`,
    /// including a set inherited from a base class.
    pub fn related(&self, item: ItemId, name: &str) -> Option<&RelatedLinks> {
        match self.item_attribute(item, name)? {
            (_, AttrValue::Related(links)) => Some(links),
            _ => None,
        }
    }

    /// Raw node data.
    pub fn node(&self, id: NodeId) -> DomainResult<&CategoryNode> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| DomainError::InvalidValue(format!("{:?} is not a category of this registry", id)))
    }

    /// Validated handle to a node, None for stale or foreign ids.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.nodes.get(id.0).map(|node| NodeRef {
            registry: self,
            id,
            node,
        })
    }

    /// Like [`Registry::get`], failing with `InvalidValue` for unknown ids.
    pub fn node_ref(&self, id: NodeId) -> DomainResult<NodeRef<'_>> {
        self.node(id).map(|node| NodeRef {
            registry: self,
            id,
            node,
        })
    }

    pub fn name(&self, id: NodeId) -> DomainResult<&str> {
        Ok(&self.node(id)?.name)
    }

    /// All owners of a node in registration order.
    pub fn parents(&self, id: NodeId) -> DomainResult<&[NodeId]> {
        Ok(&self.node(id)?.parents)
    }

    /// The single owner of a node.
    ///
    /// Fails with `MultipleOwners` when the node was attached under more than
    /// one owner; callers then choose from [`Registry::parents`].
    pub fn parent(&self, id: NodeId) -> DomainResult<Option<NodeId>> {
        let node = self.node(id)?;
        match node.parents.len() {
            0 => Ok(None),
            1 => Ok(node.parent),
            _ => Err(DomainError::MultipleOwners {
                node: node.name.clone(),
                owners: self.names(&node.parents),
            }),
        }
    }

    /// Rank of `id` among the children of `owner`.
    pub fn parent_index(&self, id: NodeId, owner: NodeId) -> DomainResult<Option<usize>> {
        Ok(self.node(id)?.parent_index.get(&owner).copied())
    }

    /// Direct children in declaration order.
    pub fn children(&self, id: NodeId) -> DomainResult<impl Iterator<Item = NodeRef<'_>> + '_> {
        Ok(self.node_ref(id)?.children())
    }

    /// Direct child by name.
    pub fn child(&self, id: NodeId, name: &str) -> DomainResult<Option<NodeId>> {
        let node = self.node(id)?;
        Ok(node
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes.get(child.0).is_some_and(|c| c.name == name)))
    }

    pub fn child_count(&self, id: NodeId) -> DomainResult<usize> {
        Ok(self.node(id)?.children.len())
    }

    pub fn is_abstract(&self, id: NodeId) -> DomainResult<bool> {
        Ok(self.node(id)?.is_abstract)
    }

    /// `(value, label)` pairs of the direct children, as used for choice lists.
    pub fn choices(&self, id: NodeId) -> DomainResult<Vec<(String, String)>> {
        Ok(self
            .node_ref(id)?
            .children()
            .map(|c| (c.name().to_string(), c.name().to_string()))
            .collect())
    }

    pub(crate) fn names(&self, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.nodes.get(id.0))
            .map(|n| n.name.clone())
            .collect()
    }
}

/// Borrowed, validated view of one node.
///
/// A handle is always "present", even for nodes with zero children; the
/// child count is [`NodeRef::len`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) id: NodeId,
    pub(crate) node: &'a CategoryNode,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    pub fn data(&self) -> &'a CategoryNode {
        self.node
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn is_abstract(&self) -> bool {
        self.node.is_abstract
    }

    pub fn len(&self) -> usize {
        self.node.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.node.children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let registry = self.registry;
        self.node
            .children
            .iter()
            .filter_map(move |&child| registry.get(child))
    }

    pub fn child(&self, name: &str) -> Option<NodeRef<'a>> {
        self.children().find(|c| c.name() == name)
    }

    pub fn parents(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let registry = self.registry;
        self.node
            .parents
            .iter()
            .filter_map(move |&owner| registry.get(owner))
    }

    pub fn parent(&self) -> DomainResult<Option<NodeRef<'a>>> {
        Ok(self
            .registry
            .parent(self.id)?
            .and_then(|owner| self.registry.get(owner)))
    }

    pub fn parent_index(&self, owner: NodeId) -> Option<usize> {
        self.node.parent_index.get(&owner).copied()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.registry, other.registry) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node.name)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node.name)
    }
}

impl<'a> IntoIterator for NodeRef<'a> {
    type Item = NodeRef<'a>;
    type IntoIter = Box<dyn Iterator<Item = NodeRef<'a>> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.children())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_subclass_follows_base_chain() {
        let mut registry = Registry::new();
        let thing = registry.define_item("Thing", None).unwrap();
        let vehicle = registry.define_item("Vehicle", Some(thing)).unwrap();
        let car = registry.define_item("Car", Some(vehicle)).unwrap();

        assert!(registry.is_subclass(car, thing));
        assert!(registry.is_subclass(car, car));
        assert!(!registry.is_subclass(thing, car));
    }

    #[test]
    fn test_item_attribute_falls_back_to_base() {
        let mut registry = Registry::new();
        let thing = registry.define_item("Thing", None).unwrap();
        let car = registry.define_item("Car", Some(thing)).unwrap();
        registry.set_item_attribute(thing, "wheels", "4").unwrap();

        let (owner, value) = registry.item_attribute(car, "wheels").unwrap();
        assert_eq!(owner, thing);
        assert_eq!(value, &AttrValue::Plain("4".into()));
        assert!(registry.item_attribute(car, "doors").is_none());
    }

    #[test]
    fn test_related_links_deduplicate() {
        let mut registry = Registry::new();
        let a = registry.leaf("A").unwrap();
        let mut links = RelatedLinks::default();
        links.add(a);
        links.add(a);
        assert_eq!(links.len(), 1);
        assert!(links.contains(a));
    }
}
