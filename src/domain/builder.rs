//! Declarative construction of category trees.
//!
//! A [`Definition`] is an ordered list of entries; [`Registry::define`] turns
//! it into nodes, registering every category entry as a child of the
//! enclosing definition.

use std::collections::HashSet;

use tracing::{debug, instrument, trace};

use crate::domain::arena::{AttrValue, CategoryNode, ItemId, NodeId, Registry};
use crate::domain::error::{DomainError, DomainResult};

/// One entry of a definition body, in declaration order.
#[derive(Debug, Clone)]
pub enum Entry {
    /// A sub-tree defined in place
    Nested(Definition),
    /// An already defined node, attached as an additional child
    Child(NodeId),
    /// A non-category value kept on the node
    Attribute { name: String, value: String },
}

/// Declarative description of one category and its body.
#[derive(Debug, Clone)]
pub struct Definition {
    pub name: String,
    pub is_abstract: Option<bool>,
    pub item_class: Option<ItemId>,
    pub related_name: Option<String>,
    pub item: Option<ItemId>,
    pub entries: Vec<Entry>,
}

impl Definition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: None,
            item_class: None,
            related_name: None,
            item: None,
            entries: Vec::new(),
        }
    }

    pub fn set_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = Some(is_abstract);
        self
    }

    pub fn item_class(mut self, item_class: ItemId) -> Self {
        self.item_class = Some(item_class);
        self
    }

    pub fn related_name(mut self, related_name: impl Into<String>) -> Self {
        self.related_name = Some(related_name.into());
        self
    }

    pub fn item(mut self, item: ItemId) -> Self {
        self.item = Some(item);
        self
    }

    pub fn nested(mut self, definition: Definition) -> Self {
        self.entries.push(Entry::Nested(definition));
        self
    }

    /// Childless nested category.
    pub fn leaf(self, name: impl Into<String>) -> Self {
        self.nested(Definition::new(name))
    }

    pub fn child(mut self, id: NodeId) -> Self {
        self.entries.push(Entry::Child(id));
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push(Entry::Attribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// Name and designated item of a category entry, known before it is committed.
struct EntryShape {
    name: String,
    item: Option<ItemId>,
}

impl Registry {
    /// Define a category tree.
    ///
    /// The whole definition is validated before the first node is inserted,
    /// so a failed call leaves the registry unchanged.
    #[instrument(level = "debug", skip(self, definition), fields(name = %definition.name))]
    pub fn define(&mut self, definition: Definition) -> DomainResult<NodeId> {
        self.validate(&definition)?;
        let id = self.commit(definition);
        debug!("defined {} ({} nodes)", self.nodes[id.0].name, self.nodes.len());
        Ok(id)
    }

    /// Define a category without children.
    pub fn leaf(&mut self, name: &str) -> DomainResult<NodeId> {
        self.define(Definition::new(name))
    }

    fn entry_shape(&self, entry: &Entry) -> DomainResult<Option<EntryShape>> {
        match entry {
            Entry::Nested(def) => Ok(Some(EntryShape {
                name: def.name.clone(),
                item: def.item,
            })),
            Entry::Child(id) => {
                let node = self.node(*id)?;
                Ok(Some(EntryShape {
                    name: node.name.clone(),
                    item: node.item,
                }))
            }
            Entry::Attribute { .. } => Ok(None),
        }
    }

    fn accepts(&self, item_class: Option<ItemId>, item: Option<ItemId>) -> bool {
        match (item_class, item) {
            (None, _) => true,
            (Some(class), Some(item)) => self.is_subclass(item, class),
            (Some(_), None) => false,
        }
    }

    fn validate(&self, def: &Definition) -> DomainResult<()> {
        if def.name.trim().is_empty() {
            return Err(DomainError::InvalidValue("category name must not be empty".into()));
        }
        for item in [def.item_class, def.item].into_iter().flatten() {
            self.item(item)?;
        }

        let mut seen = HashSet::new();
        for entry in &def.entries {
            if let Entry::Nested(nested) = entry {
                self.validate(nested)?;
            }
            let Some(shape) = self.entry_shape(entry)? else {
                continue;
            };

            if let (Some(related_name), Some(item)) = (&def.related_name, shape.item) {
                if let Some((owner, AttrValue::Plain(existing))) = self.item_attribute(item, related_name) {
                    return Err(DomainError::UnableToLink {
                        item: self.item(owner)?.name.clone(),
                        attribute: related_name.clone(),
                        existing: existing.clone(),
                    });
                }
            }

            if self.accepts(def.item_class, shape.item) && !seen.insert(shape.name.clone()) {
                return Err(DomainError::DuplicateChild {
                    owner: def.name.clone(),
                    name: shape.name,
                });
            }
        }
        Ok(())
    }

    fn commit(&mut self, def: Definition) -> NodeId {
        let mut node = CategoryNode::new(def.name);
        node.is_abstract = def.is_abstract.unwrap_or(false);
        node.item_class = def.item_class;
        node.related_name = def.related_name;
        node.item = def.item;

        // Sub-trees are complete before their owner exists.
        let mut members = Vec::new();
        for entry in def.entries {
            match entry {
                Entry::Nested(nested) => members.push(self.commit(nested)),
                Entry::Child(id) => members.push(id),
                Entry::Attribute { name, value } => {
                    node.attributes.insert(name, value);
                }
            }
        }

        let item_class = node.item_class;
        let related_name = node.related_name.clone();
        let owner = NodeId(self.nodes.insert(node));

        let children: Vec<NodeId> = members
            .iter()
            .copied()
            .filter(|m| self.accepts(item_class, self.nodes[m.0].item))
            .collect();

        for (index, &child) in children.iter().enumerate() {
            let child_node = &mut self.nodes[child.0];
            if child_node.parent.is_none() {
                child_node.parent = Some(owner);
            }
            if !child_node.parents.contains(&owner) {
                child_node.parents.push(owner);
            }
            child_node.parent_index.insert(owner, index);
            trace!("registered child {} at {}", child_node.name, index);
        }
        self.nodes[owner.0].children = children;

        // Structure is consistent here; related links only touch item classes.
        if let Some(related_name) = related_name {
            for member in members {
                if let Some(item) = self.nodes[member.0].item {
                    self.link_related(item, &related_name, owner);
                }
            }
        }
        owner
    }

    /// Add `owner` to the related set visible from `item`.
    ///
    /// A set inherited from a base class is extended in place, so every
    /// subclass sharing it sees the new owner.
    fn link_related(&mut self, item: ItemId, related_name: &str, owner: NodeId) {
        let holder = match self.item_attribute(item, related_name) {
            Some((holder, AttrValue::Related(_))) => holder,
            _ => item,
        };
        if let Some(class) = self.items.get_mut(holder.0) {
            let value = class
                .attributes
                .entry(related_name.to_string())
                .or_insert_with(|| AttrValue::Related(Default::default()));
            if let AttrValue::Related(links) = value {
                links.add(owner);
                debug!("linked {:?} onto {}.{}", owner, class.name, related_name);
            }
        }
    }
}
