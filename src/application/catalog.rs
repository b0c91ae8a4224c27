//! TOML catalogs of item classes and category trees.
//!
//! ```toml
//! [[items]]
//! name = "Vehicle"
//!
//! [[trees]]
//! name = "Color"
//! related_name = "colors"
//! children = [{ name = "Red", item = "Vehicle" }, { name = "Green" }, { ref = "Shared" }]
//! ```

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Definition, DomainError, ItemId, NodeId, NodeRef, Registry};

/// Separator of node paths such as `Color/Green/Lime`.
pub const PATH_SEPARATOR: char = '/';

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCatalog {
    pub items: Vec<RawItem>,
    pub trees: Vec<RawDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub name: String,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDefinition {
    pub name: String,
    #[serde(default, rename = "abstract")]
    pub is_abstract: Option<bool>,
    #[serde(default)]
    pub item_class: Option<String>,
    #[serde(default)]
    pub related_name: Option<String>,
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<RawEntry>,
}

/// A child entry: either a reference to an earlier top-level tree or an inline definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawEntry {
    Ref {
        #[serde(rename = "ref")]
        target: String,
    },
    Nested(RawDefinition),
}

/// A populated registry together with the names of its top-level trees and item classes.
#[derive(Debug, Default)]
pub struct Catalog {
    registry: Registry,
    trees: Vec<(String, NodeId)>,
    items: Vec<(String, ItemId)>,
}

impl Catalog {
    /// Parse a TOML catalog.
    ///
    /// `default_related_name` applies to every definition without its own
    /// `related_name`.
    pub fn from_toml(content: &str, default_related_name: Option<&str>) -> ApplicationResult<Self> {
        let raw: RawCatalog =
            toml::from_str(content).map_err(|e| ApplicationError::catalog(format!("parse: {}", e)))?;
        Self::from_raw(raw, default_related_name)
    }

    #[instrument(level = "debug", skip(raw))]
    pub fn from_raw(raw: RawCatalog, default_related_name: Option<&str>) -> ApplicationResult<Self> {
        let mut catalog = Self::default();

        for item in raw.items {
            if catalog.item(&item.name).is_some() {
                return Err(ApplicationError::catalog(format!("duplicate item '{}'", item.name)));
            }
            let base = item
                .base
                .as_deref()
                .map(|base| catalog.require_item(base))
                .transpose()?;
            let id = catalog.registry.define_item(&item.name, base)?;
            for (name, value) in &item.attributes {
                catalog.registry.set_item_attribute(id, name, value)?;
            }
            catalog.items.push((item.name, id));
        }

        for tree in raw.trees {
            if catalog.tree(&tree.name).is_some() {
                return Err(ApplicationError::catalog(format!("duplicate tree '{}'", tree.name)));
            }
            let name = tree.name.clone();
            let definition = catalog.to_definition(tree, default_related_name)?;
            let id = catalog.registry.define(definition)?;
            debug!("loaded tree {}", name);
            catalog.trees.push((name, id));
        }

        Ok(catalog)
    }

    fn to_definition(&self, raw: RawDefinition, default_related_name: Option<&str>) -> ApplicationResult<Definition> {
        let mut definition = Definition::new(raw.name);
        definition.is_abstract = raw.is_abstract;
        definition.item_class = raw
            .item_class
            .as_deref()
            .map(|name| self.require_item(name))
            .transpose()?;
        definition.item = raw.item.as_deref().map(|name| self.require_item(name)).transpose()?;
        definition.related_name = raw
            .related_name
            .or_else(|| default_related_name.map(str::to_string));

        for (name, value) in raw.attributes {
            definition = definition.attribute(name, value);
        }
        for entry in raw.children {
            definition = match entry {
                RawEntry::Ref { target } => {
                    let id = self.tree(&target).ok_or_else(|| {
                        ApplicationError::catalog(format!(
                            "unknown tree reference '{}', known trees: [{}]",
                            target,
                            self.tree_names().join(", ")
                        ))
                    })?;
                    definition.child(id)
                }
                RawEntry::Nested(nested) => definition.nested(self.to_definition(nested, default_related_name)?),
            };
        }
        Ok(definition)
    }

    fn require_item(&self, name: &str) -> ApplicationResult<ItemId> {
        self.item(name)
            .ok_or_else(|| ApplicationError::Domain(DomainError::UnknownItem(name.to_string())))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tree(&self, name: &str) -> Option<NodeId> {
        self.trees.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
    }

    pub fn trees(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.trees.iter().filter_map(|(_, id)| self.registry.get(*id))
    }

    pub fn tree_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.trees.iter().map(|(name, _)| name.as_str())
    }

    pub fn item(&self, name: &str) -> Option<ItemId> {
        self.items.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
    }

    /// Resolve `Tree/Child/Grandchild`: the first segment names a top-level
    /// tree, every further segment is looked up among the previous node's
    /// children.
    pub fn resolve(&self, path: &str) -> ApplicationResult<NodeRef<'_>> {
        let mut segments = path.split(PATH_SEPARATOR).filter(|s| !s.is_empty());
        let first = segments
            .next()
            .ok_or_else(|| ApplicationError::catalog(format!("empty category path '{}'", path)))?;
        let id = self.tree(first).ok_or_else(|| DomainError::DoesNotExist {
            name: first.to_string(),
            owner: "catalog".to_string(),
            choices: self.tree_names().map(str::to_string).collect(),
        })?;

        let mut current = self.registry.node_ref(id)?;
        for segment in segments {
            current = current.deserialize(segment)?;
        }
        Ok(current)
    }

    /// Related-link sets stored on an item class, per attribute.
    pub fn related(&self, item: &str) -> ApplicationResult<Vec<(String, Vec<NodeRef<'_>>)>> {
        let id = self.require_item(item)?;
        let class = self.registry.item(id)?;
        Ok(class
            .attributes
            .keys()
            .filter_map(|attr| {
                self.registry.related(id, attr).map(|links| {
                    let nodes = links.iter().filter_map(|n| self.registry.get(n)).collect();
                    (attr.clone(), nodes)
                })
            })
            .collect())
    }
}
