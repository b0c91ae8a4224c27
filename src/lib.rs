//! Hierarchical enumerations.
//!
//! A category tree is declared once through [`domain::Definition`]s and
//! registered in a [`domain::Registry`]. Every nested definition becomes a
//! child of its enclosing definition; the registry then answers traversal
//! (`descendants`, `ancestors`, `family`, `root`), sibling ordering and
//! name lookups scoped to a sub-tree.
//!
//! ```
//! use fortnum::domain::{Definition, Registry};
//!
//! let mut registry = Registry::new();
//! let color = registry
//!     .define(Definition::new("Color").leaf("Red").leaf("Green").leaf("Blue"))
//!     .unwrap();
//! let red = registry.deserialize(color, "Red").unwrap();
//! let blue = registry.deserialize(color, "Blue").unwrap();
//! assert!(registry.lt(red, blue).unwrap());
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{Definition, Descriptor, DomainError, NodeId, NodeRef, Registry};
