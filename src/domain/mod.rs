//! Domain layer: category trees and their operations
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod descriptor;
pub mod error;
pub mod ordering;
pub mod serial;
pub mod traverse;

pub use arena::{AttrValue, CategoryNode, ItemClass, ItemId, NodeId, NodeRef, Registry, RelatedLinks};
pub use builder::{Definition, Entry};
pub use descriptor::{Descriptor, InstanceToken, Owner};
pub use error::{DomainError, DomainResult};
pub use serial::ScopedSeed;
pub use traverse::Descendants;
