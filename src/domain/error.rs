//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid lookups, links or values on a category tree.
/// All of them are reported synchronously to the caller and never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("'{name}' is not a valid option for '{owner}'. Try [{}]", .choices.join(", "))]
    DoesNotExist {
        name: String,
        owner: String,
        choices: Vec<String>,
    },

    #[error("'{node}' has multiple owners [{}], pick one explicitly", .owners.join(", "))]
    MultipleOwners { node: String, owners: Vec<String> },

    #[error(
        "unable to add related categories to '{item}' attribute '{attribute}': it would override the value '{existing}'"
    )]
    UnableToLink {
        item: String,
        attribute: String,
        existing: String,
    },

    #[error("only categories with at least one common owner can be compared: '{left}' and '{right}'")]
    NoCommonOwner { left: String, right: String },

    #[error("duplicate child '{name}' under '{owner}'")]
    DuplicateChild { owner: String, name: String },

    #[error("unknown item class: {0}")]
    UnknownItem(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Result type for registry operations.
pub type DomainResult<T> = Result<T, DomainError>;
