//! # Relationship Query Language
//!
//! A declarative spec (`RelationSpec`) describes how to compute the set of
//! documents related to a host: either a flat property shorthand
//! (`{targetType, properties}`) or a full `find` query — ordered
//! alternatives, each a sequence of traversal steps, merged with a
//! set-combination strategy.
//!
//! `spec` holds the wire format (serde, tolerant of unknown keys and
//! malformed steps); `engine` executes it against a `DocumentIndex`.

pub mod engine;
pub mod spec;

pub use engine::run;
pub use spec::{
    Combine, FindSpec, QueryAlternative, RelationSpec, SortDirection, SortSpec, SortStrategy,
    Step,
};
