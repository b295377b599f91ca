//! # Document Model
//!
//! Clean DTOs for the knowledge-base document graph.
//! These types cross every boundary: index ↔ matcher ↔ query ↔ ordering ↔ user.
//!
//! Design rule: NO index types, NO query types here.
//! This module is pure data — no I/O, no state, no async.

pub mod document;
pub mod metadata;
pub mod value;

pub use document::{DocId, DocType, Document};
pub use metadata::{Metadata, collect_values};
pub use value::MetaValue;
