//! # Document Type Index Trait
//!
//! This is THE contract between the relationship engine and whatever owns
//! the documents. Traversal never scans storage directly — everything goes
//! through this seam.
//!
//! ## Implementations
//!
//! | Index | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryIndex` | `memory` | In-memory for testing/embedding |
//!
//! Reads are synchronous: the index is expected to serve from an
//! already-cached view of the vault (no I/O during traversal). The single
//! async operation is `mutate_metadata`, the atomic read-modify-write used
//! to persist explicit order lists.

pub mod memory;

use async_trait::async_trait;

use crate::Result;
use crate::model::{DocId, DocType, Document, Metadata};

pub use memory::MemoryIndex;

// ============================================================================
// Change notifications
// ============================================================================

/// Emitted by the index when a document changes. Consumers typically
/// respond by re-running their relationship query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Inserted(DocId),
    Updated(DocId),
    Removed(DocId),
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Change observer callback.
pub type Observer = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Closure applied to a document's metadata under `mutate_metadata`. The
/// explicit binder keeps the borrow higher-ranked instead of letting it be
/// captured by the async-trait future's lifetimes.
pub type MetadataMutator = Box<dyn for<'a> FnOnce(&'a mut Metadata) + Send>;

// ============================================================================
// DocumentIndex Trait
// ============================================================================

/// The universal index contract.
///
/// The engine only ever needs five lookups plus one mutation. Anything a
/// host application caches beyond this is its own business.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// All documents declaring the given entity kind.
    fn list_by_type(&self, doc_type: DocType) -> Vec<Document>;

    /// Look up a document by its exact path.
    fn get_by_path(&self, path: &str) -> Option<Document>;

    /// Resolve link text to a document, relative to the linking document's
    /// path. Handles bare names, relative paths, and case-insensitive
    /// base-name lookup. Returns None when nothing matches.
    fn resolve_link(&self, text: &str, from_path: &str) -> Option<Document>;

    /// Read a fresh copy of a document's metadata block.
    fn read_metadata(&self, id: &DocId) -> Option<Metadata>;

    /// Atomic read-modify-write on a document's metadata. The closure
    /// receives a mutable view and may add/remove/replace keys. Concurrent
    /// callers race; the last write wins.
    async fn mutate_metadata(&self, id: &DocId, mutate: MetadataMutator) -> Result<()>;

    /// Register a change observer. Fired after every insert/update/remove.
    fn subscribe(&self, observer: Observer) -> SubscriptionId;

    /// Remove a previously registered observer. Unknown ids are a no-op.
    fn unsubscribe(&self, id: SubscriptionId);
}
