//! # docgraph-rs — Relationship Query & Resolution Engine
//!
//! Computes "related documents" for a personal knowledge base in which
//! entities (people, companies, teams, projects, meetings, tasks, facts,
//! logs) are individual documents joined by typed references in their
//! structured metadata blocks. There is no persistent graph database —
//! relationships are resolved on demand from metadata.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `DocumentIndex` is the contract between the engine
//!    and whatever owns the documents
//! 2. **Clean DTOs**: `Document`, `MetaValue`, `DocId` cross all boundaries
//! 3. **Specs own nothing**: a `RelationSpec` is pure declarative data
//! 4. **Degrade, don't abort**: unresolved links, malformed steps, and
//!    vanished hosts produce smaller results, never panics
//!
//! ## Quick Start
//!
//! ```rust
//! use docgraph_rs::{DocType, Document, Engine, MemoryIndex, SpecRegistry};
//!
//! # fn example() -> docgraph_rs::Result<()> {
//! let index = MemoryIndex::new();
//! index.insert(Document::new("companies/Acme.md", DocType::Company));
//! index.insert(
//!     Document::new("people/Ada.md", DocType::Person)
//!         .with_property("company", "[[Acme]]"),
//! );
//!
//! let mut registry = SpecRegistry::new();
//! registry.register_json(
//!     DocType::Company,
//!     "employees",
//!     r#"{"targetType": "person", "properties": "company"}"#,
//! )?;
//!
//! let engine = Engine::new(index, registry);
//! let related = engine.related("companies/Acme.md", "employees")?;
//! for doc in related.visible() {
//!     println!("{}", doc.display_name());
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Query language
//!
//! A relation is either a flat shorthand (`{targetType, properties}`,
//! meaning "documents of that type whose properties reference the host")
//! or a `find` query: ordered alternatives of `out`/`in`/`notIn`/`filter`/
//! `dedupe`/`notHost` steps, combined by `union`, `intersect`, or
//! `subtract`.

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod link;
pub mod matcher;
pub mod query;
pub mod order;
pub mod index;
pub mod registry;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{DocId, DocType, Document, MetaValue, Metadata};

// ============================================================================
// Re-exports: Index
// ============================================================================

pub use index::{
    ChangeEvent, DocumentIndex, MemoryIndex, MetadataMutator, Observer, SubscriptionId,
};

// ============================================================================
// Re-exports: Query & Ordering
// ============================================================================

pub use link::{LinkRef, LinkTarget};
pub use query::{Combine, FindSpec, RelationSpec, SortSpec, Step};
pub use order::{FallbackSort, OrderedResultSet, DEFAULT_PAGE_SIZE};
pub use registry::SpecRegistry;

// ============================================================================
// Top-level Engine handle
// ============================================================================

/// The primary entry point. An `Engine` wraps a document index and a spec
/// registry, and computes ordered relationship panels.
///
/// The engine is stateless between calls: `related` is a pure computation
/// over the index's cached view, so concurrent calls against different
/// hosts share nothing mutable.
pub struct Engine<I: DocumentIndex> {
    index: I,
    registry: SpecRegistry,
}

impl<I: DocumentIndex> Engine<I> {
    pub fn new(index: I, registry: SpecRegistry) -> Self {
        Self { index, registry }
    }

    /// Compute the ordered, paginated set of documents related to the host
    /// through the registered relation.
    ///
    /// Errors only for consumer mistakes: an unknown host path or a
    /// relation with no registered spec. Everything recoverable inside the
    /// query degrades to a smaller (possibly empty) result set.
    pub fn related(&self, host_path: &str, relation_key: &str) -> Result<OrderedResultSet> {
        let host = self
            .index
            .get_by_path(host_path)
            .ok_or_else(|| Error::NotFound(host_path.to_owned()))?;
        let spec = self
            .registry
            .get(host.doc_type, relation_key)
            .ok_or_else(|| Error::UnsupportedRelation {
                doc_type: host.doc_type,
                relation: relation_key.to_owned(),
            })?;

        let frontier = query::run(&self.index, &host, spec);
        let fallback = FallbackSort::from_spec(spec.sort.as_ref());
        let page_size = spec.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        // Column sorts are pure comparator sorts; only the manual strategy
        // merges the persisted "<key>Priority" list.
        let merge_key = match spec.sort.as_ref().map(|s| s.strategy) {
            Some(query::SortStrategy::Column) => None,
            _ => Some(relation_key),
        };

        Ok(order::order(&self.index, &host, frontier, merge_key, &fallback, page_size))
    }

    /// Run an ad-hoc spec against a host, bypassing the registry.
    pub fn run_spec(&self, host: &Document, spec: &RelationSpec) -> Vec<Document> {
        query::run(&self.index, host, spec)
    }

    /// Persist a manual reorder of a relation panel onto the host.
    pub async fn reorder(
        &self,
        host_path: &str,
        relation_key: &str,
        new_order: &[DocId],
    ) -> Result<()> {
        order::reorder(&self.index, &DocId::new(host_path), relation_key, new_order).await
    }

    /// Register a change observer on the underlying index. Consumers
    /// typically re-run `related` on each notification.
    pub fn subscribe(&self, observer: Observer) -> SubscriptionId {
        self.index.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.index.unsubscribe(id)
    }

    /// Access the underlying index (for advanced use).
    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn registry(&self) -> &SpecRegistry {
        &self.registry
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The consumer asked for a relation no spec is registered for. This
    /// is surfaced, not swallowed — a panel must know it is unsupported.
    #[error("no relationship spec for relation '{relation}' on {doc_type} documents")]
    UnsupportedRelation { doc_type: DocType, relation: String },

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("index error: {0}")]
    IndexError(String),

    #[error("spec error: {0}")]
    SpecError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
