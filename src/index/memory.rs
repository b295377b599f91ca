//! In-memory document index.
//!
//! This is the reference implementation of `DocumentIndex`.
//! It uses hashbrown maps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No persistence**: documents live only as long as the process.
//! - **Last write wins**: `mutate_metadata` takes a write lock per call;
//!   concurrent reorders against the same document race without detection.
//! - **One document per base name**: the link index keys on lowercase file
//!   stems, so a later insert with the same stem shadows an earlier one.
//!
//! Use this index for:
//! - Testing the matcher, query engine, and ordering against synthetic vaults
//! - Embedding the engine in applications that keep documents in memory

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use parking_lot::RwLock;
use async_trait::async_trait;

use crate::model::{DocId, DocType, Document, Metadata};
use crate::{Error, Result};
use super::{ChangeEvent, DocumentIndex, MetadataMutator, Observer, SubscriptionId};

// ============================================================================
// MemoryIndex
// ============================================================================

/// In-memory document index with change notifications.
#[derive(Clone)]
pub struct MemoryIndex {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    docs: RwLock<HashMap<DocId, Document>>,
    /// entity kind → document ids (poor man's type index)
    type_index: RwLock<HashMap<DocType, Vec<DocId>>>,
    /// lowercase file stem → document id
    link_index: RwLock<HashMap<String, DocId>>,
    observers: RwLock<HashMap<u64, Arc<dyn Fn(&ChangeEvent) + Send + Sync>>>,
    next_sub_id: AtomicU64,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                docs: RwLock::new(HashMap::new()),
                type_index: RwLock::new(HashMap::new()),
                link_index: RwLock::new(HashMap::new()),
                observers: RwLock::new(HashMap::new()),
                next_sub_id: AtomicU64::new(1),
            }),
        }
    }

    /// Insert or replace a document, updating the type and link indexes.
    pub fn insert(&self, doc: Document) {
        let id = doc.id.clone();
        let previous = {
            let mut docs = self.inner.docs.write();
            docs.insert(id.clone(), doc.clone())
        };

        {
            let mut types = self.inner.type_index.write();
            if let Some(prev) = &previous {
                if prev.doc_type != doc.doc_type {
                    if let Some(ids) = types.get_mut(&prev.doc_type) {
                        ids.retain(|d| *d != id);
                    }
                }
            }
            let ids = types.entry(doc.doc_type).or_default();
            if !ids.contains(&id) {
                ids.push(id.clone());
            }
        }

        self.inner
            .link_index
            .write()
            .insert(id.stem().to_lowercase(), id.clone());

        let event = if previous.is_some() {
            ChangeEvent::Updated(id)
        } else {
            ChangeEvent::Inserted(id)
        };
        self.notify(&event);
    }

    /// Remove a document by path. Returns true if it existed.
    pub fn remove(&self, path: &str) -> bool {
        let id = DocId::new(path);
        let removed = self.inner.docs.write().remove(&id);

        if let Some(doc) = &removed {
            {
                let mut types = self.inner.type_index.write();
                if let Some(ids) = types.get_mut(&doc.doc_type) {
                    ids.retain(|d| *d != id);
                }
            }
            {
                let mut links = self.inner.link_index.write();
                let key = id.stem().to_lowercase();
                if links.get(&key) == Some(&id) {
                    links.remove(&key);
                }
            }
            self.notify(&ChangeEvent::Removed(id));
        }

        removed.is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.docs.read().is_empty()
    }

    fn notify(&self, event: &ChangeEvent) {
        // Snapshot the callbacks so observers can subscribe/unsubscribe
        // re-entrantly without deadlocking on the observers lock.
        let observers: Vec<_> = self.inner.observers.read().values().cloned().collect();
        for observer in observers {
            observer(event);
        }
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a link target relative to the directory containing `from_path`.
/// `"people/Ada.md"` + `"../companies/Acme"` → `"companies/Acme.md"`.
fn resolve_relative(from_path: &str, target: &str) -> String {
    let dir = from_path.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();

    for part in target.split('/') {
        match part {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            other => segments.push(other),
        }
    }

    let mut path = segments.join("/");
    if !path.ends_with(".md") {
        path.push_str(".md");
    }
    path
}

// ============================================================================
// DocumentIndex impl
// ============================================================================

#[async_trait]
impl DocumentIndex for MemoryIndex {
    fn list_by_type(&self, doc_type: DocType) -> Vec<Document> {
        let types = self.inner.type_index.read();
        let docs = self.inner.docs.read();

        let ids = types.get(&doc_type).cloned().unwrap_or_default();
        ids.iter().filter_map(|id| docs.get(id).cloned()).collect()
    }

    fn get_by_path(&self, path: &str) -> Option<Document> {
        self.inner.docs.read().get(&DocId::new(path)).cloned()
    }

    fn resolve_link(&self, text: &str, from_path: &str) -> Option<Document> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let docs = self.inner.docs.read();

        if let Some(doc) = docs.get(&DocId::new(text)) {
            return Some(doc.clone());
        }
        if let Some(doc) = docs.get(&DocId::new(format!("{text}.md"))) {
            return Some(doc.clone());
        }
        if let Some(doc) = docs.get(&DocId::new(resolve_relative(from_path, text))) {
            return Some(doc.clone());
        }

        // Last resort: case-insensitive base-name lookup.
        let stem = text.rsplit('/').next().unwrap_or(text);
        let stem = stem.strip_suffix(".md").unwrap_or(stem);
        let links = self.inner.link_index.read();
        links
            .get(&stem.to_lowercase())
            .and_then(|id| docs.get(id).cloned())
    }

    fn read_metadata(&self, id: &DocId) -> Option<Metadata> {
        self.inner.docs.read().get(id).map(|d| d.metadata.clone())
    }

    async fn mutate_metadata(&self, id: &DocId, mutate: MetadataMutator) -> Result<()> {
        {
            let mut docs = self.inner.docs.write();
            let doc = docs
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            mutate(&mut doc.metadata);
        }
        self.notify(&ChangeEvent::Updated(id.clone()));
        Ok(())
    }

    fn subscribe(&self, observer: Observer) -> SubscriptionId {
        let id = self.inner.next_sub_id.fetch_add(1, Ordering::Relaxed);
        self.inner.observers.write().insert(id, Arc::from(observer));
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.observers.write().remove(&id.0);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetaValue;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_insert_and_get() {
        let index = MemoryIndex::new();
        index.insert(Document::new("people/Ada.md", DocType::Person));

        let doc = index.get_by_path("people/Ada.md").unwrap();
        assert_eq!(doc.doc_type, DocType::Person);
    }

    #[test]
    fn test_list_by_type() {
        let index = MemoryIndex::new();
        index.insert(Document::new("people/Ada.md", DocType::Person));
        index.insert(Document::new("companies/Acme.md", DocType::Company));
        index.insert(Document::new("people/Grace.md", DocType::Person));

        assert_eq!(index.list_by_type(DocType::Person).len(), 2);
        assert_eq!(index.list_by_type(DocType::Company).len(), 1);
        assert!(index.list_by_type(DocType::Task).is_empty());
    }

    #[test]
    fn test_reinsert_changes_type() {
        let index = MemoryIndex::new();
        index.insert(Document::new("X.md", DocType::Task));
        index.insert(Document::new("X.md", DocType::Log));

        assert!(index.list_by_type(DocType::Task).is_empty());
        assert_eq!(index.list_by_type(DocType::Log).len(), 1);
    }

    #[test]
    fn test_resolve_link_variants() {
        let index = MemoryIndex::new();
        index.insert(Document::new("companies/Acme.md", DocType::Company));

        // exact path, path without extension, bare stem, wrong case
        assert!(index.resolve_link("companies/Acme.md", "").is_some());
        assert!(index.resolve_link("companies/Acme", "").is_some());
        assert!(index.resolve_link("Acme", "people/Ada.md").is_some());
        assert!(index.resolve_link("acme", "people/Ada.md").is_some());
        assert!(index.resolve_link("Globex", "people/Ada.md").is_none());
    }

    #[test]
    fn test_resolve_link_relative() {
        let index = MemoryIndex::new();
        index.insert(Document::new("companies/Acme.md", DocType::Company));

        let doc = index.resolve_link("../companies/Acme", "people/Ada.md").unwrap();
        assert_eq!(doc.id.as_str(), "companies/Acme.md");
    }

    #[test]
    fn test_remove_clears_indexes() {
        let index = MemoryIndex::new();
        index.insert(Document::new("people/Ada.md", DocType::Person));

        assert!(index.remove("people/Ada.md"));
        assert!(index.get_by_path("people/Ada.md").is_none());
        assert!(index.list_by_type(DocType::Person).is_empty());
        assert!(index.resolve_link("Ada", "").is_none());
        assert!(!index.remove("people/Ada.md"));
    }

    #[tokio::test]
    async fn test_mutate_metadata() {
        let index = MemoryIndex::new();
        index.insert(Document::new("people/Ada.md", DocType::Person));

        let id = DocId::new("people/Ada.md");
        index
            .mutate_metadata(&id, Box::new(|meta| {
                meta.insert("name".into(), MetaValue::from("Ada Lovelace"));
            }))
            .await
            .unwrap();

        let meta = index.read_metadata(&id).unwrap();
        assert_eq!(meta.get("name").and_then(MetaValue::as_str), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_mutate_missing_document_fails() {
        let index = MemoryIndex::new();
        let result = index
            .mutate_metadata(&DocId::new("ghost.md"), Box::new(|_| {}))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_observer_may_resubscribe_reentrantly() {
        let index = MemoryIndex::new();
        let handle = index.clone();
        index.subscribe(Box::new(move |_| {
            let sub = handle.subscribe(Box::new(|_| {}));
            handle.unsubscribe(sub);
        }));

        // Hangs instead of returning if notify holds the observers lock
        // across the callback.
        index.insert(Document::new("A.md", DocType::Fact));
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let index = MemoryIndex::new();
        let count = Arc::new(AtomicUsize::new(0));

        let seen = count.clone();
        let sub = index.subscribe(Box::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        index.insert(Document::new("A.md", DocType::Fact));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        index.unsubscribe(sub);
        index.insert(Document::new("B.md", DocType::Fact));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
