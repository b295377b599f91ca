//! Result ordering, persisted overrides, and pagination.
//!
//! Display order is a two-layer merge: an explicit order list persisted on
//! the host document under `"<orderKey>Priority"` wins for the documents it
//! names (as long as they are still in the frontier), and a deterministic
//! fallback comparator orders everything else. `reorder` is the only place
//! this crate writes to a document.

use std::cmp::Ordering;

use crate::Result;
use crate::index::DocumentIndex;
use crate::model::{DocId, Document, MetaValue};
use crate::query::spec::{SortDirection, SortSpec, SortStrategy};

/// Page size used when the spec doesn't carry one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Metadata key holding the explicit order for a relation key.
pub fn priority_key(order_key: &str) -> String {
    format!("{order_key}Priority")
}

// ============================================================================
// Fallback comparator
// ============================================================================

/// Deterministic comparator applied to documents outside the explicit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackSort {
    /// Display name, case-insensitive, ascending. Ties break on identity
    /// so the order is total.
    ByName,
    /// A metadata property (dates, numbers, strings). Documents lacking
    /// the property sort last regardless of direction.
    ByProperty { property: String, direction: SortDirection },
}

impl FallbackSort {
    /// Derive the comparator from a spec's `sort` block. `manual` and
    /// anything underspecified fall back to name order.
    pub fn from_spec(sort: Option<&SortSpec>) -> FallbackSort {
        if let Some(spec) = sort {
            if spec.strategy == SortStrategy::Column {
                if let Some(column) = &spec.column {
                    return FallbackSort::ByProperty {
                        property: column.clone(),
                        direction: spec.direction.unwrap_or(SortDirection::Asc),
                    };
                }
            }
        }
        FallbackSort::ByName
    }

    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        match self {
            FallbackSort::ByName => name_cmp(a, b),
            FallbackSort::ByProperty { property, direction } => {
                let ord = match (a.get(property), b.get(property)) {
                    (Some(va), Some(vb)) => va.sort_cmp(vb).unwrap_or(Ordering::Equal),
                    // Missing property sorts last, independent of direction.
                    (Some(_), None) => return Ordering::Less,
                    (None, Some(_)) => return Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                let ord = match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                };
                ord.then_with(|| name_cmp(a, b))
            }
        }
    }
}

fn name_cmp(a: &Document, b: &Document) -> Ordering {
    a.display_name()
        .to_lowercase()
        .cmp(&b.display_name().to_lowercase())
        .then_with(|| a.id.as_str().cmp(b.id.as_str()))
}

// ============================================================================
// Ordering
// ============================================================================

/// Merge the persisted explicit order with the fallback comparator.
///
/// Identities named in the explicit list come first, in list order,
/// provided they are still in the frontier. Everything else follows,
/// sorted by `fallback`. Explicit entries pointing at departed documents
/// are skipped silently (they'll be dropped on the next reorder).
///
/// `order_key: None` skips the explicit-order merge entirely — column
/// sorts ignore any persisted priority list.
pub fn order<I>(
    index: &I,
    host: &Document,
    frontier: Vec<Document>,
    order_key: Option<&str>,
    fallback: &FallbackSort,
    page_size: usize,
) -> OrderedResultSet
where
    I: DocumentIndex + ?Sized,
{
    let explicit: Vec<DocId> = match order_key {
        Some(key) => {
            // Fresh metadata: the caller's host copy may predate a reorder.
            let metadata = index
                .read_metadata(&host.id)
                .unwrap_or_else(|| host.metadata.clone());
            metadata
                .get(priority_key(key).as_str())
                .map(|v| {
                    v.as_slice()
                        .iter()
                        .filter_map(|item| item.as_str().map(DocId::from))
                        .collect()
                })
                .unwrap_or_default()
        }
        None => Vec::new(),
    };

    let mut remaining = frontier;
    let mut ordered = Vec::with_capacity(remaining.len());
    for id in &explicit {
        if let Some(pos) = remaining.iter().position(|d| d.id == *id) {
            ordered.push(remaining.remove(pos));
        }
    }

    remaining.sort_by(|a, b| fallback.compare(a, b));
    ordered.extend(remaining);

    OrderedResultSet::new(ordered, page_size)
}

/// Persist a new explicit order onto the host document.
///
/// An empty order deletes the key instead of storing an empty list.
/// Concurrent reorders race; the last `mutate_metadata` wins.
pub async fn reorder<I>(
    index: &I,
    host: &DocId,
    order_key: &str,
    new_order: &[DocId],
) -> Result<()>
where
    I: DocumentIndex + ?Sized,
{
    let key = priority_key(order_key);
    let ids: Vec<MetaValue> = new_order
        .iter()
        .map(|d| MetaValue::from(d.as_str()))
        .collect();

    index
        .mutate_metadata(
            host,
            Box::new(move |meta| {
                if ids.is_empty() {
                    meta.shift_remove(&key);
                } else {
                    meta.insert(key, MetaValue::List(ids));
                }
            }),
        )
        .await
}

// ============================================================================
// OrderedResultSet
// ============================================================================

/// The final display list with incremental disclosure.
///
/// `visible_count` only ever grows (`load_more`), and clamps to the total
/// length. A page size of zero disables pagination.
#[derive(Debug, Clone)]
pub struct OrderedResultSet {
    docs: Vec<Document>,
    page_size: usize,
    visible_count: usize,
}

impl OrderedResultSet {
    pub fn new(docs: Vec<Document>, page_size: usize) -> Self {
        let visible_count = if page_size == 0 { docs.len() } else { page_size.min(docs.len()) };
        Self { docs, page_size, visible_count }
    }

    /// The currently disclosed page(s).
    pub fn visible(&self) -> &[Document] {
        &self.docs[..self.visible_count]
    }

    /// The full ordered list, ignoring pagination.
    pub fn all(&self) -> &[Document] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn has_more(&self) -> bool {
        self.visible_count < self.docs.len()
    }

    /// Disclose one more page. Monotonic: never shrinks, clamps to total.
    pub fn load_more(&mut self) {
        if self.page_size > 0 {
            self.visible_count = (self.visible_count + self.page_size).min(self.docs.len());
        }
    }

    pub fn into_inner(self) -> Vec<Document> {
        self.docs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;
    use crate::model::DocType;

    fn doc(path: &str, name: &str) -> Document {
        Document::new(path, DocType::Person).with_property("name", name)
    }

    #[test]
    fn test_priority_key() {
        assert_eq!(priority_key("members"), "membersPriority");
    }

    #[test]
    fn test_by_name_case_insensitive() {
        let a = doc("a.md", "beta");
        let b = doc("b.md", "Alpha");
        assert_eq!(FallbackSort::ByName.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_by_property_missing_sorts_last() {
        let sort = FallbackSort::ByProperty {
            property: "date".into(),
            direction: SortDirection::Desc,
        };
        let dated = doc("a.md", "A").with_property("date", "2025-01-01");
        let undated = doc("b.md", "B");

        assert_eq!(sort.compare(&dated, &undated), Ordering::Less);
        assert_eq!(sort.compare(&undated, &dated), Ordering::Greater);
    }

    #[test]
    fn test_by_property_desc() {
        let sort = FallbackSort::ByProperty {
            property: "date".into(),
            direction: SortDirection::Desc,
        };
        let older = doc("a.md", "A").with_property("date", "2024-06-01");
        let newer = doc("b.md", "B").with_property("date", "2025-06-01");

        assert_eq!(sort.compare(&newer, &older), Ordering::Less);
    }

    #[test]
    fn test_explicit_order_first() {
        let index = MemoryIndex::new();
        let host = Document::new("teams/Core.md", DocType::Team).with_property(
            "membersPriority",
            MetaValue::from(vec!["b.md", "a.md"]),
        );
        index.insert(host.clone());

        let frontier = vec![doc("a.md", "A"), doc("b.md", "B"), doc("c.md", "C")];
        let result = order(&index, &host, frontier, Some("members"), &FallbackSort::ByName, 0);

        let ids: Vec<&str> = result.all().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b.md", "a.md", "c.md"]);
    }

    #[test]
    fn test_no_order_key_ignores_priority_list() {
        let index = MemoryIndex::new();
        let host = Document::new("teams/Core.md", DocType::Team).with_property(
            "membersPriority",
            MetaValue::from(vec!["b.md", "a.md"]),
        );
        index.insert(host.clone());

        let frontier = vec![doc("a.md", "A"), doc("b.md", "B")];
        let result = order(&index, &host, frontier, None, &FallbackSort::ByName, 0);

        let ids: Vec<&str> = result.all().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_explicit_entry_missing_from_frontier_skipped() {
        let index = MemoryIndex::new();
        let host = Document::new("teams/Core.md", DocType::Team).with_property(
            "membersPriority",
            MetaValue::from(vec!["gone.md", "b.md"]),
        );
        index.insert(host.clone());

        let frontier = vec![doc("a.md", "A"), doc("b.md", "B")];
        let result = order(&index, &host, frontier, Some("members"), &FallbackSort::ByName, 0);

        let ids: Vec<&str> = result.all().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b.md", "a.md"]);
    }

    #[test]
    fn test_pagination_monotonic_and_clamped() {
        let docs: Vec<Document> = (0..5).map(|i| doc(&format!("{i}.md"), "x")).collect();
        let mut set = OrderedResultSet::new(docs, 2);

        assert_eq!(set.visible_count(), 2);
        assert!(set.has_more());
        set.load_more();
        assert_eq!(set.visible_count(), 4);
        set.load_more();
        assert_eq!(set.visible_count(), 5);
        assert!(!set.has_more());
        set.load_more();
        assert_eq!(set.visible_count(), 5);
    }

    #[test]
    fn test_zero_page_size_shows_all() {
        let docs: Vec<Document> = (0..3).map(|i| doc(&format!("{i}.md"), "x")).collect();
        let set = OrderedResultSet::new(docs, 0);
        assert_eq!(set.visible().len(), 3);
        assert!(!set.has_more());
    }

    #[tokio::test]
    async fn test_reorder_persists_and_empty_deletes() {
        let index = MemoryIndex::new();
        let host_id = DocId::new("teams/Core.md");
        index.insert(Document::new("teams/Core.md", DocType::Team));

        reorder(&index, &host_id, "members", &[DocId::new("b.md"), DocId::new("a.md")])
            .await
            .unwrap();

        let meta = index.read_metadata(&host_id).unwrap();
        assert_eq!(
            meta.get("membersPriority"),
            Some(&MetaValue::from(vec!["b.md", "a.md"]))
        );

        reorder(&index, &host_id, "members", &[]).await.unwrap();
        assert!(index.read_metadata(&host_id).unwrap().get("membersPriority").is_none());
    }
}
