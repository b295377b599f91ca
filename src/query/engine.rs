//! Query execution.
//!
//! Each alternative runs its step sequence against a working set seeded
//! with the host document; alternative results are then merged per the
//! spec's combine strategy. Everything here is a pure computation over the
//! index's cached view — re-entrant, no shared mutable state.
//!
//! Cost model: `In`/`NotIn` scan every document of the requested types and
//! test each against every working-set member, O(types × candidates ×
//! workingSet). Fine for vaults in the tens of thousands of documents and
//! step counts in the low single digits.

use hashbrown::HashSet;

use crate::index::DocumentIndex;
use crate::link::{LinkRef, LinkTarget};
use crate::matcher;
use crate::model::{DocId, DocType, Document, collect_values};
use super::spec::{Combine, QueryAlternative, RelationSpec, Step};

/// Execute a relationship spec for a host document.
///
/// An empty spec yields an empty result, not an error. If the host has
/// disappeared from the index, the result is empty as well — panels race
/// with deletions and must degrade quietly.
pub fn run<I>(index: &I, host: &Document, spec: &RelationSpec) -> Vec<Document>
where
    I: DocumentIndex + ?Sized,
{
    // Re-fetch the host so a stale caller copy doesn't traverse from a
    // deleted document.
    let Some(host) = index.get_by_path(host.id.as_str()) else {
        tracing::debug!(host = %host.id, "host vanished, returning empty result");
        return Vec::new();
    };

    let alternatives = spec.alternatives();
    if alternatives.is_empty() {
        return Vec::new();
    }

    let results: Vec<Vec<Document>> = alternatives
        .iter()
        .map(|alt| run_alternative(index, &host, alt))
        .collect();

    let combined = combine(results, spec.combine());
    tracing::debug!(
        host = %host.id,
        alternatives = alternatives.len(),
        results = combined.len(),
        "relationship query complete"
    );
    combined
}

/// Run one alternative's step sequence. The working set starts as `{host}`.
pub fn run_alternative<I>(index: &I, host: &Document, alt: &QueryAlternative) -> Vec<Document>
where
    I: DocumentIndex + ?Sized,
{
    let mut working = vec![host.clone()];
    for step in &alt.steps {
        working = apply_step(index, host, working, step);
    }
    working
}

fn apply_step<I>(
    index: &I,
    host: &Document,
    working: Vec<Document>,
    step: &Step,
) -> Vec<Document>
where
    I: DocumentIndex + ?Sized,
{
    match step {
        Step::Out { properties, types } => {
            let mut next = Vec::new();
            for doc in &working {
                for value in collect_values(&doc.metadata, properties) {
                    let Some(raw) = value.as_str() else { continue };
                    let link = LinkRef::parse(raw);
                    if let LinkTarget::Resolved(id) = link.resolve(index, doc.id.as_str()) {
                        if let Some(target) = index.get_by_path(id.as_str()) {
                            if type_allowed(types, target.doc_type) {
                                next.push(target);
                            }
                        }
                    }
                }
            }
            next
        }

        Step::In { properties, types } => {
            scan_matching(index, &working, properties, types)
        }

        Step::NotIn { properties, types } => {
            let excluded: HashSet<DocId> = scan_matching(index, &working, properties, types)
                .into_iter()
                .map(|d| d.id)
                .collect();
            working
                .into_iter()
                .filter(|d| !excluded.contains(&d.id))
                .collect()
        }

        Step::Filter { types } => working
            .into_iter()
            .filter(|d| type_allowed(types, d.doc_type))
            .collect(),

        Step::Dedupe => {
            let mut seen = HashSet::new();
            working
                .into_iter()
                .filter(|d| seen.insert(d.id.clone()))
                .collect()
        }

        Step::NotHost => working.into_iter().filter(|d| d.id != host.id).collect(),
    }
}

/// Reverse traversal: all documents of the requested types whose named
/// properties reference any working-set member. Each candidate is emitted
/// at most once (it is visited once per type scan).
fn scan_matching<I>(
    index: &I,
    working: &[Document],
    properties: &[String],
    types: &Option<Vec<DocType>>,
) -> Vec<Document>
where
    I: DocumentIndex + ?Sized,
{
    let scan_types: &[DocType] = match types {
        Some(list) => list,
        None => &DocType::ALL,
    };

    let mut out = Vec::new();
    for doc_type in scan_types {
        for candidate in index.list_by_type(*doc_type) {
            let hit = working
                .iter()
                .any(|member| matcher::matches_any(&candidate, properties, member, index));
            if hit {
                out.push(candidate);
            }
        }
    }
    out
}

fn type_allowed(types: &Option<Vec<DocType>>, doc_type: DocType) -> bool {
    match types {
        None => true,
        Some(list) => list.contains(&doc_type),
    }
}

/// Merge alternative results per the combine strategy.
///
/// A single alternative passes through untouched: set union would collapse
/// duplicates the spec author intentionally left in (no `dedupe` step),
/// and that choice must be preserved. With multiple alternatives the merge
/// is set-valued under every strategy — duplicates within an alternative
/// collapse to their first occurrence.
fn combine(mut results: Vec<Vec<Document>>, strategy: Combine) -> Vec<Document> {
    if results.is_empty() {
        return Vec::new();
    }
    if results.len() == 1 {
        return results.pop().unwrap_or_default();
    }

    match strategy {
        Combine::Union => {
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            for result in results {
                for doc in result {
                    if seen.insert(doc.id.clone()) {
                        out.push(doc);
                    }
                }
            }
            out
        }

        Combine::Intersect => {
            let rest: Vec<HashSet<DocId>> = results[1..]
                .iter()
                .map(|r| r.iter().map(|d| d.id.clone()).collect())
                .collect();
            let mut seen = HashSet::new();
            results
                .swap_remove(0)
                .into_iter()
                .filter(|d| rest.iter().all(|ids| ids.contains(&d.id)))
                .filter(|d| seen.insert(d.id.clone()))
                .collect()
        }

        Combine::Subtract => {
            let excluded: HashSet<DocId> = results[1..]
                .iter()
                .flat_map(|r| r.iter().map(|d| d.id.clone()))
                .collect();
            let mut seen = HashSet::new();
            results
                .swap_remove(0)
                .into_iter()
                .filter(|d| !excluded.contains(&d.id))
                .filter(|d| seen.insert(d.id.clone()))
                .collect()
        }
    }
}
