//! Metadata — the ordered key-value block on a document.

use indexmap::IndexMap;

use super::MetaValue;

/// An ordered map of property names to values (frontmatter-equivalent).
/// Insertion order is the author's order and is preserved through
/// read-modify-write cycles.
pub type Metadata = IndexMap<String, MetaValue>;

/// Collect the raw values stored under any of the given property name
/// synonyms, flattening scalar-or-list and dropping nulls.
///
/// All synonyms present on the document contribute values; an earlier
/// synonym does not shadow a later one.
pub fn collect_values<'a>(meta: &'a Metadata, names: &[String]) -> Vec<&'a MetaValue> {
    let mut out = Vec::new();
    for name in names {
        if let Some(value) = meta.get(name.as_str()) {
            out.extend(value.as_slice().iter().filter(|v| !v.is_null()));
        }
    }
    out
}
