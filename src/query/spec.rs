//! Relationship spec wire format.
//!
//! Specs arrive as JSON-compatible structures authored by hand in panel
//! configuration, so parsing is deliberately forgiving: unknown keys are
//! ignored, `properties` accepts a string or an array, and steps with an
//! unrecognized shape are skipped with a warning instead of failing the
//! whole query.

use serde::Deserialize;
use smallvec::SmallVec;

use crate::model::DocType;

/// Ordered list of property-name synonyms (e.g. `["team", "teams"]`).
/// Resolved once at spec-parse time, not re-derived per matching call.
pub type PropertyNames = SmallVec<[String; 2]>;

// ============================================================================
// RelationSpec
// ============================================================================

/// Declarative description of how a panel computes its related documents.
///
/// Either the flat shorthand (`target_type` + `properties`, treated as a
/// single implicit `In` step) or a full `find` query. When both are
/// present, `find` wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationSpec {
    /// Entity kind of the documents this relation produces.
    pub target_type: Option<String>,
    /// Flat shorthand: candidate properties that back-reference the host.
    pub properties: Option<StringOrList>,
    /// Full traversal query; overrides the flat shorthand.
    pub find: Option<FindSpec>,
    pub sort: Option<SortSpec>,
    pub page_size: Option<usize>,
    /// Consumed by document-creation collaborators, ignored by the engine.
    pub create_entity: Option<serde_json::Value>,
}

impl RelationSpec {
    /// Parse a spec from its JSON wire form.
    pub fn from_json(json: &str) -> serde_json::Result<RelationSpec> {
        serde_json::from_str(json)
    }

    /// The alternatives to execute: the `find` query if present, otherwise
    /// the flat shorthand desugared to a single implicit `In` step.
    /// A spec with neither yields no alternatives (and an empty result).
    pub fn alternatives(&self) -> Vec<QueryAlternative> {
        if let Some(find) = &self.find {
            return find.query.clone();
        }
        if let Some(properties) = &self.properties {
            let types = match self.target_type.as_deref().map(DocType::parse) {
                Some(Some(t)) => Some(vec![t]),
                // Unknown target type: scanning nothing is the lenient
                // reading — the spec author named a kind we don't have.
                Some(None) => {
                    tracing::warn!(target_type = ?self.target_type, "unknown target type in spec");
                    Some(Vec::new())
                }
                None => None,
            };
            return vec![QueryAlternative {
                description: None,
                steps: vec![Step::In { properties: properties.to_names(), types }],
            }];
        }
        Vec::new()
    }

    /// Combine strategy for merging alternatives (default union).
    pub fn combine(&self) -> Combine {
        self.find.as_ref().map(|f| f.combine).unwrap_or_default()
    }
}

/// A string-or-array field, a frontmatter-ism the wire format allows
/// everywhere a property list appears.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    pub fn to_names(&self) -> PropertyNames {
        match self {
            StringOrList::One(s) => std::iter::once(s.clone()).collect(),
            StringOrList::Many(v) => v.iter().cloned().collect(),
        }
    }
}

// ============================================================================
// FindSpec
// ============================================================================

/// The `find` block: ordered alternatives plus a combine strategy.
#[derive(Debug, Clone, Deserialize)]
pub struct FindSpec {
    #[serde(default, deserialize_with = "deserialize_alternatives")]
    pub query: Vec<QueryAlternative>,
    #[serde(default)]
    pub combine: Combine,
}

/// Set operation used to merge the alternatives' result sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combine {
    #[default]
    Union,
    Intersect,
    Subtract,
}

/// One alternative: a sequence of steps applied to a working set seeded
/// with the host document.
#[derive(Debug, Clone, Default)]
pub struct QueryAlternative {
    pub description: Option<String>,
    pub steps: Vec<Step>,
}

// ============================================================================
// Steps
// ============================================================================

/// One traversal step. The working set goes in, a working set comes out.
///
/// `types: None` means "any entity kind"; `Some` restricts to the listed
/// kinds (an empty list, e.g. after unknown kinds were dropped, matches
/// nothing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Follow links stored under `properties` on each working-set member.
    Out { properties: PropertyNames, types: Option<Vec<DocType>> },
    /// Find documents of `types` whose `properties` reference a
    /// working-set member (reverse traversal; full scan per type).
    In { properties: PropertyNames, types: Option<Vec<DocType>> },
    /// Like `In`, but the matches are excluded from the working set.
    NotIn { properties: PropertyNames, types: Option<Vec<DocType>> },
    /// Narrow the working set to the given entity kinds.
    Filter { types: Option<Vec<DocType>> },
    /// Collapse duplicate identities, keeping first occurrences.
    Dedupe,
    /// Remove the host document. Idempotent.
    NotHost,
}

impl Step {
    /// Interpret one step from its wire form. Returns `None` for shapes we
    /// don't recognize — the caller skips those rather than failing.
    pub fn from_value(value: &serde_json::Value) -> Option<Step> {
        let obj = value.as_object()?;
        let tag = obj.get("step")?.as_str()?;

        match tag {
            "out" | "in" | "notIn" => {
                let properties = property_names(obj.get("properties")?)?;
                let types = parse_types(obj.get("types"));
                Some(match tag {
                    "out" => Step::Out { properties, types },
                    "in" => Step::In { properties, types },
                    _ => Step::NotIn { properties, types },
                })
            }
            "filter" => Some(Step::Filter { types: parse_types(obj.get("types")) }),
            "dedupe" | "unique" => Some(Step::Dedupe),
            "notHost" => Some(Step::NotHost),
            _ => None,
        }
    }
}

fn property_names(value: &serde_json::Value) -> Option<PropertyNames> {
    let names: PropertyNames = match value {
        serde_json::Value::String(s) => std::iter::once(s.clone()).collect(),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
        _ => return None,
    };
    if names.is_empty() { None } else { Some(names) }
}

/// Parse a string-or-array of type names, dropping unknown kinds.
/// Absent means "any type"; present-but-all-unknown means "match nothing".
fn parse_types(value: Option<&serde_json::Value>) -> Option<Vec<DocType>> {
    let value = value?;
    let names: Vec<&str> = match value {
        serde_json::Value::String(s) => vec![s.as_str()],
        serde_json::Value::Array(items) => items.iter().filter_map(|v| v.as_str()).collect(),
        _ => Vec::new(),
    };
    Some(
        names
            .iter()
            .filter_map(|name| {
                let parsed = DocType::parse(name);
                if parsed.is_none() {
                    tracing::warn!(name, "unknown entity kind in step, dropped");
                }
                parsed
            })
            .collect(),
    )
}

/// Deserialize alternatives leniently: a malformed step is dropped with a
/// warning; an alternative whose steps are not even an array is dropped
/// whole. The query still runs with whatever survived.
fn deserialize_alternatives<'de, D>(deserializer: D) -> Result<Vec<QueryAlternative>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
    let mut out = Vec::with_capacity(raw.len());

    for alt in &raw {
        let Some(obj) = alt.as_object() else {
            tracing::warn!("query alternative is not an object, skipped");
            continue;
        };
        let description = obj
            .get("description")
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        let Some(raw_steps) = obj.get("steps").and_then(|v| v.as_array()) else {
            tracing::warn!(?description, "query alternative has no steps array, skipped");
            continue;
        };

        let steps: Vec<Step> = raw_steps
            .iter()
            .filter_map(|v| {
                let step = Step::from_value(v);
                if step.is_none() {
                    tracing::warn!(step = %v, "unrecognized step shape, skipped");
                }
                step
            })
            .collect();

        out.push(QueryAlternative { description, steps });
    }

    Ok(out)
}

// ============================================================================
// Sort
// ============================================================================

/// How a panel orders its results before the explicit-order merge.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub strategy: SortStrategy,
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    /// Persisted explicit order first, fallback comparator for the rest.
    Manual,
    /// Pure comparator sort on a metadata column.
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}
