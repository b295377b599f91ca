//! Documents and their identities.

use serde::{Deserialize, Serialize};

use super::{MetaValue, Metadata};

/// Stable document identity: the vault-relative path (e.g. `"people/Ada.md"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocId(pub String);

impl DocId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path with its extension stripped.
    pub fn without_ext(&self) -> &str {
        match self.0.rsplit_once('.') {
            Some((stem, ext)) if !ext.contains('/') => stem,
            _ => &self.0,
        }
    }

    /// The base name with the extension stripped (e.g. `"Ada"`).
    pub fn stem(&self) -> &str {
        self.without_ext().rsplit('/').next().unwrap_or_default()
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self { DocId(s.to_owned()) }
}

/// The fixed set of entity kinds a document can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Person,
    Company,
    Team,
    Project,
    Meeting,
    Task,
    Fact,
    Log,
}

impl DocType {
    /// All entity kinds, in declaration order. `In` steps with no type
    /// filter scan every one of these.
    pub const ALL: [DocType; 8] = [
        DocType::Person,
        DocType::Company,
        DocType::Team,
        DocType::Project,
        DocType::Meeting,
        DocType::Task,
        DocType::Fact,
        DocType::Log,
    ];

    /// Parse a lowercase type name. Unknown names yield `None` — query
    /// specs referencing unknown types degrade to empty matches.
    pub fn parse(s: &str) -> Option<DocType> {
        match s {
            "person" => Some(DocType::Person),
            "company" => Some(DocType::Company),
            "team" => Some(DocType::Team),
            "project" => Some(DocType::Project),
            "meeting" => Some(DocType::Meeting),
            "task" => Some(DocType::Task),
            "fact" => Some(DocType::Fact),
            "log" => Some(DocType::Log),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Person => "person",
            DocType::Company => "company",
            DocType::Team => "team",
            DocType::Project => "project",
            DocType::Meeting => "meeting",
            DocType::Task => "task",
            DocType::Fact => "fact",
            DocType::Log => "log",
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A document in the knowledge base: identity, declared entity kind, and
/// the structured metadata block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub doc_type: DocType,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(id: impl Into<String>, doc_type: DocType) -> Self {
        Self {
            id: DocId::new(id),
            doc_type,
            metadata: Metadata::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.metadata.get(key)
    }

    /// Display name: the `show` property, then `name`, then the file stem.
    pub fn display_name(&self) -> &str {
        self.get("show")
            .and_then(MetaValue::as_str)
            .or_else(|| self.get("name").and_then(MetaValue::as_str))
            .unwrap_or_else(|| self.id.stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_stem() {
        assert_eq!(DocId::new("people/Ada Lovelace.md").stem(), "Ada Lovelace");
        assert_eq!(DocId::new("Acme.md").stem(), "Acme");
        assert_eq!(DocId::new("no-extension").stem(), "no-extension");
    }

    #[test]
    fn test_doc_id_without_ext() {
        assert_eq!(DocId::new("a/b.md").without_ext(), "a/b");
        assert_eq!(DocId::new("a.b/c").without_ext(), "a.b/c");
    }

    #[test]
    fn test_display_name_fallback() {
        let doc = Document::new("people/Ada.md", DocType::Person);
        assert_eq!(doc.display_name(), "Ada");

        let doc = doc.with_property("name", "Ada Lovelace");
        assert_eq!(doc.display_name(), "Ada Lovelace");

        let doc = doc.with_property("show", "Countess");
        assert_eq!(doc.display_name(), "Countess");
    }

    #[test]
    fn test_doc_type_parse() {
        assert_eq!(DocType::parse("person"), Some(DocType::Person));
        assert_eq!(DocType::parse("widget"), None);
    }
}
