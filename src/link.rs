//! Link reference parsing and resolution.
//!
//! A metadata value like `"[[companies/Acme|the client#Contacts]]"` carries
//! three pieces: the target text, an optional display alias after the first
//! `|`, and an optional section anchor after the first `#`. Resolution maps
//! the target text to a document identity through the index, relative to
//! the document the value was found on.
//!
//! Resolution never fails hard: an unresolvable reference degrades to an
//! `Unresolved` placeholder that keeps the raw text for display.

use crate::index::DocumentIndex;
use crate::model::DocId;

/// A parsed (but not yet resolved) link reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    /// Target text with brackets, alias, and anchor stripped.
    pub target: String,
    /// Display alias, if the reference carried one.
    pub alias: Option<String>,
}

impl LinkRef {
    /// Parse a raw metadata value into a link reference.
    ///
    /// Accepts both bracketed (`[[Target|alias]]`) and bare (`Target`)
    /// forms. The anchor part (`#Section`) is discarded — relationships
    /// are between documents, not sections.
    pub fn parse(raw: &str) -> LinkRef {
        let mut text = raw.trim();
        if let Some(inner) = text.strip_prefix("[[").and_then(|t| t.strip_suffix("]]")) {
            text = inner;
        }

        let (target_part, alias) = match text.split_once('|') {
            Some((t, a)) => (t, Some(a.trim().to_owned()).filter(|a| !a.is_empty())),
            None => (text, None),
        };

        let target = match target_part.split_once('#') {
            Some((t, _anchor)) => t,
            None => target_part,
        };

        LinkRef {
            target: target.trim().to_owned(),
            alias,
        }
    }

    /// What a UI would show for this reference before resolution.
    pub fn display_text(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.target)
    }

    /// Resolve against the index, relative to the referencing document.
    ///
    /// Tries the literal path, then the path with the default extension,
    /// then the index's link lookup (relative paths, base names). A miss
    /// yields `Unresolved` carrying the display text — never an error.
    pub fn resolve<I>(&self, index: &I, from_path: &str) -> LinkTarget
    where
        I: DocumentIndex + ?Sized,
    {
        if self.target.is_empty() {
            return LinkTarget::Unresolved { raw: self.display_text().to_owned() };
        }

        if let Some(doc) = index.get_by_path(&self.target) {
            return LinkTarget::Resolved(doc.id);
        }
        if let Some(doc) = index.get_by_path(&format!("{}.md", self.target)) {
            return LinkTarget::Resolved(doc.id);
        }
        if let Some(doc) = index.resolve_link(&self.target, from_path) {
            return LinkTarget::Resolved(doc.id);
        }

        tracing::debug!(link = %self.target, from = %from_path, "link did not resolve");
        LinkTarget::Unresolved { raw: self.display_text().to_owned() }
    }
}

/// Outcome of resolving a link reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// The reference points at a known document.
    Resolved(DocId),
    /// Nothing in the index matched; `raw` is the display fallback.
    Unresolved { raw: String },
}

impl LinkTarget {
    pub fn id(&self) -> Option<&DocId> {
        match self {
            LinkTarget::Resolved(id) => Some(id),
            LinkTarget::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, LinkTarget::Resolved(_))
    }
}
