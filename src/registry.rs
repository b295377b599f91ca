//! Relationship spec registry.
//!
//! An explicit configuration object mapping (host entity kind, relation
//! key) to the spec that computes that panel. Passed into the engine at
//! construction so tests can run against synthetic configurations — there
//! is no module-level singleton.

use hashbrown::HashMap;

use crate::model::DocType;
use crate::query::RelationSpec;

#[derive(Default)]
pub struct SpecRegistry {
    specs: HashMap<(DocType, String), RelationSpec>,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the spec backing `relation_key` panels on `host_type`
    /// documents. Replaces any previous registration for the pair.
    pub fn register(
        &mut self,
        host_type: DocType,
        relation_key: impl Into<String>,
        spec: RelationSpec,
    ) {
        self.specs.insert((host_type, relation_key.into()), spec);
    }

    /// Register from the JSON wire form.
    pub fn register_json(
        &mut self,
        host_type: DocType,
        relation_key: impl Into<String>,
        json: &str,
    ) -> serde_json::Result<()> {
        let spec = RelationSpec::from_json(json)?;
        self.register(host_type, relation_key, spec);
        Ok(())
    }

    pub fn get(&self, host_type: DocType, relation_key: &str) -> Option<&RelationSpec> {
        self.specs.get(&(host_type, relation_key.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut registry = SpecRegistry::new();
        registry
            .register_json(
                DocType::Company,
                "employees",
                r#"{"targetType": "person", "properties": "company"}"#,
            )
            .unwrap();

        assert!(registry.get(DocType::Company, "employees").is_some());
        assert!(registry.get(DocType::Company, "projects").is_none());
        assert!(registry.get(DocType::Team, "employees").is_none());
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = SpecRegistry::new();
        registry
            .register_json(DocType::Team, "members", r#"{"properties": "team"}"#)
            .unwrap();
        registry
            .register_json(
                DocType::Team,
                "members",
                r#"{"targetType": "person", "properties": ["team", "teams"]}"#,
            )
            .unwrap();

        assert_eq!(registry.len(), 1);
        let spec = registry.get(DocType::Team, "members").unwrap();
        assert_eq!(spec.target_type.as_deref(), Some("person"));
    }
}
