//! InstanceCatalog: ordered, id-indexed, read-only after build.

use std::collections::HashMap;

use potato_core::errors::ConfigError;
use potato_core::models::{Instance, InstanceKind};

/// All instances of a campaign in catalog order.
#[derive(Debug, Clone, Default)]
pub struct InstanceCatalog {
    instances: Vec<Instance>,
    index: HashMap<String, usize>,
}

impl InstanceCatalog {
    /// Build from already-classified instances. Ids must be unique.
    pub fn from_instances(instances: Vec<Instance>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(instances.len());
        for (pos, inst) in instances.iter().enumerate() {
            if index.insert(inst.id.clone(), pos).is_some() {
                return Err(ConfigError::DuplicateInstance {
                    id: inst.id.clone(),
                });
            }
        }
        Ok(Self { instances, index })
    }

    pub fn get(&self, id: &str) -> Option<&Instance> {
        self.index.get(id).map(|&pos| &self.instances[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn kind_of(&self, id: &str) -> Option<InstanceKind> {
        self.get(id).map(|i| i.kind)
    }

    /// Unknown ids count as not real.
    pub fn is_real(&self, id: &str) -> bool {
        self.kind_of(id).is_some_and(InstanceKind::is_real)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    /// Ids of one kind, in catalog order.
    pub fn ids_of_kind(&self, kind: InstanceKind) -> Vec<String> {
        self.instances
            .iter()
            .filter(|i| i.kind == kind)
            .map(|i| i.id.clone())
            .collect()
    }

    pub fn real_count(&self) -> usize {
        self.instances.iter().filter(|i| i.kind.is_real()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn inst(id: &str, kind: InstanceKind) -> Instance {
        Instance {
            id: id.to_string(),
            payload: Map::new(),
            displayed_text: String::new(),
            kind,
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = InstanceCatalog::from_instances(vec![
            inst("a", InstanceKind::Item),
            inst("a", InstanceKind::Item),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateInstance { .. }));
    }

    #[test]
    fn kind_filters_keep_catalog_order() {
        let cat = InstanceCatalog::from_instances(vec![
            inst("intro", InstanceKind::PreAnnotationPage),
            inst("b", InstanceKind::Item),
            inst("a", InstanceKind::Item),
        ])
        .unwrap();
        assert_eq!(cat.ids_of_kind(InstanceKind::Item), vec!["b", "a"]);
        assert_eq!(cat.real_count(), 2);
        assert!(!cat.is_real("intro"));
        assert!(!cat.is_real("missing"));
    }
}
