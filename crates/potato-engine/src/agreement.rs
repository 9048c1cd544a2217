//! Campaign-level agreement over a selection of annotators and schemas.

use std::collections::BTreeMap;

use potato_agreement::{agreement, overall_average, AgreementValue, OverallAgreement, RaterLabels};
use potato_core::errors::{ConfigError, PotatoResult};
use potato_core::models::AnnotationSchema;
use serde::Serialize;
use tracing::debug;

use crate::engine::AnnotationEngine;

/// Which annotators to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserSelection {
    All,
    Only(Vec<String>),
}

/// Which schemas to score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSelection {
    All,
    Named(String),
}

/// Alpha per schema plus the mean of the computable ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgreementReport {
    pub per_schema: BTreeMap<String, AgreementValue>,
    pub overall: OverallAgreement,
}

impl AnnotationEngine {
    /// Krippendorff's alpha on real items. Page and test question answers
    /// are ignored.
    pub fn compute_agreement(
        &self,
        users: &UserSelection,
        schemas: &SchemaSelection,
    ) -> PotatoResult<AgreementReport> {
        let states = match users {
            UserSelection::All => self.users.snapshots(),
            UserSelection::Only(ids) => ids
                .iter()
                .map(|id| self.user(id))
                .collect::<PotatoResult<Vec<_>>>()?,
        };
        let tables: Vec<RaterLabels> = states
            .iter()
            .map(|state| {
                state
                    .all_labels()
                    .iter()
                    .filter(|(id, _)| self.catalog.is_real(id))
                    .map(|(id, la)| (id.clone(), la.clone()))
                    .collect()
            })
            .collect();
        let raters: Vec<&RaterLabels> = tables.iter().collect();

        let selected: Vec<&AnnotationSchema> = match schemas {
            SchemaSelection::All => self.config.annotation_schemes.iter().collect(),
            SchemaSelection::Named(name) => {
                let schema = self
                    .config
                    .schema(name)
                    .ok_or_else(|| ConfigError::UnknownSchema { name: name.clone() })?;
                vec![schema]
            }
        };

        let per_schema: BTreeMap<String, AgreementValue> = selected
            .into_iter()
            .map(|schema| (schema.name.clone(), agreement(&raters, schema)))
            .collect();
        let overall = overall_average(per_schema.values());
        debug!(raters = raters.len(), schemas = per_schema.len(), "agreement computed");
        Ok(AgreementReport {
            per_schema,
            overall,
        })
    }
}
