//! CatalogBuilder: assembles the catalog from input files, synthetic pages
//! and test question templates.

use std::path::Path;

use potato_core::config::{PageSpec, PotatoConfig};
use potato_core::constants::{PRESTUDY_MARKER, TEST_QUESTION_MARKER};
use potato_core::errors::ConfigError;
use potato_core::models::{Instance, InstanceKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{Map, Value};
use tracing::info;

use crate::catalog::InstanceCatalog;
use crate::display::displayed_text;
use crate::loader::{read_records, record_id};
use crate::test_questions::expand_template;

/// Collects records, then classifies and orders them in [`CatalogBuilder::build`].
pub struct CatalogBuilder<'a> {
    config: &'a PotatoConfig,
    records: Vec<Map<String, Value>>,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(config: &'a PotatoConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
        }
    }

    /// Add in-memory records (one per instance).
    pub fn with_records(mut self, records: impl IntoIterator<Item = Map<String, Value>>) -> Self {
        self.records.extend(records);
        self
    }

    /// Load `data_files` and `pages.test_question_files`, resolved against `base_dir`.
    pub fn load_files(mut self, base_dir: &Path) -> Result<Self, ConfigError> {
        for file in &self.config.data_files {
            let records = read_records(&base_dir.join(file))?;
            info!(file = %file, records = records.len(), "loaded data file");
            self.records.extend(records);
        }
        for file in &self.config.pages.test_question_files {
            let templates = read_records(&base_dir.join(file))?;
            self = self.with_test_question_templates(templates)?;
        }
        Ok(self)
    }

    /// Expand test question templates and add them.
    pub fn with_test_question_templates(
        mut self,
        templates: impl IntoIterator<Item = Map<String, Value>>,
    ) -> Result<Self, ConfigError> {
        let props = &self.config.item_properties;
        for tpl in templates {
            let expanded = expand_template(&tpl, &props.id_key, &props.text_key)?;
            self.records.extend(expanded);
        }
        Ok(self)
    }

    /// Classify, derive displayed text and order: pre-annotation and prestudy
    /// result pages first, data records next, post-annotation pages last.
    pub fn build(self) -> Result<InstanceCatalog, ConfigError> {
        let config = self.config;
        let props = &config.item_properties;
        let mut rng = StdRng::seed_from_u64(config.display.seed);
        let mut instances = Vec::new();

        let front = [
            (&config.pages.pre_annotation_pages, InstanceKind::PreAnnotationPage),
            (&config.pages.prestudy_passed_pages, InstanceKind::PrestudyPassedPage),
            (&config.pages.prestudy_failed_pages, InstanceKind::PrestudyFailedPage),
        ];
        for (pages, kind) in front {
            instances.extend(pages.iter().map(|p| page_instance(p, kind, props.text_key.as_str())));
        }

        for record in self.records {
            let id = record_id(&record, &props.id_key)?;
            let kind = classify(&id);
            let raw = record.get(&props.text_key).cloned().unwrap_or(Value::Null);
            let displayed_text = displayed_text(&raw, &config.display, &mut rng);
            instances.push(Instance {
                id,
                payload: record,
                displayed_text,
                kind,
            });
        }

        instances.extend(config.pages.post_annotation_pages.iter().map(|p| {
            page_instance(p, InstanceKind::PostAnnotationPage, props.text_key.as_str())
        }));

        let catalog = InstanceCatalog::from_instances(instances)?;
        info!(
            instances = catalog.len(),
            real = catalog.real_count(),
            "instance catalog built"
        );
        Ok(catalog)
    }
}

/// Test questions and prestudy items are recognized by id markers.
pub fn classify(id: &str) -> InstanceKind {
    if id.contains(TEST_QUESTION_MARKER) {
        InstanceKind::TestQuestion
    } else if id.contains(PRESTUDY_MARKER) {
        InstanceKind::Prestudy
    } else {
        InstanceKind::Item
    }
}

fn page_instance(page: &PageSpec, kind: InstanceKind, text_key: &str) -> Instance {
    let text = page.text.clone().unwrap_or_else(|| page_title(&page.id));
    let mut payload = Map::new();
    payload.insert("id".to_string(), Value::String(page.id.clone()));
    payload.insert(text_key.to_string(), Value::String(text.clone()));
    Instance {
        id: page.id.clone(),
        payload,
        displayed_text: text,
        kind,
    }
}

/// `surveyflow/intro-consent.html` -> `consent.html` -> `consent`.
fn page_title(id: &str) -> String {
    let tail = id.rsplit('-').next().unwrap_or(id);
    tail.strip_suffix(".html").unwrap_or(tail).to_string()
}
