//! # potato-engine
//!
//! [`AnnotationEngine`] owns the catalog, the task assignment registry, every
//! annotator's state and the active learning coordinator, and exposes the
//! operations the web layer calls: user creation, submissions, navigation,
//! saturation checks, active learning passes and agreement.
//!
//! ```no_run
//! use std::path::Path;
//! use potato_core::PotatoConfig;
//! use potato_engine::{AnnotationEngine, Navigation};
//!
//! # fn main() -> potato_core::PotatoResult<()> {
//! let config = PotatoConfig::load(Path::new("config.toml"))?;
//! let engine = AnnotationEngine::from_config(config, Path::new("."))?;
//! engine.get_or_create_user_state("alice")?;
//! let first = engine.current_instance("alice")?;
//! engine.record_form_submission("alice", &first.id, &[("sentiment:::positive", "true")])?;
//! engine.navigate("alice", Navigation::Forward)?;
//! # Ok(())
//! # }
//! ```

mod agreement;
mod engine;
mod navigation;
mod options;
mod persistence;

pub use agreement::{AgreementReport, SchemaSelection, UserSelection};
pub use engine::AnnotationEngine;
pub use navigation::Navigation;
pub use potato_learning::{CancellationToken, PassReport};
