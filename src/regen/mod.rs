//! Debounced regeneration of the generated grammar artifact.
//!
//! # Architecture
//!
//! ```text
//! SettingsWatcher --rule lists--> RegenController
//!                                   - Debounce (burst collapsing)
//!                                   - synthesis cycle
//!                                        |
//!                      +----------------+----------------+
//!                      |                |                |
//!                ArtifactStore   GrammarRegistry      Notifier
//! ```
//!
//! The controller owns all mutable state; collaborators are injected
//! capability traits so the pipeline runs against fakes in tests and
//! against a directory + host registry in production.

mod controller;
mod debounce;
mod notifier;
mod registry;
mod source;
mod store;

pub use controller::{RegenController, RegenControllerBuilder, RegenState, SynthesisResult};
pub use debounce::Debounce;
pub use notifier::{LogNotifier, Notifier};
pub use registry::{GrammarRegistry, NullRegistry};
pub use source::{SettingsWatcher, WatchError};
pub use store::{ArtifactStore, DirArtifactStore};
