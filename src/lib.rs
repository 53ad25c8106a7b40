pub mod config;
pub mod error;
pub mod grammar;
pub mod logging;
pub mod regen;

pub use config::Settings;
pub use error::{SynthError, SynthResult};
pub use grammar::{GrammarDocument, ParsedPattern, parse_rule, synthesize_text};
pub use regen::{
    ArtifactStore, DirArtifactStore, GrammarRegistry, Notifier, RegenController, SettingsWatcher,
    SynthesisResult,
};
