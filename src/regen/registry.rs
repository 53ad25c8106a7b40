//! Grammar registry capability.
//!
//! The host editor's registry is modeled as an injected trait so the
//! regeneration pipeline is testable without a live registry.

use std::path::Path;

use async_trait::async_trait;

use crate::error::SynthResult;

/// Accepts registration of a grammar artifact by file location and
/// unregistration by scope identifier.
#[async_trait]
pub trait GrammarRegistry: Send + Sync {
    /// Parse and activate the artifact at `location`.
    async fn register(&self, location: &Path) -> SynthResult<()>;

    /// Deactivate whatever is registered under `scope`.
    ///
    /// Unregistering a scope nothing is registered under is not an error.
    async fn unregister(&self, scope: &str) -> SynthResult<()>;
}

/// Registry that accepts everything and activates nothing.
///
/// Standalone CLI runs have no host registry; the generated artifact on
/// disk is the entire deliverable.
#[derive(Debug, Default)]
pub struct NullRegistry;

#[async_trait]
impl GrammarRegistry for NullRegistry {
    async fn register(&self, location: &Path) -> SynthResult<()> {
        crate::debug_event!("registry", "register (no-op)", "{}", location.display());
        Ok(())
    }

    async fn unregister(&self, scope: &str) -> SynthResult<()> {
        crate::debug_event!("registry", "unregister (no-op)", "{scope}");
        Ok(())
    }
}
