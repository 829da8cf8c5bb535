//! The docking-engine seam.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use crate::config::DockingConfig;
use crate::output::DockingOutcome;

/// A docking engine that can pose one ligand against one receptor.
///
/// The production implementation shells out to AutoDock Vina; callers that
/// orchestrate runs depend on this trait so other engines, wrappers or
/// substitutes can stand in.
#[async_trait]
pub trait DockingEngine: Send + Sync {
    /// Dock `config.ligand` against `config.receptor`, writing poses to `out`.
    async fn dock(&self, config: &DockingConfig, out: &Path) -> Result<DockingOutcome>;
}
