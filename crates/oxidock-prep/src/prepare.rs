//! Two-step receptor preparation: protonate, then convert.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::convert::ObabelRunner;
use crate::protonate::Pdb2PqrRunner;

/// Chains pdb2pqr and obabel to turn a raw structure into a docking-ready PDBQT.
pub struct ReceptorPreparer {
    pdb2pqr: Pdb2PqrRunner,
    obabel: ObabelRunner,
}

impl ReceptorPreparer {
    /// Create a preparer from the two tool paths.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(pdb2pqr_path: P, obabel_path: Q) -> Self {
        Self {
            pdb2pqr: Pdb2PqrRunner::new(pdb2pqr_path),
            obabel: ObabelRunner::new(obabel_path),
        }
    }

    /// Prepare a receptor structure for docking.
    ///
    /// The intermediate PQR and the final PDBQT are both written to
    /// `output_dir`; the PDBQT path is returned.
    pub async fn prepare(&self, input: &Path, ph: f64, output_dir: &Path) -> Result<PathBuf> {
        info!("Preparing receptor {:?} at pH {}", input, ph);
        let pqr = self.pdb2pqr.run(input, ph, output_dir).await?;
        let pdbqt = self.obabel.run(&pqr, Some(output_dir)).await?;
        Ok(pdbqt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_prepare_stops_at_first_failing_step() {
        let dir = tempdir().unwrap();
        let preparer = ReceptorPreparer::new("false", "obabel");

        let err = preparer
            .prepare(&dir.path().join("protein.pdb"), 7.4, dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("pdb2pqr failed"));
    }
}
