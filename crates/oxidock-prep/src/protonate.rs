//! Protonation using pdb2pqr.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Default pH for receptor protonation, matching physiological conditions.
pub const DEFAULT_PH: f64 = 7.4;

/// Wrapper for pdb2pqr execution.
pub struct Pdb2PqrRunner {
    executable_path: PathBuf,
}

impl Pdb2PqrRunner {
    /// Create a new Pdb2PqrRunner.
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
        }
    }

    /// Protonate a structure at the given pH.
    ///
    /// Runs `pdb2pqr --ff=AMBER --titration-state-method propka --with-ph <ph>`
    /// and returns the produced PQR path, `<input stem>.pqr` in `output_dir`.
    pub async fn run(&self, input: &Path, ph: f64, output_dir: &Path) -> Result<PathBuf> {
        if !(0.0..=14.0).contains(&ph) {
            anyhow::bail!("pH out of range: {}", ph);
        }

        let stem = input
            .file_stem()
            .ok_or_else(|| anyhow::anyhow!("input has no file name: {:?}", input))?
            .to_string_lossy();
        let output = output_dir.join(format!("{}.pqr", stem));

        info!("Running pdb2pqr on {:?} at pH {}", input, ph);
        tokio::fs::create_dir_all(output_dir).await?;

        let result = Command::new(&self.executable_path)
            .arg("--ff=AMBER")
            .arg("--titration-state-method")
            .arg("propka")
            .arg("--with-ph")
            .arg(ph.to_string())
            .arg(input)
            .arg(&output)
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!("pdb2pqr failed: {}", stderr);
        }
        if !output.exists() {
            anyhow::bail!("pdb2pqr produced no output file: {:?}", output);
        }

        debug!("pdb2pqr completed successfully. Output in {:?}", output);
        Ok(output)
    }
}
