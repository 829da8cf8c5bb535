//! PQR to PDBQT conversion using Open Babel.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Wrapper for obabel execution.
pub struct ObabelRunner {
    executable_path: PathBuf,
}

impl ObabelRunner {
    /// Create a new ObabelRunner.
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
        }
    }

    /// Convert a PQR file to PDBQT.
    ///
    /// Runs `obabel -ipqr <input> -opdbqt -O <output>`. The output is
    /// `<input stem>.pdbqt`, placed next to the input unless `output_dir`
    /// is given.
    pub async fn run(&self, input: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
        let stem = input
            .file_stem()
            .ok_or_else(|| anyhow::anyhow!("input has no file name: {:?}", input))?
            .to_string_lossy();
        let dir = match output_dir {
            Some(d) => d.to_path_buf(),
            None => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let output = dir.join(format!("{}.pdbqt", stem));

        info!("Running obabel on {:?}", input);
        tokio::fs::create_dir_all(&dir).await?;

        let result = Command::new(&self.executable_path)
            .arg("-ipqr")
            .arg(input)
            .arg("-opdbqt")
            .arg("-O")
            .arg(&output)
            .output()
            .await?;

        // obabel reports its conversion count on stderr; only the exit
        // status distinguishes success from failure
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!("obabel failed: {}", stderr);
        }
        if !output.exists() {
            anyhow::bail!("obabel produced no output file: {:?}", output);
        }

        debug!("obabel completed successfully. Output in {:?}", output);
        Ok(output)
    }
}
