//! AutoDock Vina execution.

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::DockingConfig;
use crate::engine::DockingEngine;
use crate::output::{collect_warnings, parse_output, DockingOutcome};

/// Wrapper for AutoDock Vina execution.
pub struct VinaRunner {
    executable_path: PathBuf,
    timeout: Option<Duration>,
}

impl VinaRunner {
    /// Create a new VinaRunner.
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
            timeout: None,
        }
    }

    /// Kill the engine if a single run exceeds `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run the engine with every parameter passed as a command-line option.
    pub async fn run(&self, config: &DockingConfig, out: &Path) -> Result<DockingOutcome> {
        config.validate()?;
        info!("Running AutoDock Vina on {:?}", config.ligand);

        let mut command = Command::new(&self.executable_path);
        command
            .arg("--receptor")
            .arg(&config.receptor)
            .arg("--ligand")
            .arg(&config.ligand)
            .arg("--center_x")
            .arg(config.center_x.to_string())
            .arg("--center_y")
            .arg(config.center_y.to_string())
            .arg("--center_z")
            .arg(config.center_z.to_string())
            .arg("--size_x")
            .arg(config.size_x.to_string())
            .arg("--size_y")
            .arg(config.size_y.to_string())
            .arg("--size_z")
            .arg(config.size_z.to_string());
        if let Some(cpu) = config.cpu {
            command.arg("--cpu").arg(cpu.to_string());
        }
        if let Some(e) = config.exhaustiveness {
            command.arg("--exhaustiveness").arg(e.to_string());
        }
        if let Some(n) = config.num_modes {
            command.arg("--num_modes").arg(n.to_string());
        }
        if let Some(r) = config.energy_range {
            command.arg("--energy_range").arg(r.to_string());
        }
        if let Some(s) = config.seed {
            command.arg("--seed").arg(s.to_string());
        }
        command.arg("--out").arg(out);

        self.capture(command, out).await
    }

    /// Run the engine in its config-file form.
    ///
    /// Writes `config` to `config_path`, then invokes
    /// `vina --receptor <file> --ligand <file> --config <file> --out <file>`.
    pub async fn run_with_config_file(
        &self,
        config: &DockingConfig,
        config_path: &Path,
        out: &Path,
    ) -> Result<DockingOutcome> {
        config.write_config_file(config_path).await?;
        info!(
            "Running AutoDock Vina on {:?} with config {:?}",
            config.ligand, config_path
        );

        let mut command = Command::new(&self.executable_path);
        command
            .arg("--receptor")
            .arg(&config.receptor)
            .arg("--ligand")
            .arg(&config.ligand)
            .arg("--config")
            .arg(config_path)
            .arg("--out")
            .arg(out);

        self.capture(command, out).await
    }

    async fn capture(&self, mut command: Command, out: &Path) -> Result<DockingOutcome> {
        command.kill_on_drop(true);

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| anyhow::anyhow!("AutoDock Vina timed out after {:?}", limit))??,
            None => command.output().await?,
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!("AutoDock Vina failed: {}", stderr);
        }

        let log = String::from_utf8_lossy(&result.stdout).into_owned();
        let poses = parse_output(&log)?;
        let warnings = collect_warnings(&log);
        debug!("AutoDock Vina completed successfully. Output in {:?}", out);

        Ok(DockingOutcome {
            output: out.to_path_buf(),
            poses,
            warnings,
            log,
        })
    }
}

#[async_trait]
impl DockingEngine for VinaRunner {
    /// Uses the config-file invocation form; the engine config is written
    /// beside the output file.
    async fn dock(&self, config: &DockingConfig, out: &Path) -> Result<DockingOutcome> {
        self.run_with_config_file(config, &out.with_extension("conf"), out)
            .await
    }
}
