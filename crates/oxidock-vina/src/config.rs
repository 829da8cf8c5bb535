//! The engine's configuration-file model.
//!
//! AutoDock Vina reads a plain `key = value` file naming the receptor and
//! ligand files, the search box, and optional search controls:
//!
//! ```text
//! receptor = receptor.pdbqt
//! ligand = ligand.pdbqt
//! center_x = 15.19
//! center_y = 53.903
//! center_z = 16.917
//! size_x = 20
//! size_y = 20
//! size_z = 20
//! cpu = 12
//! ```
//!
//! This module writes and reads exactly that layout. It is the engine's
//! format, not an Oxidock one; no other configuration file exists in this
//! workspace.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for a docking run.
///
/// `receptor` through `size_z` are required by the engine. The remaining
/// fields are forwarded only when set, leaving the engine's own defaults
/// in charge otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockingConfig {
    pub receptor: PathBuf,
    pub ligand: PathBuf,
    pub center_x: f64,
    pub center_y: f64,
    pub center_z: f64,
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
    /// CPU count for the engine's internal search parallelism.
    pub cpu: Option<u32>,
    pub exhaustiveness: Option<u32>,
    pub num_modes: Option<u32>,
    pub energy_range: Option<f64>,
    pub seed: Option<i64>,
}

impl DockingConfig {
    /// Check the parameters before handing them to the engine.
    pub fn validate(&self) -> Result<()> {
        for v in [self.center_x, self.center_y, self.center_z] {
            if !v.is_finite() {
                anyhow::bail!("search box center must be finite, got {}", v);
            }
        }
        for v in [self.size_x, self.size_y, self.size_z] {
            if !v.is_finite() || v <= 0.0 {
                anyhow::bail!("search box sizes must be positive, got {}", v);
            }
        }
        if self.cpu == Some(0) {
            anyhow::bail!("cpu must be at least 1");
        }
        if self.exhaustiveness == Some(0) {
            anyhow::bail!("exhaustiveness must be at least 1");
        }
        if self.num_modes == Some(0) {
            anyhow::bail!("num_modes must be at least 1");
        }
        if let Some(r) = self.energy_range {
            if !r.is_finite() || r < 0.0 {
                anyhow::bail!("energy_range must be non-negative, got {}", r);
            }
        }
        Ok(())
    }

    /// Render the engine's `key = value` file body.
    ///
    /// Required keys come first in documented order; optional keys are
    /// emitted only when set.
    pub fn to_config_string(&self) -> String {
        let mut lines = vec![
            format!("receptor = {}", self.receptor.display()),
            format!("ligand = {}", self.ligand.display()),
            format!("center_x = {}", self.center_x),
            format!("center_y = {}", self.center_y),
            format!("center_z = {}", self.center_z),
            format!("size_x = {}", self.size_x),
            format!("size_y = {}", self.size_y),
            format!("size_z = {}", self.size_z),
        ];
        if let Some(cpu) = self.cpu {
            lines.push(format!("cpu = {}", cpu));
        }
        if let Some(e) = self.exhaustiveness {
            lines.push(format!("exhaustiveness = {}", e));
        }
        if let Some(n) = self.num_modes {
            lines.push(format!("num_modes = {}", n));
        }
        if let Some(r) = self.energy_range {
            lines.push(format!("energy_range = {}", r));
        }
        if let Some(s) = self.seed {
            lines.push(format!("seed = {}", s));
        }

        let mut body = lines.join("\n");
        body.push('\n');
        body
    }

    /// Write the rendered config to `path`, creating parent directories.
    pub async fn write_config_file(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.to_config_string()).await?;
        debug!("Wrote engine config to {:?}", path);
        Ok(())
    }

    /// Parse a config-file body written in the engine's layout.
    ///
    /// Blank lines and `#` comments are ignored. Unknown keys, duplicate
    /// keys, malformed values and missing required keys are all errors
    /// naming the offending line.
    pub fn from_config_str(s: &str) -> Result<Self> {
        let mut receptor: Option<PathBuf> = None;
        let mut ligand: Option<PathBuf> = None;
        let mut center_x = None;
        let mut center_y = None;
        let mut center_z = None;
        let mut size_x = None;
        let mut size_y = None;
        let mut size_z = None;
        let mut cpu = None;
        let mut exhaustiveness = None;
        let mut num_modes = None;
        let mut energy_range = None;
        let mut seed = None;

        for (idx, raw) in s.lines().enumerate() {
            let line = match raw.find('#') {
                Some(i) => &raw[..i],
                None => raw,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                anyhow::anyhow!("line {}: expected `key = value`, got {:?}", idx + 1, line)
            })?;
            let key = key.trim();
            let value = value.trim();

            match key {
                "receptor" => set_path(&mut receptor, key, value, idx)?,
                "ligand" => set_path(&mut ligand, key, value, idx)?,
                "center_x" => set_parsed(&mut center_x, key, value, idx)?,
                "center_y" => set_parsed(&mut center_y, key, value, idx)?,
                "center_z" => set_parsed(&mut center_z, key, value, idx)?,
                "size_x" => set_parsed(&mut size_x, key, value, idx)?,
                "size_y" => set_parsed(&mut size_y, key, value, idx)?,
                "size_z" => set_parsed(&mut size_z, key, value, idx)?,
                "cpu" => set_parsed(&mut cpu, key, value, idx)?,
                "exhaustiveness" => set_parsed(&mut exhaustiveness, key, value, idx)?,
                "num_modes" => set_parsed(&mut num_modes, key, value, idx)?,
                "energy_range" => set_parsed(&mut energy_range, key, value, idx)?,
                "seed" => set_parsed(&mut seed, key, value, idx)?,
                _ => anyhow::bail!("line {}: unknown key {}", idx + 1, key),
            }
        }

        let config = Self {
            receptor: require(receptor, "receptor")?,
            ligand: require(ligand, "ligand")?,
            center_x: require(center_x, "center_x")?,
            center_y: require(center_y, "center_y")?,
            center_z: require(center_z, "center_z")?,
            size_x: require(size_x, "size_x")?,
            size_y: require(size_y, "size_y")?,
            size_z: require(size_z, "size_z")?,
            cpu,
            exhaustiveness,
            num_modes,
            energy_range,
            seed,
        };
        config.validate()?;
        Ok(config)
    }
}

fn set_path(slot: &mut Option<PathBuf>, key: &str, value: &str, idx: usize) -> Result<()> {
    if slot.is_some() {
        anyhow::bail!("line {}: duplicate key {}", idx + 1, key);
    }
    if value.is_empty() {
        anyhow::bail!("line {}: empty value for {}", idx + 1, key);
    }
    *slot = Some(PathBuf::from(value));
    Ok(())
}

fn set_parsed<T: std::str::FromStr>(
    slot: &mut Option<T>,
    key: &str,
    value: &str,
    idx: usize,
) -> Result<()> {
    if slot.is_some() {
        anyhow::bail!("line {}: duplicate key {}", idx + 1, key);
    }
    let parsed = value.parse::<T>().map_err(|_| {
        anyhow::anyhow!("line {}: invalid value for {}: {:?}", idx + 1, key, value)
    })?;
    *slot = Some(parsed);
    Ok(())
}

fn require<T>(slot: Option<T>, key: &str) -> Result<T> {
    slot.ok_or_else(|| anyhow::anyhow!("missing required key {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> DockingConfig {
        DockingConfig {
            receptor: PathBuf::from("receptor.pdbqt"),
            ligand: PathBuf::from("ligand.pdbqt"),
            center_x: 15.19,
            center_y: 53.903,
            center_z: 16.917,
            size_x: 20.0,
            size_y: 20.0,
            size_z: 20.0,
            cpu: Some(12),
            exhaustiveness: None,
            num_modes: None,
            energy_range: None,
            seed: None,
        }
    }

    #[test]
    fn test_config_string_layout() {
        let expected = "\
receptor = receptor.pdbqt
ligand = ligand.pdbqt
center_x = 15.19
center_y = 53.903
center_z = 16.917
size_x = 20
size_y = 20
size_z = 20
cpu = 12
";
        assert_eq!(base_config().to_config_string(), expected);
    }

    #[test]
    fn test_optional_keys_omitted_when_unset() {
        let mut config = base_config();
        config.cpu = None;
        let body = config.to_config_string();
        assert!(!body.contains("cpu"));
        assert!(!body.contains("exhaustiveness"));
        assert!(!body.contains("seed"));
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = base_config();
        config.exhaustiveness = Some(32);
        config.num_modes = Some(9);
        config.energy_range = Some(3.0);
        config.seed = Some(-1717558785);

        let parsed = DockingConfig::from_config_str(&config.to_config_string()).unwrap();
        assert_eq!(parsed.receptor, config.receptor);
        assert_eq!(parsed.ligand, config.ligand);
        assert_eq!(parsed.center_y, config.center_y);
        assert_eq!(parsed.size_z, config.size_z);
        assert_eq!(parsed.cpu, config.cpu);
        assert_eq!(parsed.exhaustiveness, config.exhaustiveness);
        assert_eq!(parsed.seed, config.seed);
    }

    #[test]
    fn test_parse_ignores_comments_and_blank_lines() {
        let body = "\
# docking box around the active site
receptor = receptor.pdbqt
ligand = ligand.pdbqt

center_x = 1.5   # angstrom
center_y = 2.5
center_z = 3.5
size_x = 10
size_y = 10
size_z = 10
";
        let parsed = DockingConfig::from_config_str(body).unwrap();
        assert_eq!(parsed.center_x, 1.5);
        assert!(parsed.cpu.is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_key() {
        let body = "receptor = r.pdbqt\nspacing = 0.375\n";
        let err = DockingConfig::from_config_str(body).unwrap_err();
        assert!(err.to_string().contains("unknown key spacing"));
    }

    #[test]
    fn test_parse_rejects_duplicate_key() {
        let body = "receptor = a.pdbqt\nreceptor = b.pdbqt\n";
        let err = DockingConfig::from_config_str(body).unwrap_err();
        assert!(err.to_string().contains("duplicate key receptor"));
    }

    #[test]
    fn test_parse_rejects_malformed_value() {
        let body = "center_x = wide\n";
        let err = DockingConfig::from_config_str(body).unwrap_err();
        assert!(err.to_string().contains("invalid value for center_x"));
    }

    #[test]
    fn test_parse_requires_box_keys() {
        let body = "receptor = r.pdbqt\nligand = l.pdbqt\n";
        let err = DockingConfig::from_config_str(body).unwrap_err();
        assert!(err.to_string().contains("missing required key center_x"));
    }

    #[test]
    fn test_validate_rejects_flat_box() {
        let mut config = base_config();
        config.size_y = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_cpu() {
        let mut config = base_config();
        config.cpu = Some(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cpu"));
    }

    #[tokio::test]
    async fn test_write_config_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("job").join("ligand.conf");

        base_config().write_config_file(&path).await.unwrap();
        let body = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(body.starts_with("receptor = receptor.pdbqt\n"));
        assert!(body.ends_with("cpu = 12\n"));
    }
}
