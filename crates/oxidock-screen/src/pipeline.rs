//! End-to-end screening pipeline.
//!
//! Orchestrates the full flow for a single screening job:
//!   1. Resolve the receptor (RCSB download, AlphaFold download, or a
//!      local file)
//!   2. Prepare it with pdb2pqr and obabel, unless a ready PDBQT was given
//!   3. Dock each ligand into the configured search box
//!   4. Rank ligands by best binding affinity
//!   5. Emit progress events via broadcast channel
//!
//! Ligands are docked sequentially. The engine parallelizes its own
//! search across the configured cpu count, so concurrent engine runs
//! would only fight over cores.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use oxidock_prep::prepare::ReceptorPreparer;
use oxidock_prep::protonate::DEFAULT_PH;
use oxidock_structures::fetch::StructureFetcher;
use oxidock_vina::config::DockingConfig;
use oxidock_vina::engine::DockingEngine;
use oxidock_vina::runner::VinaRunner;

use crate::report::{rank_ligands, LigandResult};

// ── Job config ────────────────────────────────────────────────────────────────

/// Where the receptor comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ReceptorSpec {
    /// Fetch this entry from RCSB, then prepare it.
    Pdb(String),
    /// Fetch the AlphaFold model for this UniProt accession, then prepare it.
    AlphaFold(String),
    /// A local structure file that still needs preparation.
    Structure(PathBuf),
    /// A docking-ready PDBQT; preparation is skipped.
    Prepared(PathBuf),
}

/// Parameters for a single screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningJob {
    pub receptor: ReceptorSpec,
    /// Ligand PDBQT files, one engine run each.
    pub ligands: Vec<PathBuf>,
    /// Protonation pH for receptor preparation.
    pub ph: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub center_z: f64,
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
    /// Engine search controls; None leaves the engine's defaults in charge.
    pub cpu: Option<u32>,
    pub exhaustiveness: Option<u32>,
    pub num_modes: Option<u32>,
    pub energy_range: Option<f64>,
    pub seed: Option<i64>,
}

impl Default for ScreeningJob {
    fn default() -> Self {
        Self {
            receptor: ReceptorSpec::Pdb("6O0K".to_string()),
            ligands: Vec::new(),
            ph: DEFAULT_PH,
            center_x: 0.0,
            center_y: 0.0,
            center_z: 0.0,
            size_x: 20.0,
            size_y: 20.0,
            size_z: 20.0,
            cpu: None,
            exhaustiveness: None,
            num_modes: None,
            energy_range: None,
            seed: None,
        }
    }
}

// ── Progress events ───────────────────────────────────────────────────────────

/// Progress event emitted during a pipeline run (cloneable for broadcast).
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningProgress {
    pub job_id: Uuid,
    pub stage: String,
    pub message: String,
    pub ligands_total: usize,
    pub ligands_docked: usize,
    pub error: Option<String>,
}

impl ScreeningProgress {
    fn new(job_id: Uuid, stage: &str, message: &str) -> Self {
        Self {
            job_id,
            stage: stage.to_string(),
            message: message.to_string(),
            ligands_total: 0,
            ligands_docked: 0,
            error: None,
        }
    }
}

// ── Result summary ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ScreeningResult {
    pub job_id: Uuid,
    /// The prepared receptor actually used, if the receptor stage succeeded.
    pub receptor: Option<PathBuf>,
    pub ligands_total: usize,
    pub ligands_docked: usize,
    /// Docked ligands, strongest binder first.
    pub ranked: Vec<LigandResult>,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

// ── Pipeline orchestrator ─────────────────────────────────────────────────────

/// Runs screening jobs end to end.
///
/// Structure downloads, prepared receptors and docking outputs all land
/// under `work_dir`.
pub struct ScreeningPipeline {
    work_dir: PathBuf,
    engine: Arc<dyn DockingEngine>,
    pdb2pqr_path: PathBuf,
    obabel_path: PathBuf,
}

impl ScreeningPipeline {
    /// Create a pipeline that shells out to `vina`, `pdb2pqr` and `obabel`
    /// found on PATH.
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Self {
        Self {
            work_dir: work_dir.as_ref().to_path_buf(),
            engine: Arc::new(VinaRunner::new("vina")),
            pdb2pqr_path: PathBuf::from("pdb2pqr"),
            obabel_path: PathBuf::from("obabel"),
        }
    }

    /// Substitute the docking engine.
    pub fn with_engine(mut self, engine: Arc<dyn DockingEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Point receptor preparation at specific tool binaries.
    pub fn with_prep_tools<P: AsRef<Path>, Q: AsRef<Path>>(
        mut self,
        pdb2pqr: P,
        obabel: Q,
    ) -> Self {
        self.pdb2pqr_path = pdb2pqr.as_ref().to_path_buf();
        self.obabel_path = obabel.as_ref().to_path_buf();
        self
    }

    /// Run one screening job.
    ///
    /// Progress events are sent via `progress_tx` if provided. Per-ligand
    /// failures are collected and the run continues; only a failed
    /// receptor stage ends the run early.
    #[instrument(skip(self, progress_tx))]
    pub async fn run(
        &self,
        job: ScreeningJob,
        progress_tx: Option<broadcast::Sender<ScreeningProgress>>,
    ) -> ScreeningResult {
        let job_id = Uuid::new_v4();
        let t0 = std::time::Instant::now();

        info!(
            job_id = %job_id,
            receptor = ?job.receptor,
            ligands = job.ligands.len(),
            "Starting screening pipeline"
        );

        let emit = |stage: &str, msg: &str, mut prog: ScreeningProgress| {
            prog.stage = stage.to_string();
            prog.message = msg.to_string();
            if let Some(ref tx) = progress_tx {
                let _ = tx.send(prog);
            }
        };

        let mut result = ScreeningResult {
            job_id,
            receptor: None,
            ligands_total: job.ligands.len(),
            ligands_docked: 0,
            ranked: Vec::new(),
            errors: Vec::new(),
            duration_ms: 0,
        };

        let mut prog_base = ScreeningProgress::new(job_id, "receptor", "");
        prog_base.ligands_total = job.ligands.len();

        // ── 1. Resolve and prepare the receptor ───────────────────────────────
        emit(
            "receptor",
            &format!("Resolving receptor {:?}", job.receptor),
            prog_base.clone(),
        );

        let receptor = match self.resolve_receptor(&job).await {
            Ok(path) => path,
            Err(e) => {
                let msg = format!("receptor stage failed: {e}");
                warn!("{}", &msg);
                result.errors.push(msg.clone());
                let mut p = prog_base.clone();
                p.error = Some(msg.clone());
                emit("failed", &msg, p);
                result.duration_ms = t0.elapsed().as_millis() as u64;
                return result;
            }
        };
        result.receptor = Some(receptor.clone());

        // ── 2. Dock each ligand ───────────────────────────────────────────────
        let run_dir = self.work_dir.join("runs").join(job_id.to_string());
        if !job.ligands.is_empty() {
            if let Err(e) = tokio::fs::create_dir_all(&run_dir).await {
                let msg = format!("could not create run directory {:?}: {e}", run_dir);
                warn!("{}", &msg);
                result.errors.push(msg.clone());
                let mut p = prog_base.clone();
                p.error = Some(msg.clone());
                emit("failed", &msg, p);
                result.duration_ms = t0.elapsed().as_millis() as u64;
                return result;
            }
        }

        emit(
            "dock",
            &format!("Receptor ready, docking {} ligands", job.ligands.len()),
            prog_base.clone(),
        );

        let mut ligand_results = Vec::new();

        for ligand in &job.ligands {
            if !ligand.exists() {
                let msg = format!("ligand file not found: {:?}", ligand);
                warn!("{}", &msg);
                result.errors.push(msg);
                continue;
            }

            let stem = ligand
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "ligand".to_string());
            let out = run_dir.join(format!("{stem}_out.pdbqt"));

            let config = DockingConfig {
                receptor: receptor.clone(),
                ligand: ligand.clone(),
                center_x: job.center_x,
                center_y: job.center_y,
                center_z: job.center_z,
                size_x: job.size_x,
                size_y: job.size_y,
                size_z: job.size_z,
                cpu: job.cpu,
                exhaustiveness: job.exhaustiveness,
                num_modes: job.num_modes,
                energy_range: job.energy_range,
                seed: job.seed,
            };

            match self.engine.dock(&config, &out).await {
                Ok(outcome) => {
                    for w in &outcome.warnings {
                        warn!(ligand = ?ligand, "{}", w);
                    }
                    result.ligands_docked += 1;
                    info!(
                        ligand = ?ligand,
                        poses = outcome.poses.len(),
                        best = ?outcome.poses.first().map(|p| p.affinity),
                        "Ligand docked"
                    );
                    ligand_results.push(LigandResult {
                        ligand: ligand.clone(),
                        output: outcome.output,
                        poses: outcome.poses,
                    });
                    emit(
                        "dock",
                        &format!(
                            "{} of {} ligands docked",
                            result.ligands_docked, result.ligands_total
                        ),
                        {
                            let mut p = prog_base.clone();
                            p.ligands_docked = result.ligands_docked;
                            p
                        },
                    );
                }
                Err(e) => {
                    let msg = format!("docking failed for {:?}: {e}", ligand);
                    warn!("{}", &msg);
                    result.errors.push(msg);
                }
            }
        }

        // ── 3. Rank ───────────────────────────────────────────────────────────
        result.ranked = rank_ligands(ligand_results);
        result.duration_ms = t0.elapsed().as_millis() as u64;

        if let Some(top) = result.ranked.first() {
            info!(
                ligand = ?top.ligand,
                affinity = ?top.best_affinity(),
                "Best binder"
            );
        }

        info!(
            job_id         = %job_id,
            ligands_total  = result.ligands_total,
            ligands_docked = result.ligands_docked,
            duration_ms    = result.duration_ms,
            errors         = result.errors.len(),
            "Screening pipeline complete"
        );

        emit(
            "complete",
            &format!(
                "Done. {} of {} ligands docked, {} errors.",
                result.ligands_docked,
                result.ligands_total,
                result.errors.len()
            ),
            {
                let mut p = prog_base.clone();
                p.ligands_docked = result.ligands_docked;
                p
            },
        );

        result
    }

    /// Turn the job's receptor spec into a docking-ready PDBQT path.
    async fn resolve_receptor(&self, job: &ScreeningJob) -> crate::Result<PathBuf> {
        let structure = match &job.receptor {
            ReceptorSpec::Prepared(path) => {
                if !path.exists() {
                    anyhow::bail!("prepared receptor not found: {:?}", path);
                }
                return Ok(path.clone());
            }
            ReceptorSpec::Structure(path) => {
                if !path.exists() {
                    anyhow::bail!("receptor structure not found: {:?}", path);
                }
                path.clone()
            }
            ReceptorSpec::Pdb(id) => {
                let fetcher = StructureFetcher::new(self.work_dir.join("structures"));
                fetcher.fetch_pdb(id).await?
            }
            ReceptorSpec::AlphaFold(accession) => {
                let fetcher = StructureFetcher::new(self.work_dir.join("structures"));
                fetcher.fetch_alphafold(accession).await?
            }
        };

        let preparer = ReceptorPreparer::new(&self.pdb2pqr_path, &self.obabel_path);
        preparer
            .prepare(&structure, job.ph, &self.work_dir.join("prepared"))
            .await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use oxidock_vina::output::{DockingOutcome, DockingPose};
    use tempfile::tempdir;

    /// Engine double: scores by ligand file name, rejects "broken".
    struct FakeEngine;

    #[async_trait]
    impl DockingEngine for FakeEngine {
        async fn dock(
            &self,
            config: &DockingConfig,
            out: &Path,
        ) -> oxidock_vina::Result<DockingOutcome> {
            let stem = config
                .ligand
                .file_stem()
                .unwrap()
                .to_string_lossy()
                .into_owned();
            if stem.contains("broken") {
                anyhow::bail!("engine rejected {stem}");
            }
            let best = if stem.contains("strong") { -9.1 } else { -6.2 };
            tokio::fs::write(out, b"REMARK docked\n").await?;
            Ok(DockingOutcome {
                output: out.to_path_buf(),
                poses: vec![
                    DockingPose {
                        mode: 1,
                        affinity: best,
                        rmsd_lb: 0.0,
                        rmsd_ub: 0.0,
                    },
                    DockingPose {
                        mode: 2,
                        affinity: best + 0.8,
                        rmsd_lb: 1.2,
                        rmsd_ub: 2.4,
                    },
                ],
                warnings: Vec::new(),
                log: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_screening_ranks_and_collects_errors() {
        let dir = tempdir().unwrap();
        let receptor = dir.path().join("receptor.pdbqt");
        tokio::fs::write(&receptor, b"ATOM\n").await.unwrap();

        let weak = dir.path().join("weak.pdbqt");
        let strong = dir.path().join("strong.pdbqt");
        let broken = dir.path().join("broken.pdbqt");
        for f in [&weak, &strong, &broken] {
            tokio::fs::write(f, b"ATOM\n").await.unwrap();
        }

        let job = ScreeningJob {
            receptor: ReceptorSpec::Prepared(receptor),
            ligands: vec![
                weak.clone(),
                strong.clone(),
                broken,
                dir.path().join("missing.pdbqt"),
            ],
            ..Default::default()
        };

        let pipeline = ScreeningPipeline::new(dir.path()).with_engine(Arc::new(FakeEngine));
        let (tx, mut rx) = broadcast::channel(32);
        let result = pipeline.run(job, Some(tx)).await;

        assert_eq!(result.ligands_total, 4);
        assert_eq!(result.ligands_docked, 2);
        assert_eq!(result.errors.len(), 2);

        assert_eq!(result.ranked.len(), 2);
        assert_eq!(result.ranked[0].ligand, strong);
        assert_eq!(result.ranked[0].best_affinity(), Some(-9.1));
        assert_eq!(result.ranked[1].ligand, weak);
        assert!(result.ranked[0].output.exists());

        let mut stages = Vec::new();
        while let Ok(p) = rx.try_recv() {
            stages.push(p.stage);
        }
        assert_eq!(stages.first().map(String::as_str), Some("receptor"));
        assert_eq!(stages.last().map(String::as_str), Some("complete"));
    }

    #[tokio::test]
    async fn test_empty_ligand_list_completes_cleanly() {
        let dir = tempdir().unwrap();
        let receptor = dir.path().join("receptor.pdbqt");
        tokio::fs::write(&receptor, b"ATOM\n").await.unwrap();

        let job = ScreeningJob {
            receptor: ReceptorSpec::Prepared(receptor.clone()),
            ligands: Vec::new(),
            ..Default::default()
        };

        let pipeline = ScreeningPipeline::new(dir.path()).with_engine(Arc::new(FakeEngine));
        let result = pipeline.run(job, None).await;

        assert_eq!(result.receptor, Some(receptor));
        assert_eq!(result.ligands_docked, 0);
        assert!(result.ranked.is_empty());
        assert!(result.errors.is_empty());
        // No run directory appears when there is nothing to dock
        assert!(!dir.path().join("runs").exists());
    }

    #[tokio::test]
    async fn test_missing_prepared_receptor_fails_the_run() {
        let dir = tempdir().unwrap();
        let ligand = dir.path().join("lig.pdbqt");
        tokio::fs::write(&ligand, b"ATOM\n").await.unwrap();

        let job = ScreeningJob {
            receptor: ReceptorSpec::Prepared(dir.path().join("no-receptor.pdbqt")),
            ligands: vec![ligand],
            ..Default::default()
        };

        let pipeline = ScreeningPipeline::new(dir.path()).with_engine(Arc::new(FakeEngine));
        let (tx, mut rx) = broadcast::channel(8);
        let result = pipeline.run(job, Some(tx)).await;

        assert_eq!(result.receptor, None);
        assert_eq!(result.ligands_docked, 0);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("receptor stage failed"));

        let mut last = None;
        while let Ok(p) = rx.try_recv() {
            last = Some(p);
        }
        let last = last.unwrap();
        assert_eq!(last.stage, "failed");
        assert!(last.error.is_some());
    }

    #[test]
    fn test_receptor_spec_serde_tags() {
        let spec = ReceptorSpec::Pdb("6O0K".to_string());
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"pdb":"6O0K"}"#);

        let back: ReceptorSpec = serde_json::from_str(r#"{"alphafold":"P00533"}"#).unwrap();
        assert_eq!(back, ReceptorSpec::AlphaFold("P00533".to_string()));
    }
}
