//! Ranking and reporting of docked ligands.

use std::cmp::Ordering;
use std::path::PathBuf;

use serde::Serialize;

use oxidock_vina::output::DockingPose;

/// One docked ligand with everything the engine reported for it.
#[derive(Debug, Clone, Serialize)]
pub struct LigandResult {
    /// The ligand PDBQT that was docked.
    pub ligand: PathBuf,
    /// Where the engine wrote the docked poses.
    pub output: PathBuf,
    /// Scored poses in the engine's reported order (mode 1 first).
    pub poses: Vec<DockingPose>,
}

impl LigandResult {
    /// Best (most negative) binding affinity across all poses, in kcal/mol.
    pub fn best_affinity(&self) -> Option<f64> {
        best_pose(&self.poses).map(|p| p.affinity)
    }
}

/// The pose with the lowest binding affinity.
pub fn best_pose(poses: &[DockingPose]) -> Option<&DockingPose> {
    poses
        .iter()
        .min_by(|a, b| a.affinity.partial_cmp(&b.affinity).unwrap_or(Ordering::Equal))
}

/// Poses within `margin` kcal/mol of the best one.
///
/// Useful for deciding whether a binder has a single dominant pose or a
/// cluster of near-equivalent ones.
pub fn poses_within(poses: &[DockingPose], margin: f64) -> Vec<&DockingPose> {
    let Some(best) = best_pose(poses) else {
        return Vec::new();
    };
    poses
        .iter()
        .filter(|p| p.affinity <= best.affinity + margin)
        .collect()
}

/// Rank ligands by best binding affinity, strongest binder first.
///
/// Ligands without any pose sort last.
pub fn rank_ligands(mut results: Vec<LigandResult>) -> Vec<LigandResult> {
    results.sort_by(|a, b| match (a.best_affinity(), b.best_affinity()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(mode: u32, affinity: f64) -> DockingPose {
        DockingPose {
            mode,
            affinity,
            rmsd_lb: 0.0,
            rmsd_ub: 0.0,
        }
    }

    fn result(name: &str, affinities: &[f64]) -> LigandResult {
        LigandResult {
            ligand: PathBuf::from(format!("{name}.pdbqt")),
            output: PathBuf::from(format!("{name}_out.pdbqt")),
            poses: affinities
                .iter()
                .enumerate()
                .map(|(i, a)| pose(i as u32 + 1, *a))
                .collect(),
        }
    }

    #[test]
    fn test_best_affinity_is_most_negative() {
        let r = result("lig", &[-6.2, -7.4, -5.9]);
        assert_eq!(r.best_affinity(), Some(-7.4));
    }

    #[test]
    fn test_best_affinity_empty_poses() {
        let r = result("lig", &[]);
        assert_eq!(r.best_affinity(), None);
    }

    #[test]
    fn test_rank_strongest_first_and_empty_last() {
        let ranked = rank_ligands(vec![
            result("weak", &[-5.1]),
            result("none", &[]),
            result("strong", &[-9.3, -8.8]),
        ]);
        assert_eq!(ranked[0].ligand, PathBuf::from("strong.pdbqt"));
        assert_eq!(ranked[1].ligand, PathBuf::from("weak.pdbqt"));
        assert_eq!(ranked[2].ligand, PathBuf::from("none.pdbqt"));
    }

    #[test]
    fn test_poses_within_margin() {
        let poses = vec![pose(1, -7.4), pose(2, -7.1), pose(3, -5.0)];
        let close = poses_within(&poses, 0.5);
        assert_eq!(close.len(), 2);
        assert!(close.iter().all(|p| p.affinity <= -7.1));
    }

    #[test]
    fn test_poses_within_empty() {
        assert!(poses_within(&[], 1.0).is_empty());
    }
}
