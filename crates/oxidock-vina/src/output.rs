//! Parsing of the engine's console transcript.
//!
//! A successful run prints a fixed-width result table:
//!
//! ```text
//! mode |   affinity | dist from best mode
//!      | (kcal/mol) | rmsd l.b.| rmsd u.b.
//! -----+------------+----------+----------
//!    1       -7.439          0          0
//!    2       -7.253      2.618      9.774
//! ```
//!
//! The parser anchors on the dashed separator and reads rows until the
//! first line that is not a table row.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One row of the engine's result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockingPose {
    /// Mode index as numbered by the engine; 1 is the best pose.
    pub mode: u32,
    /// Predicted binding affinity in kcal/mol; lower is stronger.
    pub affinity: f64,
    /// RMSD lower bound against the best mode.
    pub rmsd_lb: f64,
    /// RMSD upper bound against the best mode.
    pub rmsd_ub: f64,
}

/// Everything a completed engine run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockingOutcome {
    /// Structure file the engine wrote via `--out`.
    pub output: PathBuf,
    /// Result table rows in engine order.
    pub poses: Vec<DockingPose>,
    /// `WARNING:` lines from the transcript.
    pub warnings: Vec<String>,
    /// Full console transcript.
    pub log: String,
}

/// Parse the result table out of a console transcript.
///
/// The table is the contract: a transcript without one, or with no rows,
/// means the run did not produce poses and is treated as an error.
pub fn parse_output(log: &str) -> Result<Vec<DockingPose>> {
    let mut lines = log.lines();

    if !lines.any(|l| l.trim_start().starts_with("-----+")) {
        anyhow::bail!("no result table in engine output");
    }

    let mut poses = Vec::new();
    for line in lines {
        match parse_row(line) {
            Some(pose) => poses.push(pose),
            None => break,
        }
    }

    if poses.is_empty() {
        anyhow::bail!("result table contained no modes");
    }
    Ok(poses)
}

fn parse_row(line: &str) -> Option<DockingPose> {
    let mut parts = line.split_whitespace();
    let mode = parts.next()?.parse().ok()?;
    let affinity = parts.next()?.parse().ok()?;
    let rmsd_lb = parts.next()?.parse().ok()?;
    let rmsd_ub = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(DockingPose {
        mode,
        affinity,
        rmsd_lb,
        rmsd_ub,
    })
}

/// Collect the engine's warning lines.
pub fn collect_warnings(log: &str) -> Vec<String> {
    log.lines()
        .filter(|l| l.trim_start().starts_with("WARNING:"))
        .map(|l| l.trim().to_string())
        .collect()
}
