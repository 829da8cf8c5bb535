//! Oxidock Screen - End-to-end receptor preparation and ligand docking.
//!
//! This crate ties the other Oxidock crates together into one pipeline:
//! 1. Resolve the receptor (download by ID, or take a local file)
//! 2. Prepare it for docking (protonation, PDBQT conversion)
//! 3. Dock each ligand with the configured engine
//! 4. Rank the docked ligands by best binding affinity
//!
//! Progress events are emitted via a broadcast channel so callers can
//! follow a run without polling.

pub mod pipeline;
pub mod report;

pub type Result<T> = anyhow::Result<T>;
