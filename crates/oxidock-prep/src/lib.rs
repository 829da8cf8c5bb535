//! Oxidock Prep - Receptor preparation by driving external tools.
//!
//! Turns a raw structure file into the PDBQT the docking engine consumes:
//! 1. Protonation at a target pH (pdb2pqr, AMBER force field, PROPKA titration)
//! 2. PQR to PDBQT conversion (Open Babel)
//!
//! The tools own all molecular file handling; this crate only moves paths.

pub mod protonate;
pub mod convert;
pub mod prepare;
