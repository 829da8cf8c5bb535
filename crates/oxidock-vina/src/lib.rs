//! Oxidock Vina - AutoDock Vina orchestration.
//!
//! This crate drives the external docking engine without reimplementing any
//! of it:
//! 1. A typed model of the engine's own configuration file
//! 2. Engine invocation, by direct arguments or by config file, with an
//!    optional wall-clock timeout
//! 3. Console transcript parsing into scored poses
//!
//! The docking search, the scoring function and the search parallelism all
//! live inside the engine binary; this crate prepares its inputs and
//! interprets its console output.

pub mod config;
pub mod engine;
pub mod output;
pub mod runner;

pub type Result<T> = anyhow::Result<T>;
