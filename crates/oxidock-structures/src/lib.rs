//! Oxidock Structures - Retrieval of receptor structures and entry metadata.
//!
//! This crate covers everything upstream of receptor preparation:
//! 1. Identifier validation (PDB entry IDs, UniProt accessions)
//! 2. Structure downloads with a local file cache (RCSB PDB / AlphaFold)
//! 3. Descriptive entry metadata from the RCSB Data API
//!
//! Downloaded files are stored verbatim and handed on as opaque paths;
//! nothing here reads molecular file contents.

pub mod ids;
pub mod fetch;
pub mod meta;
