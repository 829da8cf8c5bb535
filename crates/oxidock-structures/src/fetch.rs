//! PDB and AlphaFold structure fetching.
//!
//! Downloads are cache-first: a file already present under the cache
//! directory is returned without touching the network.

use oxidock_common::error::{OxidockError, Result};
use oxidock_common::sandbox::SandboxClient as Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::ids::{validate_pdb_id, validate_uniprot_accession};

/// Client for fetching receptor structures from PDB and AlphaFold.
pub struct StructureFetcher {
    client: Client,
    cache_dir: PathBuf,
}

impl StructureFetcher {
    /// Create a new StructureFetcher with the given cache directory.
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Self {
        Self {
            client: Client::new().unwrap(),
            cache_dir: cache_dir.as_ref().to_path_buf(),
        }
    }

    /// Fetch a PDB file by its entry ID.
    pub async fn fetch_pdb(&self, pdb_id: &str) -> Result<PathBuf> {
        if !validate_pdb_id(pdb_id) {
            return Err(OxidockError::InvalidId(format!(
                "not a PDB entry ID: {pdb_id}"
            )));
        }

        let file_name = format!("{}.pdb", pdb_id.to_lowercase());
        let file_path = self.cache_dir.join(&file_name);

        if file_path.exists() {
            debug!("PDB {} found in cache", pdb_id);
            return Ok(file_path);
        }

        info!("Fetching PDB {} from RCSB", pdb_id);
        let url = format!("https://files.rcsb.org/download/{}", file_name);
        let response = self.client.get(&url)?.send().await?.error_for_status()?;
        let content = response.bytes().await?;

        fs::create_dir_all(&self.cache_dir).await?;
        fs::write(&file_path, content).await?;

        Ok(file_path)
    }

    /// Fetch an AlphaFold model by UniProt accession.
    pub async fn fetch_alphafold(&self, uniprot_id: &str) -> Result<PathBuf> {
        if !validate_uniprot_accession(uniprot_id) {
            return Err(OxidockError::InvalidId(format!(
                "not a UniProt accession: {uniprot_id}"
            )));
        }

        let file_name = format!("AF-{}-F1-model_v4.pdb", uniprot_id);
        let file_path = self.cache_dir.join(&file_name);

        if file_path.exists() {
            debug!("AlphaFold model for {} found in cache", uniprot_id);
            return Ok(file_path);
        }

        info!("Fetching AlphaFold model for {} from EBI", uniprot_id);
        let url = format!("https://alphafold.ebi.ac.uk/files/{}", file_name);
        let response = self.client.get(&url)?.send().await?.error_for_status()?;
        let content = response.bytes().await?;

        fs::create_dir_all(&self.cache_dir).await?;
        fs::write(&file_path, content).await?;

        Ok(file_path)
    }
}
