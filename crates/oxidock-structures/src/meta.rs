//! Entry metadata from the RCSB Data API.
//!
//! Endpoints used:
//!   entry:          https://data.rcsb.org/rest/v1/core/entry/{id}
//!   polymer entity: https://data.rcsb.org/rest/v1/core/polymer_entity/{id}/1
//!   chem comp:      https://data.rcsb.org/rest/v1/core/chemcomp/{comp_id}
//!
//! The upstream records omit sections freely depending on experiment type
//! and deposition age, so extraction never fails on a missing field; only
//! transport errors propagate.

use chrono::NaiveDate;
use oxidock_common::error::{OxidockError, Result};
use oxidock_common::sandbox::SandboxClient as Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::ids::validate_pdb_id;

const DATA_API_URL: &str = "https://data.rcsb.org/rest/v1/core";

/// Descriptive metadata for one PDB entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub pdb_id: String,
    pub title: Option<String>,
    pub experiment_method: Option<String>,
    pub resolution_angstrom: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub classification: Option<String>,
    pub macromolecule_name: Option<String>,
    pub molecular_weight_kda: Option<f64>,
    /// Deposited polymer chains in the asymmetric unit.
    pub polymer_chain_count: Option<u64>,
    /// Distinct protein entities, irrespective of copy number.
    pub unique_protein_chains: Option<u64>,
    pub organism: Option<String>,
    pub expression_system: Option<String>,
    pub has_mutations: bool,
    pub ligands: Vec<BoundLigand>,
}

/// One small molecule bound in the deposited structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundLigand {
    pub chem_comp_id: String,
    pub name: Option<String>,
}

/// Client for the RCSB Data API.
pub struct RcsbDataClient {
    client: Client,
}

impl RcsbDataClient {
    /// Create a new RcsbDataClient.
    pub fn new() -> Self {
        Self {
            client: Client::new().unwrap(),
        }
    }

    /// Fetch descriptive metadata for a PDB entry.
    ///
    /// Returns `Ok(None)` for well-formed IDs the archive does not know.
    #[instrument(skip(self))]
    pub async fn fetch_entry_metadata(&self, pdb_id: &str) -> Result<Option<EntryMetadata>> {
        if !validate_pdb_id(pdb_id) {
            return Err(OxidockError::InvalidId(format!(
                "not a PDB entry ID: {pdb_id}"
            )));
        }
        let id = pdb_id.to_uppercase();

        let url = format!("{}/entry/{}", DATA_API_URL, id);
        let resp = self.client.get(&url)?.send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("Entry {} not found in the archive", id);
            return Ok(None);
        }
        let entry: Value = resp.error_for_status()?.json().await?;

        let mut meta = extract_entry(&id, &entry);

        // The first polymer entity carries the biological description
        match self.fetch_polymer_entity(&id).await {
            Ok(entity) => apply_entity(&mut meta, &entity),
            Err(e) => warn!("Polymer entity lookup for {} failed: {}", id, e),
        }

        // Resolve bound component IDs to chemical names
        for ligand in &mut meta.ligands {
            match self.fetch_chem_comp_name(&ligand.chem_comp_id).await {
                Ok(name) => ligand.name = name,
                Err(e) => {
                    warn!("Chemical component {} lookup failed: {}", ligand.chem_comp_id, e);
                }
            }
        }

        Ok(Some(meta))
    }

    #[instrument(skip(self))]
    async fn fetch_polymer_entity(&self, pdb_id: &str) -> Result<Value> {
        let url = format!("{}/polymer_entity/{}/1", DATA_API_URL, pdb_id);
        let entity: Value = self
            .client
            .get(&url)?
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(entity)
    }

    #[instrument(skip(self))]
    async fn fetch_chem_comp_name(&self, comp_id: &str) -> Result<Option<String>> {
        let url = format!("{}/chemcomp/{}", DATA_API_URL, comp_id);
        let comp: Value = self
            .client
            .get(&url)?
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(str_at(&comp, &["chem_comp", "name"]))
    }
}

// ── Record extraction ─────────────────────────────────────────────────────────

/// Pick the entry-level fields out of a core entry record.
fn extract_entry(pdb_id: &str, entry: &Value) -> EntryMetadata {
    let info = &entry["rcsb_entry_info"];

    let ligands = info["nonpolymer_bound_components"]
        .as_array()
        .unwrap_or(&vec![])
        .iter()
        .filter_map(|v| v.as_str())
        .map(|id| BoundLigand {
            chem_comp_id: id.to_string(),
            name: None,
        })
        .collect();

    EntryMetadata {
        pdb_id: pdb_id.to_string(),
        title: str_at(entry, &["struct", "title"]),
        experiment_method: entry["exptl"][0]["method"].as_str().map(String::from),
        resolution_angstrom: info["resolution_combined"][0].as_f64(),
        release_date: release_date(entry),
        classification: str_at(entry, &["struct_keywords", "pdbx_keywords"]),
        macromolecule_name: None,
        molecular_weight_kda: info["molecular_weight"].as_f64(),
        polymer_chain_count: info["deposited_polymer_entity_instance_count"].as_u64(),
        unique_protein_chains: info["polymer_entity_count_protein"].as_u64(),
        organism: None,
        expression_system: None,
        has_mutations: false,
        ligands,
    }
}

/// Fold the first polymer entity record into the metadata.
fn apply_entity(meta: &mut EntryMetadata, entity: &Value) {
    meta.macromolecule_name = str_at(entity, &["rcsb_polymer_entity", "pdbx_description"]);
    meta.organism = entity["rcsb_entity_source_organism"][0]["ncbi_scientific_name"]
        .as_str()
        .map(String::from);
    meta.expression_system = entity["rcsb_entity_host_organism"][0]["ncbi_scientific_name"]
        .as_str()
        .map(String::from);
    meta.has_mutations = entity["entity_poly"]["rcsb_mutation_count"]
        .as_u64()
        .unwrap_or(0)
        > 0;
}

fn str_at(v: &Value, path: &[&str]) -> Option<String> {
    let mut cur = v;
    for key in path {
        cur = &cur[*key];
    }
    cur.as_str().map(String::from)
}

/// Release dates arrive as ISO datetimes; only the date part is kept.
fn release_date(entry: &Value) -> Option<NaiveDate> {
    entry["rcsb_accession_info"]["initial_release_date"]
        .as_str()
        .and_then(|s| s.get(..10))
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
