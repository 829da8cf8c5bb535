//! Identifier validation for structure databases.
//!
//! Every fetch validates its identifier before any network traffic.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Four characters, leading digit 1-9 (zero is reserved), rest alphanumeric
    static ref PDB_ID_RE: Regex = Regex::new(r"^[1-9][A-Za-z0-9]{3}$").unwrap();
    // UniProt accession grammar, 6- and 10-character forms
    static ref UNIPROT_RE: Regex =
        Regex::new(r"^[OPQ][0-9][A-Z0-9]{3}[0-9]$|^[A-NR-Z][0-9]([A-Z][A-Z0-9]{2}[0-9]){1,2}$")
            .unwrap();
}

/// Returns true if `id` is a well-formed PDB entry ID (e.g. `6O0K`).
pub fn validate_pdb_id(id: &str) -> bool {
    PDB_ID_RE.is_match(id)
}

/// Returns true if `acc` is a well-formed UniProt accession (e.g. `P00533`).
pub fn validate_uniprot_accession(acc: &str) -> bool {
    UNIPROT_RE.is_match(acc)
}
