//! End-to-end receptor preparation against the real external tools.
//!
//! Requires pdb2pqr and Open Babel on PATH, plus network access for the
//! input structure. Run with:
//! ```bash
//! cargo test --package oxidock-prep --test test_prep_e2e -- --ignored --nocapture
//! ```

use oxidock_prep::prepare::ReceptorPreparer;
use oxidock_prep::protonate::DEFAULT_PH;
use oxidock_structures::fetch::StructureFetcher;
use tempfile::tempdir;

#[tokio::test(flavor = "multi_thread")]
#[ignore] // Requires pdb2pqr and obabel binaries, plus network access
async fn test_prepare_6o0k_receptor() {
    let _ = tracing_subscriber::fmt::try_init();

    let dir = tempdir().unwrap();
    let fetcher = StructureFetcher::new(dir.path().join("structures"));
    let pdb = fetcher.fetch_pdb("6O0K").await.expect("PDB download failed");

    let preparer = ReceptorPreparer::new("pdb2pqr", "obabel");
    let pdbqt = preparer
        .prepare(&pdb, DEFAULT_PH, &dir.path().join("prepared"))
        .await
        .expect("receptor preparation failed");

    println!("Prepared receptor: {:?}", pdbqt);
    assert!(pdbqt.exists());
    assert_eq!(pdbqt.extension().and_then(|e| e.to_str()), Some("pdbqt"));
}
