/// Collection of utilities to save results to a file/folder

use std::fs::File;
use std::io::prelude::*;

/// Dumps an [`EnrichmentDb`](crate::methods::gsea::EnrichmentDb)'s per-set
/// results as JSON. Just structural persistence for the CLI demo, not part
/// of the kernel's contract; the kernel itself never touches the filesystem.
pub fn save_gsea_results(
    path: String,
    db: &crate::methods::gsea::EnrichmentDb,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(path)?;
    let json = serde_json::to_string(&db.results)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
