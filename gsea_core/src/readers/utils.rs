use serde::{Deserialize, Serialize};

/// One raw GMT record: a gene set id, its description/URL field, and its
/// member names, in the order the file listed them. Kept as an
/// intermediate representation between "what's on disk" and
/// [`crate::methods::gsea::GeneSet`], which has no notion of a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmtRecord {
    pub id: String,
    pub url: String,
    pub parts: Vec<String>,
}

impl From<GmtRecord> for crate::methods::gsea::GeneSet {
    fn from(record: GmtRecord) -> Self {
        crate::methods::gsea::GeneSet::new(record.id, record.parts)
    }
}
