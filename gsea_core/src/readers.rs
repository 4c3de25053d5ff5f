pub mod utils;

use crate::methods::gsea::{GeneSet, Order, RankedList};
use std::fs::File;
use utils::GmtRecord;

/// Read GMT file from specified path. For format description, see [broadinstitute.org](https://software.broadinstitute.org/cancer/software/gsea/wiki/index.php/Data_formats#GMT:_Gene_Matrix_Transposed_file_format_.28.2A.gmt.29)
///
/// # Parameters
///
/// - `path` - A [`String`] of the path of the GMT to read.
///
/// # Returns
///
/// A [`Vec<GeneSet>`] containing one set per line of the GMT.
pub fn read_gmt_file(path: String) -> Result<Vec<GeneSet>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .has_headers(false)
        .from_reader(file);
    let mut sets = Vec::new();
    for r in rdr.records() {
        let result = r?.iter().map(|x| x.to_string()).collect::<Vec<String>>();
        let id = result
            .first()
            .ok_or("GMT line is missing an id field")?
            .to_owned();
        let url = result
            .get(1)
            .ok_or("GMT line is missing a url field")?
            .to_owned();
        let parts = result[2..].to_vec();
        sets.push(GeneSet::from(GmtRecord { id, url, parts }));
    }
    Ok(sets)
}

/// Reads a two-column `(feature, rank)` file into a [`RankedList`], sorted
/// descending by score as GSEA's own `.rnk` convention expects.
pub fn read_rank_file(path: String) -> Result<RankedList, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .has_headers(false)
        .from_reader(file);
    let mut items: Vec<(String, f64)> = Vec::new();
    for r in rdr.records() {
        let result = r?.iter().map(|x| x.to_string()).collect::<Vec<String>>();
        let name = result
            .first()
            .ok_or("rank line is missing a feature name")?
            .to_owned();
        let score: f64 = result
            .get(1)
            .ok_or("rank line is missing a score")?
            .parse()?;
        items.push((name, score));
    }
    items.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    Ok(RankedList::new(items, Order::Descending)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_rank_file_sorted_descending() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "g1\t1.0").unwrap();
        writeln!(file, "g2\t5.0").unwrap();
        writeln!(file, "g3\t-2.0").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let ranked = read_rank_file(path).unwrap();
        assert_eq!(ranked.name_at(0), "g2");
        assert_eq!(ranked.name_at(2), "g3");
    }

    #[test]
    fn reads_gmt_file_into_gene_sets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SET_A\thttp://example\tg1\tg2\tg3").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let sets = read_gmt_file(path).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].id(), "SET_A");
        assert_eq!(sets[0].num_members(), 3);
    }
}
