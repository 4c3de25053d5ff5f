use super::gene_set::GeneSet;
use super::ranked_list::RankedList;
use crate::error::GseaError;
use ahash::AHashMap;

/// Fallback weight substituted whenever a hit weight (or the normalizer it
/// derives from) collapses to zero, NaN, or infinity.
pub const FALLBACK_WEIGHT: f64 = 1e-6;

struct SetTables {
    /// `Z_g`: sum of `|score|^p` over qualified members. `z_degenerate` is
    /// set when this is zero/NaN/Inf, in which case every hit in the set
    /// falls back to [`FALLBACK_WEIGHT`] regardless of the feature's score.
    z: f64,
    z_degenerate: bool,
    num_true: usize,
    miss_points: f64,
}

/// Immutable binding of one [`RankedList`] and `K` [`GeneSet`]s, with
/// precomputed per-set hit/miss weights and an inverted feature -> gene-set
/// index. This is the object the KS kernel actually walks.
///
/// `'rl` is the ranked list's lifetime, `'gs` the gene sets' — kept
/// independent so [`GeneSetCohort::clone_with`] can rebind a fresh slice of
/// (e.g. randomly synthesized) gene sets without re-touching the ranked
/// list.
pub struct GeneSetCohort<'rl, 'gs> {
    ranked_list: &'rl RankedList,
    gene_sets: &'gs [GeneSet],
    p: f64,
    tables: Vec<SetTables>,
    inverted_index: AHashMap<String, Vec<usize>>,
}

impl<'rl, 'gs> GeneSetCohort<'rl, 'gs> {
    /// Builds a cohort, precomputing `Z_g`, miss weights, and the inverted
    /// index in a single pass over each gene set's members.
    ///
    /// `qualify` controls whether a gene set reduced to zero qualified
    /// members is a hard error (`true`, the default path) or silently
    /// trusted to have been filtered already by the caller (`false`, used
    /// by [`Self::clone_with`] when the caller — e.g. the gene-set-shuffle
    /// driver — has already guaranteed non-degeneracy by construction).
    pub fn construct(
        ranked_list: &'rl RankedList,
        gene_sets: &'gs [GeneSet],
        qualify: bool,
        p: f64,
    ) -> Result<Self, GseaError> {
        if ranked_list.is_empty() {
            return Err(GseaError::InvalidArgument(
                "ranked list is empty".to_string(),
            ));
        }
        if gene_sets.is_empty() {
            return Err(GseaError::InvalidArgument(
                "cohort requires at least one gene set".to_string(),
            ));
        }
        let mut tables = Vec::with_capacity(gene_sets.len());
        let mut inverted_index: AHashMap<String, Vec<usize>> = AHashMap::default();
        for (g_idx, gset) in gene_sets.iter().enumerate() {
            let mut z = 0.0_f64;
            let mut num_true = 0usize;
            for member in gset.members() {
                let Some(rank) = ranked_list.rank_of(member) else {
                    continue;
                };
                num_true += 1;
                let score = ranked_list.score_at(rank);
                z += score.abs().powf(p);
                inverted_index
                    .entry(member.to_string())
                    .or_default()
                    .push(g_idx);
            }
            if num_true == 0 {
                if qualify {
                    return Err(GseaError::GeneSetDegenerate {
                        set_id: gset.id().to_string(),
                    });
                }
            }
            let z_degenerate = !z.is_finite() || z == 0.0;
            let miss_points = 1.0 / (ranked_list.len() - num_true) as f64;
            tables.push(SetTables {
                z,
                z_degenerate,
                num_true,
                miss_points,
            });
        }
        Ok(GeneSetCohort {
            ranked_list,
            gene_sets,
            p,
            tables,
            inverted_index,
        })
    }

    /// Rebuilds a cohort sharing this one's ranked list but swapping in a
    /// different slice of gene sets — the amortization path used by
    /// gene-set shuffling.
    pub fn clone_with<'ngs>(
        &self,
        new_gene_sets: &'ngs [GeneSet],
        qualify: bool,
    ) -> Result<GeneSetCohort<'rl, 'ngs>, GseaError> {
        GeneSetCohort::construct(self.ranked_list, new_gene_sets, qualify, self.p)
    }

    pub fn ranked_list(&self) -> &RankedList {
        self.ranked_list
    }

    pub fn num_sets(&self) -> usize {
        self.gene_sets.len()
    }

    pub fn gene_set(&self, g: usize) -> &GeneSet {
        &self.gene_sets[g]
    }

    pub fn num_true(&self, g: usize) -> usize {
        self.tables[g].num_true
    }

    /// `true` iff `name` is a member of gene set `g` and present in the
    /// ranked list.
    pub fn is_member(&self, g: usize, name: &str) -> bool {
        self.gene_sets[g].contains(name) && self.ranked_list.contains(name)
    }

    /// Weight added to the running score on a hit at `rank` for set `g`.
    pub fn hit_points(&self, g: usize, rank: usize) -> f64 {
        let table = &self.tables[g];
        if table.z_degenerate {
            return FALLBACK_WEIGHT;
        }
        let score = self.ranked_list.score_at(rank);
        let weight = score.abs().powf(self.p) / table.z;
        if weight.is_finite() {
            weight
        } else {
            FALLBACK_WEIGHT
        }
    }

    /// Weight subtracted from the running score on a non-hit for set `g`.
    pub fn miss_points(&self, g: usize) -> f64 {
        self.tables[g].miss_points
    }

    /// Gene-set indices (within this cohort) that contain `name` and are
    /// qualified against the ranked list. Empty when `name` belongs to no
    /// set.
    pub fn geneset_indices_for_gene(&self, name: &str) -> &[usize] {
        self.inverted_index
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
