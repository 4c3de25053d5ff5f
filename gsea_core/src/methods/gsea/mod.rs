//! The GSEA enrichment kernel: a weighted Kolmogorov-Smirnov running-sum
//! statistic over a ranked feature list, plus the permutation framework
//! used to assess its significance.

pub mod cohort;
pub mod gene_set;
pub mod kernel;
pub mod mannwhitney;
pub mod metric;
pub mod permute;
pub mod progress;
pub mod ranked_list;
pub mod result;
pub mod seed;

pub use cohort::GeneSetCohort;
pub use gene_set::GeneSet;
pub use kernel::{EnrichmentScore, EnrichmentScoreCohort, EsVariant};
pub use metric::{Dataset, Metric, MetricParams, SortMode, Template};
pub use permute::{
    FeatureMarkerAccumulator, FeatureMarkerStats, NullPermutationTest, PermutationTest,
    TemplateRandomizerType,
};
pub use progress::{NullProgressSink, ProgressSink, StreamProgressSink};
pub use ranked_list::{Order, RankedList};
pub use result::{EnrichmentDb, EnrichmentResult};
pub use seed::RandomSeedGenerator;

use crate::error::GseaError;

/// Parameters shared by both `executeGsea` entry points.
#[derive(Debug, Clone)]
pub struct GseaConfig {
    /// Power to raise each rank during enrichment scoring.
    pub p: f64,
    /// Minimum qualified overlap a gene set must have to be scored.
    pub min_overlap: i32,
    /// Maximum qualified overlap a gene set must have to be scored.
    pub max_overlap: i32,
    /// Number of permutations to use in the analysis.
    pub permutations: usize,
    /// Metric used to score a dataset into a ranked list (dataset-driven path only).
    pub metric: Metric,
    pub sort: SortMode,
    pub order: Order,
    pub metric_params: MetricParams,
    /// `true`: re-rank the dataset under a permuted template each
    /// iteration (template shuffling). `false`: hold the real ranked list
    /// fixed and draw random gene sets instead (gene-set shuffling), even
    /// when a dataset/template is available.
    pub permute_template: bool,
    pub randomizer: TemplateRandomizerType,
    /// Number of top/bottom features to retain marker statistics for.
    /// Informational only — the kernel always accumulates every feature's
    /// permutation scores; downstream reporting decides how many to show.
    pub num_markers: usize,
    pub retain_rnd_lists: bool,
}

impl Default for GseaConfig {
    fn default() -> Self {
        GseaConfig {
            p: 1.0,
            min_overlap: 15,
            max_overlap: 500,
            permutations: 1000,
            metric: Metric::SignalToNoise,
            sort: SortMode::Real,
            order: Order::Descending,
            metric_params: MetricParams::default(),
            permute_template: true,
            randomizer: TemplateRandomizerType::NoBalance,
            num_markers: 50,
            retain_rnd_lists: false,
        }
    }
}

fn overlap_count(ranked_list: &RankedList, gene_set: &GeneSet) -> i32 {
    gene_set
        .members()
        .filter(|m| ranked_list.contains(m))
        .count() as i32
}

/// Keeps only the gene sets whose qualified overlap with `ranked_list`
/// falls within `[min_overlap, max_overlap]`, the same overlap gate the
/// teacher's GSEA scoring applies per set before running the kernel.
fn filter_by_overlap(
    ranked_list: &RankedList,
    gene_sets: &[GeneSet],
    min_overlap: i32,
    max_overlap: i32,
) -> Vec<GeneSet> {
    gene_sets
        .iter()
        .filter(|gs| {
            let overlap = overlap_count(ranked_list, gs);
            overlap >= min_overlap && overlap <= max_overlap
        })
        .cloned()
        .collect()
}

/// Pre-ranked mode: the ranked list is already known, so only gene-set
/// shuffling applies.
pub fn execute_gsea_preranked(
    ranked_list: RankedList,
    gene_sets: &[GeneSet],
    config: &GseaConfig,
    seeds: RandomSeedGenerator,
) -> Result<EnrichmentDb, GseaError> {
    let qualifying = filter_by_overlap(&ranked_list, gene_sets, config.min_overlap, config.max_overlap);
    if qualifying.is_empty() {
        return Err(GseaError::InvalidArgument(
            "no gene set qualifies under the configured overlap bounds".to_string(),
        ));
    }
    let (set_ids, real_scores, rnd_es) = permute::gene_set_shuffle(
        &ranked_list,
        &qualifying,
        config.permutations,
        config.p,
        seeds,
    )?;

    let results = set_ids
        .into_iter()
        .enumerate()
        .map(|(g, set_id)| {
            result::aggregate_result(
                set_id,
                real_scores.es(g),
                real_scores.hit_count(g),
                real_scores.mann_whitney_u(g),
                rnd_es[g].clone(),
            )
        })
        .collect();

    Ok(EnrichmentDb {
        ranked_list,
        dataset: None,
        template: None,
        results,
        metric: None,
        sort: config.sort,
        order: config.order,
        nperm: config.permutations,
        marker_stats: None,
        retained_rnd_lists: None,
    })
}

/// Dataset-driven mode: scores the dataset into a real ranked list, then
/// runs either template shuffling or gene-set shuffling per
/// `config.permute_template`.
#[allow(clippy::too_many_arguments)]
pub fn execute_gsea_from_dataset(
    dataset: Dataset,
    template: Template,
    gene_sets: &[GeneSet],
    config: &GseaConfig,
    seeds: RandomSeedGenerator,
    progress: &mut dyn ProgressSink,
    marker_test: &mut dyn PermutationTest,
) -> Result<EnrichmentDb, GseaError> {
    if config.permute_template {
        let real_ranked_list = metric::score_dataset(
            config.metric,
            config.sort,
            config.order,
            &config.metric_params,
            &dataset,
            &template,
        )?;
        let qualifying = filter_by_overlap(
            &real_ranked_list,
            gene_sets,
            config.min_overlap,
            config.max_overlap,
        );
        if qualifying.is_empty() {
            return Err(GseaError::InvalidArgument(
                "no gene set qualifies under the configured overlap bounds".to_string(),
            ));
        }
        let (ranked_list, real_scores, rnd_ess, retained, marker_stats) = permute::template_shuffle(
            &dataset,
            &template,
            &qualifying,
            config.permutations,
            config.metric,
            config.sort,
            config.order,
            &config.metric_params,
            config.p,
            config.randomizer,
            seeds,
            progress,
            marker_test,
            config.retain_rnd_lists,
        )?;
        let results = qualifying
            .iter()
            .enumerate()
            .map(|(g, gs)| {
                result::aggregate_result(
                    gs.id().to_string(),
                    real_scores.es(g),
                    real_scores.hit_count(g),
                    real_scores.mann_whitney_u(g),
                    rnd_ess[g].clone(),
                )
            })
            .collect();
        Ok(EnrichmentDb {
            ranked_list,
            dataset: Some(dataset),
            template: Some(template),
            results,
            metric: Some(config.metric),
            sort: config.sort,
            order: config.order,
            nperm: config.permutations,
            marker_stats,
            retained_rnd_lists: if config.retain_rnd_lists {
                Some(retained)
            } else {
                None
            },
        })
    } else {
        let real_ranked_list = metric::score_dataset(
            config.metric,
            config.sort,
            config.order,
            &config.metric_params,
            &dataset,
            &template,
        )?;
        let mut db = execute_gsea_preranked(real_ranked_list, gene_sets, config, seeds)?;
        db.dataset = Some(dataset);
        db.template = Some(template);
        db.metric = Some(config.metric);
        Ok(db)
    }
}
