use super::cohort::GeneSetCohort;
use super::gene_set::GeneSet;
use super::kernel::run_kernel;
use super::metric::{score_dataset, Dataset, Metric, MetricParams, SortMode, Template};
use super::progress::{report_if_due, ProgressSink};
use super::ranked_list::{Order, RankedList};
use super::seed::RandomSeedGenerator;
use crate::error::GseaError;
use rand::seq::index::sample;
use rand::seq::SliceRandom;
use rayon::prelude::*;

/// Null model for phenotype shuffling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRandomizerType {
    NoBalance,
    BalanceWithinClass,
}

/// Accepts each randomized ranked list produced during template shuffling
/// and is finalized exactly once.
/// Treated as an external collaborator: the kernel only needs these two
/// calls honored in order.
pub trait PermutationTest {
    fn add_rnd(&mut self, template: &Template, ranked_list: &RankedList);
    fn do_calc(&mut self);
    /// Statistics computed by `do_calc`, if this test produces any.
    fn stats(&self) -> Option<FeatureMarkerStats> {
        None
    }
}

/// A `PermutationTest` that does nothing — the default when the caller
/// doesn't need feature-marker statistics.
#[derive(Debug, Default)]
pub struct NullPermutationTest;

impl PermutationTest for NullPermutationTest {
    fn add_rnd(&mut self, _template: &Template, _ranked_list: &RankedList) {}
    fn do_calc(&mut self) {}
}

/// Accumulates each feature's score across random templates and finalizes
/// into a per-feature mean/stddev for downstream feature-marker reporting.
#[derive(Debug, Default)]
pub struct FeatureMarkerAccumulator {
    sums: ahash::AHashMap<String, f64>,
    sums_sq: ahash::AHashMap<String, f64>,
    count: usize,
    pub stats: Option<FeatureMarkerStats>,
}

#[derive(Debug, Clone)]
pub struct FeatureMarkerStats {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub std_dev: Vec<f64>,
}

impl PermutationTest for FeatureMarkerAccumulator {
    fn add_rnd(&mut self, _template: &Template, ranked_list: &RankedList) {
        self.count += 1;
        for (name, score) in ranked_list.names().iter().zip(ranked_list.scores()) {
            *self.sums.entry(name.clone()).or_insert(0.0) += score;
            *self.sums_sq.entry(name.clone()).or_insert(0.0) += score * score;
        }
    }

    fn do_calc(&mut self) {
        let n = self.count.max(1) as f64;
        let mut feature_names: Vec<String> = self.sums.keys().cloned().collect();
        feature_names.sort();
        let mut mean = Vec::with_capacity(feature_names.len());
        let mut std_dev = Vec::with_capacity(feature_names.len());
        for name in &feature_names {
            let sum = self.sums[name];
            let sum_sq = self.sums_sq[name];
            let m = sum / n;
            let var = (sum_sq / n - m * m).max(0.0);
            mean.push(m);
            std_dev.push(var.sqrt());
        }
        self.stats = Some(FeatureMarkerStats {
            feature_names,
            mean,
            std_dev,
        });
    }

    fn stats(&self) -> Option<FeatureMarkerStats> {
        self.stats.clone()
    }
}

/// Draws a random template under the requested null model, preserving each
/// class's sample count exactly (any permutation of a fixed-size label
/// vector does). `BalanceWithinClass` additionally guards against the
/// shuffle degenerating to the identity permutation on tiny sample sizes,
/// which `NoBalance` does not bother to rule out.
pub fn randomize_template(
    template: &Template,
    kind: TemplateRandomizerType,
    rng: &mut impl rand::Rng,
) -> Template {
    let mut order: Vec<usize> = (0..template.len()).collect();
    order.shuffle(rng);
    if kind == TemplateRandomizerType::BalanceWithinClass
        && template.len() > 1
        && order == (0..template.len()).collect::<Vec<_>>()
    {
        order.swap(0, 1);
    }
    let labels = order.iter().map(|&i| template.labels[i].clone()).collect();
    template.with_labels(labels)
}

/// Gene-set shuffling: for each real gene set, synthesize `nperm` random
/// sets of the same qualified size from the ranked list's universe.
pub fn gene_set_shuffle(
    real_ranked_list: &RankedList,
    real_gene_sets: &[GeneSet],
    nperm: usize,
    p: f64,
    seeds: RandomSeedGenerator,
) -> Result<(Vec<String>, super::kernel::EnrichmentScoreCohort, Vec<Vec<f32>>), GseaError> {
    let real_cohort = GeneSetCohort::construct(real_ranked_list, real_gene_sets, true, p)?;
    let real_scores = run_kernel(&real_cohort, true)?;
    let universe_len = real_ranked_list.len();

    let rnd_es: Vec<Vec<f32>> = (0..real_gene_sets.len())
        .into_par_iter()
        .map(|g| -> Result<Vec<f32>, GseaError> {
            let q = real_cohort.num_true(g);
            let set_id = real_gene_sets[g].id().to_string();
            (0..nperm)
                .into_par_iter()
                .map(|c| -> Result<f32, GseaError> {
                    let sub_index = g * nperm + c;
                    let mut rng = seeds.sub_stream(sub_index);
                    let picks = sample(&mut rng, universe_len, q);
                    let members: Vec<String> = picks
                        .iter()
                        .map(|idx| real_ranked_list.name_at(idx).to_string())
                        .collect();
                    let random_set = GeneSet::new(format!("{set_id}_rnd{c}"), members);
                    let random_slice = std::slice::from_ref(&random_set);
                    let random_cohort = real_cohort.clone_with(random_slice, false)?;
                    let scored = run_kernel(&random_cohort, false)?;
                    Ok(scored.es(0).es)
                })
                .collect()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let set_ids = real_gene_sets.iter().map(|g| g.id().to_string()).collect();
    Ok((set_ids, real_scores, rnd_es))
}

/// Template (phenotype) shuffling: re-score the dataset under `nperm`
/// randomized templates, build a cohort against the real gene sets for
/// each, and record a gene-set x permutation ES matrix.
#[allow(clippy::too_many_arguments)]
pub fn template_shuffle(
    dataset: &Dataset,
    template: &Template,
    real_gene_sets: &[GeneSet],
    nperm: usize,
    metric: Metric,
    sort: SortMode,
    order: Order,
    metric_params: &MetricParams,
    p: f64,
    randomizer: TemplateRandomizerType,
    seeds: RandomSeedGenerator,
    progress: &mut dyn ProgressSink,
    marker_test: &mut dyn PermutationTest,
    retain_rnd_lists: bool,
) -> Result<
    (
        RankedList,
        super::kernel::EnrichmentScoreCohort,
        Vec<Vec<f32>>,
        Vec<RankedList>,
        Option<FeatureMarkerStats>,
    ),
    GseaError,
> {
    let real_ranked_list = score_dataset(metric, sort, order, metric_params, dataset, template)?;
    let real_cohort = GeneSetCohort::construct(&real_ranked_list, real_gene_sets, true, p)?;
    let real_scores = run_kernel(&real_cohort, true)?;

    let k = real_gene_sets.len();
    let mut rnd_ess: Vec<Vec<f32>> = vec![Vec::with_capacity(nperm); k];
    let mut retained = Vec::new();

    for c in 0..nperm {
        let mut rng = seeds.sub_stream(c);
        let rnd_template = randomize_template(template, randomizer, &mut rng);
        let rnd_ranked_list =
            score_dataset(metric, sort, order, metric_params, dataset, &rnd_template)?;
        let rnd_cohort = GeneSetCohort::construct(&rnd_ranked_list, real_gene_sets, false, p)?;
        let rnd_scores = run_kernel(&rnd_cohort, false)?;
        for g in 0..k {
            rnd_ess[g].push(rnd_scores.es(g).es);
        }
        marker_test.add_rnd(&rnd_template, &rnd_ranked_list);
        report_if_due(progress, c, nperm, "template permutation");
        if retain_rnd_lists {
            retained.push(rnd_ranked_list);
        }
    }
    marker_test.do_calc();
    let marker_stats = marker_test.stats();

    Ok((real_ranked_list, real_scores, rnd_ess, retained, marker_stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::gsea::ranked_list::Order;

    fn list() -> RankedList {
        let items = (0..10)
            .map(|i| (format!("f{i}"), (10 - i) as f64))
            .collect();
        RankedList::new(items, Order::Descending).unwrap()
    }

    #[test]
    fn gene_set_shuffle_is_deterministic() {
        let rl = list();
        let gs = vec![GeneSet::new(
            "s1",
            ["f0".to_string(), "f1".to_string(), "f2".to_string()],
        )];
        let seeds = RandomSeedGenerator::new(123);
        let (_, _, rnd1) = gene_set_shuffle(&rl, &gs, 20, 1.0, seeds).unwrap();
        let (_, _, rnd2) = gene_set_shuffle(&rl, &gs, 20, 1.0, seeds).unwrap();
        assert_eq!(rnd1, rnd2);
    }

    #[test]
    fn randomize_template_preserves_class_counts() {
        let template = Template::new(
            "A".into(),
            "B".into(),
            vec!["A".into(), "A".into(), "B".into(), "B".into(), "B".into()],
        )
        .unwrap();
        let mut rng = RandomSeedGenerator::new(1).sub_stream(0);
        let rnd = randomize_template(&template, TemplateRandomizerType::NoBalance, &mut rng);
        let a_count = rnd.labels.iter().filter(|l| *l == "A").count();
        assert_eq!(a_count, 2);
        assert_eq!(rnd.labels.len(), 5);
    }
}
