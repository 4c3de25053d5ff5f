use super::kernel::EnrichmentScore;
use super::metric::{Dataset, Metric, SortMode, Template};
use super::permute::FeatureMarkerStats;
use super::ranked_list::{Order, RankedList};

/// Real ES for one gene set plus its permutation ES vector — the kernel's
/// raw output; normalization into NES/p/FDR/FWER is explicitly out of
/// scope here.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EnrichmentResult {
    pub gene_set_id: String,
    pub real: EnrichmentScore,
    pub hit_count: usize,
    pub mann_whitney_u: f64,
    pub rnd_es: Vec<f32>,
}

/// Structural binding of per-set results to the ranked list, optional
/// dataset/template, and scoring configuration used to produce them.
/// Aggregation performs no computation beyond this binding.
#[derive(Debug, Clone)]
pub struct EnrichmentDb {
    pub ranked_list: RankedList,
    pub dataset: Option<Dataset>,
    pub template: Option<Template>,
    pub results: Vec<EnrichmentResult>,
    pub metric: Option<Metric>,
    pub sort: SortMode,
    pub order: Order,
    pub nperm: usize,
    pub marker_stats: Option<FeatureMarkerStats>,
    /// Random ranked lists produced during template shuffling, kept only
    /// when `GseaConfig::retain_rnd_lists` requested it.
    pub retained_rnd_lists: Option<Vec<RankedList>>,
}

/// Binds a real ES (plus its auxiliary stats) and a permutation ES vector
/// into one [`EnrichmentResult`].
pub fn aggregate_result(
    gene_set_id: String,
    real: EnrichmentScore,
    hit_count: usize,
    mann_whitney_u: f64,
    rnd_es: Vec<f32>,
) -> EnrichmentResult {
    EnrichmentResult {
        gene_set_id,
        real,
        hit_count,
        mann_whitney_u,
        rnd_es,
    }
}
