use super::cohort::GeneSetCohort;
use super::mannwhitney::mann_whitney_u;
use crate::error::GseaError;

/// A single tracked extremum: the signed value, the rank it was attained
/// at, and the ranked-list score at that rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRecord {
    pub value: f32,
    pub rank: usize,
    pub rank_score: f32,
}

/// The one ES variant downstream callers usually want: the max-deviation
/// running sum.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct EnrichmentScore {
    pub es: f32,
    pub rank_at_es: usize,
    pub rank_score_at_es: f32,
}

impl From<ScoreRecord> for EnrichmentScore {
    fn from(r: ScoreRecord) -> Self {
        EnrichmentScore {
            es: r.value,
            rank_at_es: r.rank,
            rank_score_at_es: r.rank_score,
        }
    }
}

/// Deep-mode vectors, retained only when a kernel pass runs with
/// `store_deep = true`.
#[derive(Debug, Clone)]
pub enum Deep {
    NoDeep,
    Deep {
        profile_at_hits: Vec<f32>,
        full_profile: Vec<f32>,
        hit_indices: Vec<usize>,
    },
}

/// The five ES variants plus auxiliary statistics the kernel computes for
/// one gene set in one pass.
#[derive(Debug, Clone)]
struct SetScores {
    max_dev: ScoreRecord,
    pos_signed: ScoreRecord,
    pos_abs: ScoreRecord,
    neg_signed: ScoreRecord,
    neg_abs: ScoreRecord,
    hit_count: usize,
    mann_whitney_u: f64,
    deep: Deep,
}

fn zero_record() -> ScoreRecord {
    ScoreRecord {
        value: 0.0,
        rank: 0,
        rank_score: 0.0,
    }
}

/// Result of running the KS kernel over a [`GeneSetCohort`]: one
/// [`EnrichmentScore`] variant bundle per gene set.
#[derive(Debug, Clone)]
pub struct EnrichmentScoreCohort {
    sets: Vec<SetScores>,
}

/// Which of the five ES variants to read off an [`EnrichmentScoreCohort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EsVariant {
    MaxDeviation,
    PositiveSigned,
    PositiveAbsolute,
    NegativeSigned,
    NegativeAbsolute,
}

impl EnrichmentScoreCohort {
    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    pub fn variant(&self, g: usize, which: EsVariant) -> EnrichmentScore {
        let s = &self.sets[g];
        let record = match which {
            EsVariant::MaxDeviation => s.max_dev,
            EsVariant::PositiveSigned => s.pos_signed,
            EsVariant::PositiveAbsolute => s.pos_abs,
            EsVariant::NegativeSigned => s.neg_signed,
            EsVariant::NegativeAbsolute => s.neg_abs,
        };
        record.into()
    }

    /// The max-deviation ES — what most callers mean by "the" enrichment
    /// score.
    pub fn es(&self, g: usize) -> EnrichmentScore {
        self.variant(g, EsVariant::MaxDeviation)
    }

    pub fn hit_count(&self, g: usize) -> usize {
        self.sets[g].hit_count
    }

    pub fn mann_whitney_u(&self, g: usize) -> f64 {
        self.sets[g].mann_whitney_u
    }

    pub fn hit_indices(&self, g: usize, set_id: &str) -> Result<&[usize], GseaError> {
        match &self.sets[g].deep {
            Deep::Deep { hit_indices, .. } => Ok(hit_indices),
            Deep::NoDeep => Err(GseaError::DeepNotAvailable {
                set_id: set_id.to_string(),
            }),
        }
    }

    pub fn profile_at_hits(&self, g: usize, set_id: &str) -> Result<&[f32], GseaError> {
        match &self.sets[g].deep {
            Deep::Deep {
                profile_at_hits, ..
            } => Ok(profile_at_hits),
            Deep::NoDeep => Err(GseaError::DeepNotAvailable {
                set_id: set_id.to_string(),
            }),
        }
    }

    pub fn full_profile(&self, g: usize, set_id: &str) -> Result<&[f32], GseaError> {
        match &self.sets[g].deep {
            Deep::Deep { full_profile, .. } => Ok(full_profile),
            Deep::NoDeep => Err(GseaError::DeepNotAvailable {
                set_id: set_id.to_string(),
            }),
        }
    }
}

fn update_abs_max(current: &mut ScoreRecord, candidate: ScoreRecord) {
    if candidate.value.abs() > current.value.abs() {
        *current = candidate;
    }
}

/// Region-specific trackers start at `None` ("never visited") rather than a
/// zero-valued `ScoreRecord`, so the first real candidate always seeds the
/// tracker instead of being compared against a phantom zero it would lose to
/// (e.g. a region whose true values are all small positive numbers would
/// never beat a `0.0` signed-min sentinel).
fn update_opt_signed_max(current: &mut Option<ScoreRecord>, candidate: ScoreRecord) {
    match current {
        None => *current = Some(candidate),
        Some(c) if candidate.value > c.value => *current = Some(candidate),
        _ => {}
    }
}

fn update_opt_signed_min(current: &mut Option<ScoreRecord>, candidate: ScoreRecord) {
    match current {
        None => *current = Some(candidate),
        Some(c) if candidate.value < c.value => *current = Some(candidate),
        _ => {}
    }
}

fn update_opt_abs_max(current: &mut Option<ScoreRecord>, candidate: ScoreRecord) {
    match current {
        None => *current = Some(candidate),
        Some(c) if candidate.value.abs() > c.value.abs() => *current = Some(candidate),
        _ => {}
    }
}

/// Updates `max_dev` plus whichever of the positive/negative region trackers
/// `corr` belongs to. Called for every rank a set's running score passes
/// through, whether that rank was a hit or a backfilled miss.
#[allow(clippy::too_many_arguments)]
fn update_extrema(
    max_dev: &mut ScoreRecord,
    pos_signed: &mut Option<ScoreRecord>,
    pos_abs: &mut Option<ScoreRecord>,
    neg_signed: &mut Option<ScoreRecord>,
    neg_abs: &mut Option<ScoreRecord>,
    candidate: ScoreRecord,
    corr: f64,
) {
    update_abs_max(max_dev, candidate);
    if corr > 0.0 {
        update_opt_signed_max(pos_signed, candidate);
        update_opt_abs_max(pos_abs, candidate);
    } else {
        update_opt_signed_min(neg_signed, candidate);
        update_opt_abs_max(neg_abs, candidate);
    }
}

struct RunningSet {
    s: f64,
    /// Last index visited, -1 meaning "not yet visited".
    j: i64,
    max_dev: ScoreRecord,
    pos_signed: Option<ScoreRecord>,
    pos_abs: Option<ScoreRecord>,
    neg_signed: Option<ScoreRecord>,
    neg_abs: Option<ScoreRecord>,
    hit_count: usize,
    hit_indices: Vec<usize>,
    profile_at_hits: Vec<f32>,
    full_profile: Vec<f32>,
}

impl RunningSet {
    fn new() -> Self {
        RunningSet {
            s: 0.0,
            j: -1,
            max_dev: zero_record(),
            pos_signed: None,
            pos_abs: None,
            neg_signed: None,
            neg_abs: None,
            hit_count: 0,
            hit_indices: Vec::new(),
            profile_at_hits: Vec::new(),
            full_profile: Vec::new(),
        }
    }
}

/// Runs the single-pass KS running-sum computation for every gene set in
/// `cohort`.
///
/// `store_deep` controls whether full per-index profiles, per-hit profiles,
/// and hit-index vectors are retained; permutation passes should pass
/// `false` to avoid the `O(L)`-per-set memory cost.
pub fn run_kernel(
    cohort: &GeneSetCohort,
    store_deep: bool,
) -> Result<EnrichmentScoreCohort, GseaError> {
    let k = cohort.num_sets();
    if k == 0 {
        return Err(GseaError::InvalidArgument(
            "cohort has no gene sets".to_string(),
        ));
    }
    let ranked_list = cohort.ranked_list();
    let l = ranked_list.len();
    let mut running: Vec<RunningSet> = (0..k).map(|_| RunningSet::new()).collect();
    if store_deep {
        for r in running.iter_mut() {
            r.full_profile = vec![0.0; l];
        }
    }

    for r in 0..l {
        let name_r = ranked_list.name_at(r);
        let corr_r = ranked_list.score_at(r);

        // Determine which sets are touched at this position.
        let touched: Vec<usize> = if r < l - 1 {
            cohort.geneset_indices_for_gene(name_r).to_vec()
        } else {
            (0..k).collect()
        };

        for &g in &touched {
            let rs = &mut running[g];

            // Step 2a: backfill the miss gap since this set was last visited.
            // Every skipped rank gets its own extrema check here: the miss
            // run's running value is monotonic, but which region (positive-
            // or negative-scored) each skipped rank falls into depends on
            // that rank's own score, not on the run's position, so the
            // region trackers can't be seeded from the run's endpoint alone.
            let gap = r as i64 - rs.j - 1;
            if gap > 0 {
                let miss = cohort.miss_points(g);
                let base = rs.j;
                for j in (rs.j + 1)..(r as i64) {
                    let j = j as usize;
                    let value = rs.s - (j as i64 - base) as f64 * miss;
                    if store_deep {
                        rs.full_profile[j] = value as f32;
                    }
                    let corr_j = ranked_list.score_at(j);
                    let candidate = ScoreRecord {
                        value: value as f32,
                        rank: j,
                        rank_score: corr_j as f32,
                    };
                    update_extrema(
                        &mut rs.max_dev,
                        &mut rs.pos_signed,
                        &mut rs.pos_abs,
                        &mut rs.neg_signed,
                        &mut rs.neg_abs,
                        candidate,
                        corr_j,
                    );
                }
                rs.s -= gap as f64 * miss;
            }

            // Step 2b: hit, or (only at the terminal closing pass) a miss.
            let is_hit = if r < l - 1 {
                true
            } else {
                cohort.is_member(g, name_r)
            };
            if is_hit {
                rs.j = r as i64;
                let mut hit = cohort.hit_points(g, r);
                if !hit.is_finite() {
                    hit = super::cohort::FALLBACK_WEIGHT;
                }
                rs.s += hit;
                rs.hit_count += 1;
                rs.hit_indices.push(r);
                if store_deep {
                    rs.profile_at_hits.push(rs.s as f32);
                }
            } else {
                let miss = cohort.miss_points(g);
                rs.s -= miss;
                rs.j = r as i64;
            }

            // Step 2c: update extrema at r itself.
            if store_deep {
                rs.full_profile[r] = rs.s as f32;
            }
            let candidate = ScoreRecord {
                value: rs.s as f32,
                rank: r,
                rank_score: corr_r as f32,
            };
            update_extrema(
                &mut rs.max_dev,
                &mut rs.pos_signed,
                &mut rs.pos_abs,
                &mut rs.neg_signed,
                &mut rs.neg_abs,
                candidate,
                corr_r,
            );
        }
    }

    let sets = running
        .into_iter()
        .map(|rs| {
            let mwu = mann_whitney_u(&rs.hit_indices, l);
            let deep = if store_deep {
                Deep::Deep {
                    profile_at_hits: rs.profile_at_hits,
                    full_profile: rs.full_profile,
                    hit_indices: rs.hit_indices,
                }
            } else {
                Deep::NoDeep
            };
            SetScores {
                max_dev: rs.max_dev,
                pos_signed: rs.pos_signed.unwrap_or_else(zero_record),
                pos_abs: rs.pos_abs.unwrap_or_else(zero_record),
                neg_signed: rs.neg_signed.unwrap_or_else(zero_record),
                neg_abs: rs.neg_abs.unwrap_or_else(zero_record),
                hit_count: rs.hit_count,
                mann_whitney_u: mwu,
                deep,
            }
        })
        .collect();

    Ok(EnrichmentScoreCohort { sets })
}
