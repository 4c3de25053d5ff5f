use gsea_core::methods::gsea::{
    execute_gsea_preranked, permute, GeneSet, GseaConfig, Order, RandomSeedGenerator, RankedList,
};
use pretty_assertions::assert_eq;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64], mean_val: f64) -> f64 {
    values
        .iter()
        .map(|v| (v - mean_val).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64
}

fn descending_list(scores: &[f64]) -> RankedList {
    let items = scores
        .iter()
        .enumerate()
        .map(|(i, &s)| (format!("f{}", i + 1), s))
        .collect();
    RankedList::new(items, Order::Descending).unwrap()
}

#[test]
fn s1_all_at_top() {
    let rl = descending_list(&[10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
    let gs = vec![GeneSet::new(
        "top",
        ["f1".to_string(), "f2".to_string(), "f3".to_string()],
    )];
    let cohort = gsea_core::methods::gsea::GeneSetCohort::construct(&rl, &gs, true, 1.0).unwrap();
    let scores = gsea_core::methods::gsea::kernel::run_kernel(&cohort, true).unwrap();
    let es = scores.es(0);
    assert!(es.es > 0.0);
    assert_eq!(es.rank_at_es, 2);

    let profile = scores.full_profile(0, "top").unwrap();
    let peak = profile
        .iter()
        .cloned()
        .fold(f32::MIN, f32::max);
    assert!((profile[es.rank_at_es] - peak).abs() < 1e-6);
    assert!(profile[profile.len() - 1].abs() < 1e-6);
}

#[test]
fn s2_all_at_bottom() {
    let rl = descending_list(&[10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
    let gs = vec![GeneSet::new(
        "bottom",
        ["f8".to_string(), "f9".to_string(), "f10".to_string()],
    )];
    let cohort = gsea_core::methods::gsea::GeneSetCohort::construct(&rl, &gs, true, 1.0).unwrap();
    let scores = gsea_core::methods::gsea::kernel::run_kernel(&cohort, false).unwrap();
    let es = scores.es(0);
    assert!(es.es < 0.0);
    assert_eq!(es.rank_at_es, 9);
}

#[test]
fn s3_uniform_spread_sign_follows_top_hit() {
    let rl = descending_list(&(1..=12).rev().map(|i| i as f64).collect::<Vec<_>>());
    let gs = vec![GeneSet::new(
        "spread",
        ["f1".to_string(), "f5".to_string(), "f9".to_string()],
    )];
    let cohort = gsea_core::methods::gsea::GeneSetCohort::construct(&rl, &gs, true, 1.0).unwrap();
    let scores = gsea_core::methods::gsea::kernel::run_kernel(&cohort, false).unwrap();
    let es = scores.es(0);
    assert!(es.es.abs() < 0.6);
    assert!(es.es > 0.0);
}

#[test]
fn s4_degenerate_zero_scores_bounded() {
    let rl = descending_list(&[0.0; 10]);
    let gs = vec![GeneSet::new(
        "zeros",
        ["f1".to_string(), "f2".to_string(), "f3".to_string()],
    )];
    let cohort = gsea_core::methods::gsea::GeneSetCohort::construct(&rl, &gs, true, 1.0).unwrap();
    let scores = gsea_core::methods::gsea::kernel::run_kernel(&cohort, false).unwrap();
    assert!(scores.es(0).es.abs() <= 3.0e-6 + 1e-9);
}

#[test]
fn s5_gene_set_shuffle_null_mean_near_zero() {
    let rl = descending_list(&(1..=40).rev().map(|i| i as f64).collect::<Vec<_>>());
    let gs = vec![GeneSet::new(
        "mid",
        (15..=19).map(|i| format!("f{i}")).collect::<Vec<_>>(),
    )];
    let nperm = 1000;
    let seeds = RandomSeedGenerator::new(2024);
    let (_, _, rnd_es) = permute::gene_set_shuffle(&rl, &gs, nperm, 1.0, seeds).unwrap();
    let sample: Vec<f64> = rnd_es[0].iter().map(|&v| v as f64).collect();
    let sample_mean = mean(&sample);
    let sample_var = variance(&sample, sample_mean);
    let stderr = (sample_var / sample.len() as f64).sqrt();
    assert!(sample_mean.abs() < 3.0 * stderr);

    let (_, _, rnd_es_repeat) =
        permute::gene_set_shuffle(&rl, &gs, nperm, 1.0, RandomSeedGenerator::new(2024)).unwrap();
    let repeat_sample: Vec<f64> = rnd_es_repeat[0].iter().map(|&v| v as f64).collect();
    let repeat_var = variance(&repeat_sample, mean(&repeat_sample));
    assert!((sample_var - repeat_var).abs() < 1e-9);
}

#[test]
fn s6_template_shuffle_parity_same_seed_identical() {
    use gsea_core::methods::gsea::{Dataset, Metric, SortMode, Template};
    use ndarray::array;

    let values = array![
        [8.0, 9.0, 1.0, 2.0],
        [1.0, 1.1, 8.5, 8.7],
        [5.0, 5.2, 4.8, 5.1]
    ];
    let dataset = Dataset::new(
        vec!["g1".into(), "g2".into(), "g3".into()],
        vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()],
        values,
    )
    .unwrap();
    let template = Template::new(
        "A".into(),
        "B".into(),
        vec!["A".into(), "A".into(), "B".into(), "B".into()],
    )
    .unwrap();
    let gs = vec![GeneSet::new(
        "set1",
        ["g1".to_string(), "g2".to_string()],
    )];

    let mut config = GseaConfig::default();
    config.min_overlap = 1;
    config.permutations = 20;
    config.metric = Metric::SignalToNoise;
    config.sort = SortMode::Real;

    let mut progress1 = gsea_core::methods::gsea::NullProgressSink;
    let mut marker1 = gsea_core::methods::gsea::NullPermutationTest;
    let db1 = gsea_core::methods::gsea::execute_gsea_from_dataset(
        dataset.clone(),
        template.clone(),
        &gs,
        &config,
        RandomSeedGenerator::new(7),
        &mut progress1,
        &mut marker1,
    )
    .unwrap();

    let mut progress2 = gsea_core::methods::gsea::NullProgressSink;
    let mut marker2 = gsea_core::methods::gsea::NullPermutationTest;
    let db2 = gsea_core::methods::gsea::execute_gsea_from_dataset(
        dataset.clone(),
        template.clone(),
        &gs,
        &config,
        RandomSeedGenerator::new(7),
        &mut progress2,
        &mut marker2,
    )
    .unwrap();

    assert_eq!(db1.results[0].rnd_es, db2.results[0].rnd_es);

    let mut progress3 = gsea_core::methods::gsea::NullProgressSink;
    let mut marker3 = gsea_core::methods::gsea::NullPermutationTest;
    let db3 = gsea_core::methods::gsea::execute_gsea_from_dataset(
        dataset,
        template,
        &gs,
        &config,
        RandomSeedGenerator::new(9000),
        &mut progress3,
        &mut marker3,
    )
    .unwrap();
    assert_ne!(db1.results[0].rnd_es, db3.results[0].rnd_es);
}

#[test]
fn preranked_end_to_end_via_public_api() {
    let rl = descending_list(&(1..=20).rev().map(|i| i as f64).collect::<Vec<_>>());
    let gs = vec![GeneSet::new(
        "top_half",
        (1..=10).map(|i| format!("f{i}")).collect::<Vec<_>>(),
    )];
    let mut config = GseaConfig::default();
    config.min_overlap = 1;
    config.permutations = 50;
    let db =
        execute_gsea_preranked(rl, &gs, &config, RandomSeedGenerator::new(11)).unwrap();
    assert_eq!(db.results.len(), 1);
    assert_eq!(db.results[0].rnd_es.len(), 50);
    assert!(db.results[0].real.es > 0.0);
}
