use super::ranked_list::{Order, RankedList};
use crate::error::GseaError;
use ndarray::Array2;

/// The handful of knobs the classic GSEA metrics need, chiefly the variance
/// floor applied before dividing by a class's standard deviation.
#[derive(Debug, Clone, Copy)]
pub struct MetricParams {
    /// Floor applied to each class's standard deviation as a fraction of
    /// the class mean, to keep signal-to-noise/t-test from blowing up on
    /// near-constant features.
    pub min_std_fraction: f64,
    /// Absolute floor applied after the fractional one.
    pub min_std_absolute: f64,
}

impl Default for MetricParams {
    fn default() -> Self {
        MetricParams {
            min_std_fraction: 0.2,
            min_std_absolute: 0.2,
        }
    }
}

/// Metrics the kernel is agnostic to but `score_dataset` must implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    SignalToNoise,
    TTest,
    RatioOfClasses,
    DiffOfClasses,
    LogRatioOfClasses,
}

/// Whether features are ranked by their raw score or by magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Real,
    Absolute,
}

/// Row-major numeric matrix: rows are features, columns are samples.
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_names: Vec<String>,
    sample_names: Vec<String>,
    values: Array2<f64>,
}

impl Dataset {
    pub fn new(
        feature_names: Vec<String>,
        sample_names: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self, GseaError> {
        if values.nrows() != feature_names.len() || values.ncols() != sample_names.len() {
            return Err(GseaError::InvalidArgument(
                "dataset matrix shape does not match row/column label counts".to_string(),
            ));
        }
        Ok(Dataset {
            feature_names,
            sample_names,
            values,
        })
    }

    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn num_samples(&self) -> usize {
        self.sample_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    pub fn row(&self, i: usize) -> ndarray::ArrayView1<f64> {
        self.values.row(i)
    }
}

/// Discrete two-class phenotype labels, one per dataset sample column. The
/// classic GSEA metrics (signal-to-noise, t-test, ratio/log-ratio/diff of
/// classes) all compare exactly two classes, so that's the only shape `Template`
/// models here.
#[derive(Debug, Clone)]
pub struct Template {
    pub class_a: String,
    pub class_b: String,
    pub labels: Vec<String>,
}

impl Template {
    pub fn new(class_a: String, class_b: String, labels: Vec<String>) -> Result<Self, GseaError> {
        for label in &labels {
            if label != &class_a && label != &class_b {
                return Err(GseaError::InvalidArgument(format!(
                    "template label '{label}' is neither '{class_a}' nor '{class_b}'"
                )));
            }
        }
        Ok(Template {
            class_a,
            class_b,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `true` at index `i` iff sample `i` belongs to `class_a`.
    pub fn class_a_mask(&self) -> Vec<bool> {
        self.labels.iter().map(|l| l == &self.class_a).collect()
    }

    pub fn with_labels(&self, labels: Vec<String>) -> Template {
        Template {
            class_a: self.class_a.clone(),
            class_b: self.class_b.clone(),
            labels,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean_val: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let var = values
        .iter()
        .map(|v| (v - mean_val).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    var.sqrt()
}

fn floored_std(std_val: f64, mean_val: f64, params: &MetricParams) -> f64 {
    std_val.max(params.min_std_fraction * mean_val.abs()).max(params.min_std_absolute)
}

fn split(row: ndarray::ArrayView1<f64>, mask: &[bool]) -> (Vec<f64>, Vec<f64>) {
    let mut a = Vec::new();
    let mut b = Vec::new();
    for (&keep_a, &v) in mask.iter().zip(row.iter()) {
        if keep_a {
            a.push(v);
        } else {
            b.push(v);
        }
    }
    (a, b)
}

fn score_row(metric: Metric, a: &[f64], b: &[f64], params: &MetricParams) -> f64 {
    let mean_a = mean(a);
    let mean_b = mean(b);
    match metric {
        Metric::SignalToNoise => {
            let std_a = floored_std(std_dev(a, mean_a), mean_a, params);
            let std_b = floored_std(std_dev(b, mean_b), mean_b, params);
            (mean_a - mean_b) / (std_a + std_b)
        }
        Metric::TTest => {
            let std_a = std_dev(a, mean_a).max(params.min_std_absolute);
            let std_b = std_dev(b, mean_b).max(params.min_std_absolute);
            let pooled = ((std_a * std_a) / a.len() as f64 + (std_b * std_b) / b.len() as f64).sqrt();
            (mean_a - mean_b) / pooled.max(params.min_std_absolute)
        }
        Metric::RatioOfClasses => mean_a / mean_b.abs().max(params.min_std_absolute).copysign(mean_b),
        Metric::LogRatioOfClasses => {
            let ratio = mean_a / mean_b.abs().max(params.min_std_absolute).copysign(mean_b);
            ratio.abs().max(f64::MIN_POSITIVE).ln() * ratio.signum()
        }
        Metric::DiffOfClasses => mean_a - mean_b,
    }
}

/// Produces a ranked list from `(dataset, template, metric)`. Deterministic
/// given identical inputs, as the kernel requires.
pub fn score_dataset(
    metric: Metric,
    sort: SortMode,
    order: Order,
    params: &MetricParams,
    dataset: &Dataset,
    template: &Template,
) -> Result<RankedList, GseaError> {
    if dataset.num_samples() != template.len() {
        return Err(GseaError::InvalidArgument(format!(
            "dataset has {} samples but template has {} labels",
            dataset.num_samples(),
            template.len()
        )));
    }
    let mask = template.class_a_mask();
    let mut scored: Vec<(String, f64)> = (0..dataset.num_features())
        .map(|i| {
            let row = dataset.row(i);
            let (a, b) = split(row, &mask);
            let score = score_row(metric, &a, &b, params);
            (dataset.feature_names()[i].clone(), score)
        })
        .collect();

    match (sort, order) {
        (SortMode::Real, Order::Descending) => {
            scored.sort_by(|x, y| y.1.partial_cmp(&x.1).unwrap())
        }
        (SortMode::Real, Order::Ascending) => {
            scored.sort_by(|x, y| x.1.partial_cmp(&y.1).unwrap())
        }
        (SortMode::Absolute, Order::Descending) => {
            scored.sort_by(|x, y| y.1.abs().partial_cmp(&x.1.abs()).unwrap())
        }
        (SortMode::Absolute, Order::Ascending) => {
            scored.sort_by(|x, y| x.1.abs().partial_cmp(&y.1.abs()).unwrap())
        }
    }

    RankedList::new(scored, order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_class_template() -> Template {
        Template::new(
            "A".into(),
            "B".into(),
            vec!["A".into(), "A".into(), "B".into(), "B".into()],
        )
        .unwrap()
    }

    #[test]
    fn score_dataset_is_deterministic() {
        let values = array![[1.0, 2.0, 8.0, 9.0], [5.0, 5.0, 5.0, 5.0]];
        let dataset = Dataset::new(
            vec!["g1".into(), "g2".into()],
            vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()],
            values,
        )
        .unwrap();
        let template = two_class_template();
        let params = MetricParams::default();
        let first = score_dataset(
            Metric::SignalToNoise,
            SortMode::Real,
            Order::Descending,
            &params,
            &dataset,
            &template,
        )
        .unwrap();
        let second = score_dataset(
            Metric::SignalToNoise,
            SortMode::Real,
            Order::Descending,
            &params,
            &dataset,
            &template,
        )
        .unwrap();
        assert_eq!(first.names(), second.names());
        assert_eq!(first.scores(), second.scores());
    }

    #[test]
    fn sample_count_mismatch_is_invalid_argument() {
        let values = array![[1.0, 2.0, 3.0]];
        let dataset = Dataset::new(vec!["g1".into()], vec!["s1".into(), "s2".into(), "s3".into()], values)
            .unwrap();
        let template = two_class_template();
        let err = score_dataset(
            Metric::DiffOfClasses,
            SortMode::Real,
            Order::Descending,
            &MetricParams::default(),
            &dataset,
            &template,
        )
        .unwrap_err();
        assert!(matches!(err, GseaError::InvalidArgument(_)));
    }

    #[test]
    fn diff_of_classes_favors_higher_class_a() {
        let values = array![[10.0, 10.0, 1.0, 1.0]];
        let dataset = Dataset::new(
            vec!["g1".into()],
            vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()],
            values,
        )
        .unwrap();
        let template = two_class_template();
        let ranked = score_dataset(
            Metric::DiffOfClasses,
            SortMode::Real,
            Order::Descending,
            &MetricParams::default(),
            &dataset,
            &template,
        )
        .unwrap();
        assert!(ranked.score_at(0) > 0.0);
    }
}
