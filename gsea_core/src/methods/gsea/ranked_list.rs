use crate::error::GseaError;
use ahash::AHashMap;

/// Interpretation of index 0 vs. index `L-1` in a [`RankedList`].
///
/// `Descending` means index 0 is the most extreme positive score and
/// `L-1` the most extreme negative score; `Ascending` is the reverse.
/// The kernel itself only ever walks the list front-to-back, so `Order`
/// is bookkeeping for callers (metric scoring, reporting) rather than
/// something the KS kernel branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Descending,
    Ascending,
}

/// Ordered `(feature name, correlation score)` pairs with random access by
/// index and by name. Immutable once built.
#[derive(Debug, Clone)]
pub struct RankedList {
    names: Vec<String>,
    scores: Vec<f64>,
    order: Order,
    index: AHashMap<String, usize>,
}

impl RankedList {
    /// Builds a ranked list, validating its invariants: unique names,
    /// finite scores.
    pub fn new(items: Vec<(String, f64)>, order: Order) -> Result<Self, GseaError> {
        let mut names = Vec::with_capacity(items.len());
        let mut scores = Vec::with_capacity(items.len());
        let mut index = AHashMap::with_capacity(items.len());
        for (i, (name, score)) in items.into_iter().enumerate() {
            if !score.is_finite() {
                return Err(GseaError::InvalidArgument(format!(
                    "score for '{name}' at rank {i} is not finite"
                )));
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(GseaError::InvalidArgument(format!(
                    "duplicate feature name '{name}' in ranked list"
                )));
            }
            names.push(name);
            scores.push(score);
        }
        Ok(RankedList {
            names,
            scores,
            order,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn name_at(&self, rank: usize) -> &str {
        &self.names[rank]
    }

    pub fn score_at(&self, rank: usize) -> f64 {
        self.scores[rank]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Index of a feature within the list, if present.
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}
