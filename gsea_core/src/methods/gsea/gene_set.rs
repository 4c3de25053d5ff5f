use ahash::AHashSet;

/// An unordered collection of feature names with a stable id, as read from
/// one GMT record. Membership against a particular
/// [`super::ranked_list::RankedList`] is resolved later by
/// [`super::cohort::GeneSetCohort`]; a `GeneSet` on its own knows nothing
/// about any ranking.
#[derive(Debug, Clone)]
pub struct GeneSet {
    id: String,
    members: AHashSet<String>,
}

impl GeneSet {
    pub fn new(id: impl Into<String>, members: impl IntoIterator<Item = String>) -> Self {
        GeneSet {
            id: id.into(),
            members: members.into_iter().collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn num_members(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|s| s.as_str())
    }
}
