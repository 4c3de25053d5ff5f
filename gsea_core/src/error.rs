use std::fmt;

/// Error kinds raised by the enrichment kernel itself.
///
/// These are distinct from the ambient I/O errors raised by [`crate::readers`]:
/// a `GseaError` always means the caller handed the kernel something it
/// cannot honor (a malformed cohort, a degenerate gene set, a request for
/// data a non-deep pass never collected), never a file-system or parse
/// failure.
#[derive(Debug, Clone)]
pub enum GseaError {
    /// Cohort is null/empty, a gene set is empty, dataset row count does not
    /// match the ranked list size, or a ranked-list score is non-finite.
    InvalidArgument(String),
    /// A qualified gene set has zero members after intersecting with the
    /// ranked list. The caller is expected to filter gene sets before
    /// constructing a cohort; this is raised only if one slips through.
    GeneSetDegenerate { set_id: String },
    /// A deep-only field (`ESProfile`, `hitIndices`, full profile) was
    /// requested on a result computed with `store_deep = false`.
    DeepNotAvailable { set_id: String },
}

impl fmt::Display for GseaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GseaError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            GseaError::GeneSetDegenerate { set_id } => {
                write!(f, "gene set '{set_id}' has zero qualified members")
            }
            GseaError::DeepNotAvailable { set_id } => write!(
                f,
                "deep profile requested for set '{set_id}' but it was scored with store_deep=false"
            ),
        }
    }
}

impl std::error::Error for GseaError {}
