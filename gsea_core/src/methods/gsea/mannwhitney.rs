/// Mann-Whitney U statistic on a gene set's hit ranks against the full
/// ranked-list length. Treats hit positions as one group and the remaining
/// positions as the other; since ranked-list positions are already unique
/// integers there are no ties to average over.
///
/// Returns `U` for the hit group. `hit_indices` need not be sorted.
pub fn mann_whitney_u(hit_indices: &[usize], list_len: usize) -> f64 {
    let n1 = hit_indices.len();
    if n1 == 0 || n1 >= list_len {
        return 0.0;
    }
    let rank_sum: f64 = hit_indices.iter().map(|&idx| (idx + 1) as f64).sum();
    let n1f = n1 as f64;
    rank_sum - n1f * (n1f + 1.0) / 2.0
}
