/// Standard competition ranks ("1224") for items already sorted best-first.
///
/// An item equal to its predecessor on `key` shares the predecessor's rank;
/// otherwise its rank is its 1-based position.
pub fn olympic_ranks<T, K, F>(sorted: &[T], key: F) -> Vec<usize>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut ranks = Vec::with_capacity(sorted.len());
    let mut current = 1;

    for (index, item) in sorted.iter().enumerate() {
        if index > 0 && key(item) != key(&sorted[index - 1]) {
            current = index + 1;
        }
        ranks.push(current);
    }

    ranks
}
