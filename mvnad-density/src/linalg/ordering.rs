use faer::dyn_stack::{MemBuffer, MemStack};
use faer::sparse::linalg::amd;
use faer::sparse::{SparseColMat, Triplet};

/// Fill-reducing ordering for [`SparseCholesky`](super::SparseCholesky).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ordering {
    /// Approximate minimum degree (faer's AMD) on the pattern of `A + Aᵗ`.
    #[default]
    MinimumDegree,
    /// Keep the original order.
    Natural,
}

impl Ordering {
    /// Compute `perm` (`perm[new] = old`) for an `n × n` symmetric pattern
    /// given as off-diagonal `(row, col)` pairs. Either orientation of a pair
    /// may appear, and duplicates are harmless.
    pub(crate) fn permutation(
        self,
        n: usize,
        off_diagonal: impl Iterator<Item = (usize, usize)>,
    ) -> Vec<usize> {
        match self {
            Ordering::Natural => (0..n).collect(),
            Ordering::MinimumDegree => match approximate_minimum_degree(n, off_diagonal) {
                Some(perm) => perm,
                None => {
                    log::warn!("ordering: AMD failed for n={n}, keeping the natural order");
                    (0..n).collect()
                }
            },
        }
    }
}

/// AMD only reads the pattern, so every stored entry is a unit placeholder.
fn approximate_minimum_degree(
    n: usize,
    off_diagonal: impl Iterator<Item = (usize, usize)>,
) -> Option<Vec<usize>> {
    let triplets: Vec<Triplet<usize, usize, f64>> = off_diagonal
        .filter(|&(r, c)| r != c)
        .map(|(r, c)| Triplet::new(r.max(c), r.min(c), 1.0))
        .collect();
    let pattern = SparseColMat::<usize, f64>::try_new_from_triplets(n, n, &triplets).ok()?;

    let mut perm = vec![0usize; n];
    let mut perm_inv = vec![0usize; n];
    let mut mem = MemBuffer::new(amd::order_scratch::<usize>(n, triplets.len()));
    let stack = MemStack::new(&mut mem);
    amd::order(
        &mut perm,
        &mut perm_inv,
        pattern.symbolic(),
        amd::Control::default(),
        stack,
    )
    .ok()?;

    log::trace!("ordering: AMD on n={n}, nnz(lower)={}", triplets.len());
    Some(perm)
}
