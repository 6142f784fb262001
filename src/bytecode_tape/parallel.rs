use rayon::prelude::*;

use crate::error::Result;
use crate::float::Float;

impl<F: Float> super::BytecodeTape<F> {
    /// Parallel Jacobian: one reverse sweep per output, parallelized.
    ///
    /// Returns `J[i][j] = ∂out_i/∂x_j`, identical to [`jacobian`](Self::jacobian).
    pub fn jacobian_par(&self, x: &[F]) -> Result<Vec<Vec<F>>> {
        let mut values_buf = Vec::new();
        self.forward_into(x, &mut values_buf)?;

        let ni = self.num_inputs as usize;
        Ok(self
            .output_indices
            .par_iter()
            .map(|&out_idx| {
                let mut adjoints = self.reverse_from(&values_buf, out_idx);
                adjoints.truncate(ni);
                adjoints
            })
            .collect())
    }

    /// Parallel Hessian of output `output`: one HVP per column, parallelized
    /// over columns.
    pub fn hessian_par(&self, x: &[F], output: usize) -> Result<Vec<Vec<F>>> {
        let seed = self.prepare_second_order(x, output)?;
        let n = self.num_inputs as usize;

        let columns: Vec<Vec<F>> = (0..n)
            .into_par_iter()
            .map_init(
                || (Vec::new(), Vec::new(), Vec::new()),
                |(dual_inputs, dual_vals, adjoints), j| {
                    let mut direction = vec![F::zero(); n];
                    direction[j] = F::one();
                    self.hvp_with_bufs(x, &direction, seed, dual_inputs, dual_vals, adjoints);
                    adjoints[..n].iter().map(|d| d.eps).collect()
                },
            )
            .collect();

        let mut hessian = vec![vec![F::zero(); n]; n];
        for (j, col) in columns.iter().enumerate() {
            for (row, &h) in hessian.iter_mut().zip(col) {
                row[j] = h;
            }
        }
        Ok(hessian)
    }

    /// Evaluate the Jacobian at multiple input points in parallel.
    pub fn jacobian_batch_par(&self, inputs: &[&[F]]) -> Result<Vec<Vec<Vec<F>>>> {
        inputs.par_iter().map(|x| self.jacobian(x)).collect()
    }
}
