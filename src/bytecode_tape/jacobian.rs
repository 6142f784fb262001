use crate::dual::Dual;
use crate::error::Result;
use crate::float::Float;

impl<F: Float> super::BytecodeTape<F> {
    /// Compute the full Jacobian via reverse mode.
    ///
    /// One forward sweep, then one reverse sweep per output.
    /// Returns `J[i][j] = ∂out_i/∂x_j`.
    pub fn jacobian(&self, x: &[F]) -> Result<Vec<Vec<F>>> {
        let mut values = Vec::new();
        self.forward_into(x, &mut values)?;

        let ni = self.num_inputs as usize;
        Ok(self
            .output_indices
            .iter()
            .map(|&out_idx| {
                let mut adjoints = self.reverse_from(&values, out_idx);
                adjoints.truncate(ni);
                adjoints
            })
            .collect())
    }

    /// Dense Jacobian via forward mode (one forward-tangent pass per input).
    ///
    /// More efficient than reverse mode when `num_inputs < num_outputs`.
    pub fn jacobian_forward(&self, x: &[F]) -> Result<Vec<Vec<F>>> {
        self.check_inputs(x)?;
        let n = self.num_inputs as usize;
        let m = self.output_indices.len();

        let mut jac = vec![vec![F::zero(); n]; m];
        let mut dual_input_buf: Vec<Dual<F>> = Vec::with_capacity(n);
        let mut dual_vals_buf: Vec<Dual<F>> = Vec::new();

        for col in 0..n {
            dual_input_buf.clear();
            dual_input_buf.extend(x.iter().enumerate().map(|(i, &xi)| {
                Dual::new(xi, if i == col { F::one() } else { F::zero() })
            }));

            self.forward_tangent(&dual_input_buf, &mut dual_vals_buf);

            for (row, &out_idx) in jac.iter_mut().zip(&self.output_indices) {
                row[col] = dual_vals_buf[out_idx as usize].eps;
            }
        }

        Ok(jac)
    }
}
