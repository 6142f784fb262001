use crate::error::{Error, Result};
use crate::float::Float;
use crate::opcode::{self, OpCode, UNUSED};

impl<F: Float> super::BytecodeTape<F> {
    /// Core reverse sweep loop shared by all scalar reverse sweep variants.
    ///
    /// Expects `adjoints` to be pre-seeded by the caller (length = `num_variables`).
    /// Reads primal values from `values` (either `self.values` or an external buffer).
    pub(super) fn reverse_sweep_core(&self, adjoints: &mut [F], values: &[F]) {
        for i in (0..self.opcodes.len()).rev() {
            let adj = adjoints[i];
            if adj == F::zero() {
                continue;
            }

            match self.opcodes[i] {
                OpCode::Input | OpCode::Const => continue,
                op => {
                    adjoints[i] = F::zero();
                    let [a_idx, b_idx] = self.arg_indices[i];
                    let a = values[a_idx as usize];
                    let b = if b_idx != UNUSED {
                        values[b_idx as usize]
                    } else {
                        F::zero()
                    };
                    let r = values[i];
                    let (da, db) = opcode::reverse_partials(op, a, b, r);

                    adjoints[a_idx as usize] = adjoints[a_idx as usize] + da * adj;
                    if b_idx != UNUSED {
                        adjoints[b_idx as usize] = adjoints[b_idx as usize] + db * adj;
                    }
                }
            }
        }
    }

    /// Reverse sweep reading from an external values buffer.
    ///
    /// Seeds entry `seed_index` with one and returns the full adjoint vector
    /// (length = `num_variables`). Pair with [`forward_into`](Self::forward_into).
    pub fn reverse_from(&self, values: &[F], seed_index: u32) -> Vec<F> {
        let n = self.num_variables as usize;
        debug_assert_eq!(values.len(), n, "values buffer has wrong length");
        let mut adjoints = vec![F::zero(); n];
        adjoints[seed_index as usize] = F::one();
        self.reverse_sweep_core(&mut adjoints, values);
        adjoints
    }

    /// Gradient of output `output` at `x`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] for a wrong input length or an output
    /// index out of range.
    pub fn gradient(&self, x: &[F], output: usize) -> Result<Vec<F>> {
        let seed = self.output_entry(output)?;
        let mut values = Vec::new();
        self.forward_into(x, &mut values)?;
        let mut adjoints = self.reverse_from(&values, seed);
        adjoints.truncate(self.num_inputs as usize);
        Ok(adjoints)
    }

    /// Vector-Jacobian product `wᵀ·J` at `x`, one reverse sweep for all
    /// outputs at once.
    pub fn vjp(&self, x: &[F], weights: &[F]) -> Result<Vec<F>> {
        if weights.len() != self.output_indices.len() {
            return Err(Error::DimensionMismatch {
                what: "vjp weights",
                expected: self.output_indices.len(),
                found: weights.len(),
            });
        }
        let mut values = Vec::new();
        self.forward_into(x, &mut values)?;

        let mut adjoints = vec![F::zero(); self.num_variables as usize];
        for (&out_idx, &weight) in self.output_indices.iter().zip(weights) {
            adjoints[out_idx as usize] = adjoints[out_idx as usize] + weight;
        }
        self.reverse_sweep_core(&mut adjoints, &values);
        adjoints.truncate(self.num_inputs as usize);
        Ok(adjoints)
    }
}
