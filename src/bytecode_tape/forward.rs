use crate::error::Result;
use crate::float::Float;
use crate::opcode::{self, OpCode, UNUSED};

impl<F: Float> super::BytecodeTape<F> {
    /// Evaluate the tape at new inputs and return the output values.
    ///
    /// Leaves the tape untouched; see [`replay`](Self::replay) for the
    /// in-place variant.
    ///
    /// # Errors
    ///
    /// [`DimensionMismatch`](crate::Error::DimensionMismatch) if `x` has the
    /// wrong length; [`NonFiniteIntermediate`](crate::Error::NonFiniteIntermediate)
    /// if the NaN check is enabled and the sweep produces a non-finite entry.
    pub fn forward(&self, x: &[F]) -> Result<Vec<F>> {
        let mut buf = Vec::new();
        self.forward_into(x, &mut buf)?;
        Ok(self
            .output_indices
            .iter()
            .map(|&idx| buf[idx as usize])
            .collect())
    }

    /// Re-evaluate the tape at new inputs, overwriting the stored values.
    ///
    /// Afterwards [`output_values`](Self::output_values) reports the outputs
    /// at `x`.
    pub fn replay(&mut self, x: &[F]) -> Result<()> {
        let mut buf = Vec::new();
        self.forward_into(x, &mut buf)?;
        self.values = buf;
        Ok(())
    }

    /// Forward evaluation into an external buffer.
    ///
    /// Reads opcodes, constants, and argument indices from `self`, but writes
    /// computed values into `values_buf` instead of `self.values`. This allows
    /// concurrent evaluation of the same tape at different inputs without
    /// cloning.
    pub fn forward_into(&self, x: &[F], values_buf: &mut Vec<F>) -> Result<()> {
        self.check_inputs(x)?;

        let n = self.num_variables as usize;
        values_buf.clear();
        // Copy constant values from the tape, then overwrite inputs.
        values_buf.extend_from_slice(&self.values[..n]);
        values_buf[..x.len()].copy_from_slice(x);

        // Re-evaluate all non-Input, non-Const ops.
        for i in 0..self.opcodes.len() {
            match self.opcodes[i] {
                OpCode::Input | OpCode::Const => continue,
                op => {
                    let [a_idx, b_idx] = self.arg_indices[i];
                    let a = values_buf[a_idx as usize];
                    let b = if b_idx != UNUSED {
                        values_buf[b_idx as usize]
                    } else {
                        F::zero()
                    };
                    values_buf[i] = opcode::eval_forward(op, a, b);
                }
            }
        }

        if self.check_for_nan {
            self.validate_values(values_buf)?;
        }
        Ok(())
    }
}
