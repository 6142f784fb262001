use crate::dual::Dual;
use crate::error::{Error, Result};
use crate::float::Float;
use crate::opcode::{self, OpCode, UNUSED};
use crate::scalar::Real;

impl<F: Float> super::BytecodeTape<F> {
    // ── Forward-over-reverse (second-order) ──

    /// Forward sweep with tangent-carrying numbers. Reads opcodes and constants
    /// from `self`, writing results into `buf`. Does not mutate the tape.
    ///
    /// `inputs` must have length [`num_inputs`](Self::num_inputs).
    pub fn forward_tangent<T: Real<Float = F>>(&self, inputs: &[T], buf: &mut Vec<T>) {
        debug_assert_eq!(inputs.len(), self.num_inputs as usize);

        let n = self.num_variables as usize;
        buf.clear();
        buf.resize(n, T::lit(0.0));

        for i in 0..self.opcodes.len() {
            buf[i] = match self.opcodes[i] {
                OpCode::Input => inputs[i],
                OpCode::Const => T::from_f(self.values[i]),
                op => {
                    let [a_idx, b_idx] = self.arg_indices[i];
                    let a = buf[a_idx as usize];
                    let b = if b_idx != UNUSED {
                        buf[b_idx as usize]
                    } else {
                        T::lit(0.0)
                    };
                    opcode::eval_forward(op, a, b)
                }
            };
        }
    }

    /// Reverse sweep with tangent-carrying adjoints, seeded at entry `seed`.
    ///
    /// Uses values from [`forward_tangent`](Self::forward_tangent). Uses
    /// [`IsAllZero`](crate::float::IsAllZero) to skip zero adjoints without
    /// dropping tangent contributions.
    pub(super) fn reverse_tangent<T: Real<Float = F>>(
        &self,
        tangent_vals: &[T],
        seed: u32,
        buf: &mut Vec<T>,
    ) {
        let n = self.num_variables as usize;
        buf.clear();
        buf.resize(n, T::lit(0.0));
        buf[seed as usize] = T::lit(1.0);

        for i in (0..self.opcodes.len()).rev() {
            match self.opcodes[i] {
                OpCode::Input | OpCode::Const => continue,
                op => {
                    let adj = buf[i];
                    if adj.is_all_zero() {
                        continue;
                    }
                    buf[i] = T::lit(0.0);

                    let [a_idx, b_idx] = self.arg_indices[i];
                    let a = tangent_vals[a_idx as usize];
                    let b = if b_idx != UNUSED {
                        tangent_vals[b_idx as usize]
                    } else {
                        T::lit(0.0)
                    };
                    let r = tangent_vals[i];
                    let (da, db) = opcode::reverse_partials(op, a, b, r);

                    buf[a_idx as usize] = buf[a_idx as usize] + da * adj;
                    if b_idx != UNUSED {
                        buf[b_idx as usize] = buf[b_idx as usize] + db * adj;
                    }
                }
            }
        }
    }

    /// One forward-over-reverse pass in direction `v`; leaves the input
    /// adjoints in `adjoint_buf[..num_inputs]`.
    pub(super) fn hvp_with_bufs(
        &self,
        x: &[F],
        v: &[F],
        seed: u32,
        dual_input_buf: &mut Vec<Dual<F>>,
        dual_vals_buf: &mut Vec<Dual<F>>,
        adjoint_buf: &mut Vec<Dual<F>>,
    ) {
        dual_input_buf.clear();
        dual_input_buf.extend(x.iter().zip(v).map(|(&xi, &vi)| Dual::new(xi, vi)));

        self.forward_tangent(dual_input_buf, dual_vals_buf);
        self.reverse_tangent(dual_vals_buf, seed, adjoint_buf);
    }

    /// Validate inputs and the primal sweep ahead of a second-order query.
    pub(super) fn prepare_second_order(&self, x: &[F], output: usize) -> Result<u32> {
        let seed = self.output_entry(output)?;
        if self.check_for_nan {
            let mut values = Vec::new();
            self.forward_into(x, &mut values)?;
        } else {
            self.check_inputs(x)?;
        }
        Ok(seed)
    }

    /// Hessian-vector product of output `output` via forward-over-reverse.
    ///
    /// Returns `(gradient, H·v)`, both of length
    /// [`num_inputs`](Self::num_inputs). The tape is not mutated.
    pub fn hvp(&self, x: &[F], v: &[F], output: usize) -> Result<(Vec<F>, Vec<F>)> {
        let seed = self.prepare_second_order(x, output)?;
        let n = self.num_inputs as usize;
        if v.len() != n {
            return Err(Error::DimensionMismatch {
                what: "hvp direction",
                expected: n,
                found: v.len(),
            });
        }

        let mut dual_inputs = Vec::with_capacity(n);
        let mut dual_vals = Vec::new();
        let mut adjoints = Vec::new();
        self.hvp_with_bufs(x, v, seed, &mut dual_inputs, &mut dual_vals, &mut adjoints);

        let gradient = adjoints[..n].iter().map(|d| d.re).collect();
        let hvp = adjoints[..n].iter().map(|d| d.eps).collect();
        Ok((gradient, hvp))
    }

    /// Full Hessian of output `output` via `n` Hessian-vector products.
    ///
    /// Returns `hessian[i][j] = ∂²out/∂x_i∂x_j`. The tape is not mutated.
    pub fn hessian(&self, x: &[F], output: usize) -> Result<Vec<Vec<F>>> {
        let seed = self.prepare_second_order(x, output)?;
        let n = self.num_inputs as usize;

        let mut dual_input_buf: Vec<Dual<F>> = Vec::with_capacity(n);
        let mut dual_vals_buf = Vec::new();
        let mut adjoint_buf = Vec::new();
        let mut direction = vec![F::zero(); n];
        let mut hessian = vec![vec![F::zero(); n]; n];

        for j in 0..n {
            direction[j] = F::one();
            self.hvp_with_bufs(
                x,
                &direction,
                seed,
                &mut dual_input_buf,
                &mut dual_vals_buf,
                &mut adjoint_buf,
            );
            direction[j] = F::zero();

            for (row, adj) in hessian.iter_mut().zip(&adjoint_buf[..n]) {
                row[j] = adj.eps;
            }
        }

        Ok(hessian)
    }
}
