use std::collections::HashMap;

use crate::float::Float;
use crate::opcode::{OpCode, UNUSED};

use super::TapeState;

impl<F: Float> super::BytecodeTape<F> {
    /// Core DCE: reachability walk from the outputs, compact the tape in
    /// place, return the old → new index remap. Inputs are never removed.
    fn dce_compact(&mut self) -> Vec<u32> {
        let n = self.opcodes.len();
        let mut reachable = vec![false; n];

        // Mark all inputs as reachable.
        for flag in reachable.iter_mut().take(self.num_inputs as usize) {
            *flag = true;
        }

        let mut stack: Vec<u32> = self.output_indices.clone();

        while let Some(idx) = stack.pop() {
            let i = idx as usize;
            if reachable[i] {
                continue;
            }
            reachable[i] = true;
            let [a, b] = self.arg_indices[i];
            if a != UNUSED {
                stack.push(a);
            }
            if b != UNUSED {
                stack.push(b);
            }
        }

        // Build remap: old index -> new index.
        let mut remap = vec![UNUSED; n];
        let mut new_idx = 0u32;
        for (slot, &live) in remap.iter_mut().zip(&reachable) {
            if live {
                *slot = new_idx;
                new_idx += 1;
            }
        }
        let new_len = new_idx as usize;

        // Compact in-place. Arguments precede their consumer, so `write <= read`.
        let mut write = 0;
        for (read, &is_reachable) in reachable.iter().enumerate() {
            if is_reachable {
                self.opcodes[write] = self.opcodes[read];
                self.values[write] = self.values[read];
                let [a, b] = self.arg_indices[read];
                let ra = if a != UNUSED { remap[a as usize] } else { UNUSED };
                let rb = if b != UNUSED { remap[b as usize] } else { UNUSED };
                self.arg_indices[write] = [ra, rb];
                write += 1;
            }
        }

        self.opcodes.truncate(new_len);
        self.arg_indices.truncate(new_len);
        self.values.truncate(new_len);
        self.num_variables = new_len as u32;

        remap
    }

    /// Eliminate dead (unreachable) entries from the tape.
    ///
    /// Walks backward from all outputs, marks reachable entries, then compacts
    /// the tape in-place with an index remap.
    pub fn dead_code_elimination(&mut self) {
        let remap = self.dce_compact();
        for oi in &mut self.output_indices {
            *oi = remap[*oi as usize];
        }
    }

    /// Common subexpression elimination.
    ///
    /// Deduplicates identical `(OpCode, arg0, arg1)` triples, normalising
    /// argument order for commutative ops. Finishes with a DCE pass to
    /// remove the now-dead duplicates.
    pub fn cse(&mut self) {
        let n = self.opcodes.len();
        // Maps canonical (op, arg0, arg1) -> first index that computed it.
        let mut seen: HashMap<(OpCode, u32, u32), u32> = HashMap::new();
        // remap[i] = canonical index for entry i (identity by default).
        let mut remap: Vec<u32> = (0..n as u32).collect();

        for i in 0..n {
            let op = self.opcodes[i];
            if matches!(op, OpCode::Input | OpCode::Const) {
                continue;
            }

            // Arguments precede `i`, so their remap is already final.
            let [a, b] = self.arg_indices[i];
            let a = remap[a as usize];
            let b = if b != UNUSED { remap[b as usize] } else { UNUSED };
            self.arg_indices[i] = [a, b];

            let key = if op.is_commutative() && b < a {
                (op, b, a)
            } else {
                (op, a, b)
            };

            if let Some(&canonical) = seen.get(&key) {
                remap[i] = canonical;
            } else {
                seen.insert(key, i as u32);
            }
        }

        for oi in &mut self.output_indices {
            *oi = remap[*oi as usize];
        }

        // DCE removes the now-unreachable duplicate entries.
        self.dead_code_elimination();
    }

    /// Run all tape optimizations: CSE followed by DCE.
    ///
    /// Output values at any input are unchanged. In debug builds, validates
    /// internal consistency after optimization.
    pub fn optimize(&mut self) {
        let before = self.opcodes.len();
        self.cse();
        self.dead_code_elimination();
        self.state = TapeState::Optimized;
        log::debug!(
            "optimized tape: {before} -> {} entries ({} inputs, {} outputs)",
            self.opcodes.len(),
            self.num_inputs,
            self.output_indices.len()
        );

        #[cfg(debug_assertions)]
        self.debug_check_structure();
    }

    #[cfg(debug_assertions)]
    fn debug_check_structure(&self) {
        let n = self.opcodes.len();
        // All arg_indices must point to earlier entries.
        for i in 0..n {
            let [a, b] = self.arg_indices[i];
            match self.opcodes[i] {
                OpCode::Input | OpCode::Const => {
                    assert_eq!(a, UNUSED, "Input/Const should have UNUSED args");
                    assert_eq!(b, UNUSED, "Input/Const should have UNUSED args");
                }
                op => {
                    assert!((a as usize) < i, "arg0 {a} not before op {i} (tape len {n})");
                    if op.is_binary() {
                        assert!((b as usize) < i, "arg1 {b} not before op {i} (tape len {n})");
                    } else {
                        assert_eq!(b, UNUSED, "unary op {i} reads a second argument");
                    }
                }
            }
        }
        for &oi in &self.output_indices {
            assert!(
                (oi as usize) < n,
                "output_indices entry {oi} out of bounds (tape len {n})"
            );
        }
        let input_count = self
            .opcodes
            .iter()
            .filter(|&&op| op == OpCode::Input)
            .count();
        assert_eq!(
            input_count, self.num_inputs as usize,
            "num_inputs mismatch after optimization"
        );
    }
}
