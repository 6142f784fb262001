use std::marker::PhantomData;

use crate::active::Active;
use crate::error::{Error, Result};

use super::thread_local::{activate, deactivate, TapeThreadLocal};
use super::{BytecodeTape, CONSTANT};

/// An open recording session: the `Recording` state of a tape's lifecycle.
///
/// [`begin`](Self::begin) registers the independent inputs and makes the tape
/// the thread's active tape; every operation on the returned [`Active`]
/// values appends an entry. [`end`](Self::end) fixes the dependent outputs and
/// hands back the finished tape. Dropping an unfinished recording discards it.
///
/// Only one recording per thread and float type may be open at a time, and a
/// recording cannot leave its thread.
pub struct Recording<F: TapeThreadLocal> {
    // Boxed so the thread-local pointer stays valid when the session moves.
    tape: Option<Box<BytecodeTape<F>>>,
    _not_send: PhantomData<*const ()>,
}

impl<F: TapeThreadLocal> Recording<F> {
    /// Start recording with independent inputs `x`.
    ///
    /// Input `i` becomes tape entry `i`; the returned vector holds the
    /// tracked values in the same order.
    ///
    /// # Errors
    ///
    /// [`Error::RecordingActive`] if this thread is already recording.
    pub fn begin(x: &[F]) -> Result<(Self, Vec<Active<F>>)> {
        let mut tape = Box::new(BytecodeTape::with_capacity(x.len() * 10));
        let inputs: Vec<Active<F>> = x
            .iter()
            .map(|&val| {
                let idx = tape.new_input(val);
                Active::from_tape(val, idx)
            })
            .collect();

        let ptr: *mut BytecodeTape<F> = &mut *tape;
        if !activate(ptr) {
            return Err(Error::RecordingActive);
        }
        log::trace!("recording started with {} inputs", x.len());

        Ok((
            Recording {
                tape: Some(tape),
                _not_send: PhantomData,
            },
            inputs,
        ))
    }

    /// Finish recording with `outputs` as the dependent variables.
    ///
    /// Outputs that never touched an input are stored as constants.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `outputs` is empty.
    pub fn end(mut self, outputs: &[Active<F>]) -> Result<BytecodeTape<F>> {
        if outputs.is_empty() {
            return Err(Error::DimensionMismatch {
                what: "recorded outputs",
                expected: 1,
                found: 0,
            });
        }
        let mut tape = match self.tape.take() {
            Some(tape) => tape,
            None => unreachable!("recording finished twice"),
        };
        deactivate::<F>(&mut *tape);

        let indices: Vec<u32> = outputs
            .iter()
            .map(|o| {
                if o.index == CONSTANT {
                    tape.push_const(o.value)
                } else {
                    o.index
                }
            })
            .collect();
        tape.set_outputs(&indices);
        log::debug!(
            "recorded tape: {} inputs, {} outputs, {} entries",
            tape.num_inputs(),
            tape.num_outputs(),
            tape.num_ops()
        );
        Ok(*tape)
    }

    /// Number of entries recorded so far.
    pub fn num_ops(&self) -> usize {
        self.tape.as_ref().map_or(0, |t| t.num_ops())
    }
}

impl<F: TapeThreadLocal> Drop for Recording<F> {
    fn drop(&mut self) {
        if let Some(tape) = self.tape.as_mut() {
            deactivate::<F>(&mut **tape);
        }
    }
}
