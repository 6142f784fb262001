use crate::error::{Error, Result};
use crate::float::Float;
use crate::special::is_finite;

impl<F: Float> super::BytecodeTape<F> {
    /// Scan the stored values for the first non-finite entry.
    ///
    /// A singular factor or `lgamma` at a pole shows up here as the entry
    /// that first went to NaN or ±∞.
    ///
    /// # Errors
    ///
    /// [`Error::NonFiniteIntermediate`] naming the offending entry.
    pub fn validate(&self) -> Result<()> {
        self.validate_values(&self.values)
    }

    /// Like [`validate`](Self::validate) but scans an external values buffer,
    /// such as one filled by [`forward_into`](Self::forward_into).
    pub fn validate_values(&self, values: &[F]) -> Result<()> {
        match values.iter().position(|v| !is_finite(v)) {
            None => Ok(()),
            Some(index) => {
                let opcode = self.opcodes[index];
                log::warn!(
                    "non-finite tape entry {index} ({opcode:?}): {}",
                    values[index]
                );
                Err(Error::NonFiniteIntermediate { index, opcode })
            }
        }
    }
}
