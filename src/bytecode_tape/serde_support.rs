use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::float::Float;
use crate::opcode::{OpCode, UNUSED};

use super::{BytecodeTape, TapeState};

impl<F: Float + Serialize> Serialize for BytecodeTape<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("BytecodeTape", 8)?;
        s.serialize_field("opcodes", &self.opcodes)?;
        s.serialize_field("arg_indices", &self.arg_indices)?;
        s.serialize_field("values", &self.values)?;
        s.serialize_field("num_inputs", &self.num_inputs)?;
        s.serialize_field("num_variables", &self.num_variables)?;
        s.serialize_field("output_indices", &self.output_indices)?;
        s.serialize_field("state", &self.state)?;
        s.serialize_field("check_for_nan", &self.check_for_nan)?;
        s.end()
    }
}

impl<'de, F: Float + Deserialize<'de>> Deserialize<'de> for BytecodeTape<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct TapeData<F> {
            opcodes: Vec<OpCode>,
            arg_indices: Vec<[u32; 2]>,
            values: Vec<F>,
            num_inputs: u32,
            num_variables: u32,
            output_indices: Vec<u32>,
            #[serde(default = "recorded")]
            state: TapeState,
            #[serde(default)]
            check_for_nan: bool,
        }

        fn recorded() -> TapeState {
            TapeState::Recorded
        }

        let data = TapeData::<F>::deserialize(deserializer)?;
        check_structure(&data.opcodes, &data.arg_indices, &data.output_indices, data.num_inputs)
            .map_err(serde::de::Error::custom)?;
        if data.values.len() != data.opcodes.len()
            || data.num_variables as usize != data.opcodes.len()
        {
            return Err(serde::de::Error::custom(
                "tape arrays have inconsistent lengths",
            ));
        }

        Ok(BytecodeTape {
            opcodes: data.opcodes,
            arg_indices: data.arg_indices,
            values: data.values,
            num_inputs: data.num_inputs,
            num_variables: data.num_variables,
            output_indices: data.output_indices,
            state: data.state,
            check_for_nan: data.check_for_nan,
        })
    }
}

/// Reject tapes whose indices would make a sweep read out of bounds.
fn check_structure(
    opcodes: &[OpCode],
    arg_indices: &[[u32; 2]],
    output_indices: &[u32],
    num_inputs: u32,
) -> Result<(), String> {
    if arg_indices.len() != opcodes.len() {
        return Err("tape arrays have inconsistent lengths".into());
    }
    for (i, (&op, &[a, b])) in opcodes.iter().zip(arg_indices).enumerate() {
        let is_input = op == OpCode::Input;
        if is_input != (i < num_inputs as usize) {
            return Err(format!("entry {i}: inputs must occupy the first {num_inputs} slots"));
        }
        match op {
            OpCode::Input | OpCode::Const => {}
            _ => {
                if a as usize >= i || (op.is_binary() && b as usize >= i) {
                    return Err(format!("entry {i}: argument does not precede its use"));
                }
                if !op.is_binary() && b != UNUSED {
                    return Err(format!("entry {i}: unary op with a second argument"));
                }
            }
        }
    }
    if output_indices.is_empty() {
        return Err("tape has no outputs".into());
    }
    if let Some(&oi) = output_indices.iter().find(|&&oi| oi as usize >= opcodes.len()) {
        return Err(format!("output index {oi} out of bounds"));
    }
    Ok(())
}
