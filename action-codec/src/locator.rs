//! Typed locators for the argument a parameter-scoped approval constrains
//!
//! The balance contract hashes a single 32 byte word of the encoded arguments,
//! addressed by its position in the head of the encoding. Static structs are
//! encoded inline, so a field of a struct argument lives at a word index that
//! depends on every static value preceding it. A [`FieldLocator`] names the
//! value by argument and field and resolves the word index from the function
//! signature, so approval and check sides cannot disagree about which word is
//! hashed.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use alloy_dyn_abi::DynSolType;
use alloy_json_abi::Function;
use serde::{Deserialize, Serialize};

use crate::{errors::CodecError, selector::input_types};

/// The position of a value within a function's arguments
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldLocator {
    /// The index of the top-level argument
    pub argument: usize,
    /// The index of the field within the argument, when the argument is a struct
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<usize>,
}

impl FieldLocator {
    /// Locate a top-level argument
    pub const fn argument(argument: usize) -> Self {
        Self {
            argument,
            field: None,
        }
    }

    /// Locate a field of a struct argument
    pub const fn field(argument: usize, field: usize) -> Self {
        Self {
            argument,
            field: Some(field),
        }
    }

    /// Resolve the index of the encoded word holding the located value
    pub fn resolve(&self, function: &Function) -> Result<usize, CodecError> {
        self.resolve_typed(function).map(|(slot, _)| slot)
    }

    /// Resolve the index of the encoded word holding the located value,
    /// along with the value's ABI type
    pub fn resolve_typed(&self, function: &Function) -> Result<(usize, DynSolType), CodecError> {
        let types = input_types(function)?;
        let arg_ty = types
            .get(self.argument)
            .ok_or(CodecError::ArgumentOutOfRange {
                argument: self.argument,
                len: types.len(),
            })?;

        let mut slot: usize = types[..self.argument].iter().map(head_words).sum();
        let value_ty = match self.field {
            None => arg_ty,
            Some(field) => {
                let DynSolType::Tuple(fields) = arg_ty else {
                    return Err(CodecError::NotAStruct(self.argument));
                };
                if arg_ty.is_dynamic() {
                    return Err(CodecError::DynamicStruct(self.argument));
                }

                let field_ty = fields.get(field).ok_or(CodecError::FieldOutOfRange {
                    argument: self.argument,
                    field,
                    len: fields.len(),
                })?;
                slot += fields[..field].iter().map(head_words).sum::<usize>();
                field_ty
            }
        };

        if value_ty.is_dynamic() || head_words(value_ty) != 1 {
            return Err(CodecError::UnhashableValue(
                value_ty.sol_type_name().into_owned(),
            ));
        }

        Ok((slot, value_ty.clone()))
    }
}

/// The number of words a value of the given type occupies in the head of an
/// encoding. Dynamic values occupy a single offset word.
fn head_words(ty: &DynSolType) -> usize {
    if ty.is_dynamic() {
        return 1;
    }

    match ty {
        DynSolType::Tuple(fields) => fields.iter().map(head_words).sum(),
        DynSolType::FixedArray(inner, len) => len * head_words(inner),
        _ => 1,
    }
}

impl Display for FieldLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "{}.{}", self.argument, field),
            None => write!(f, "{}", self.argument),
        }
    }
}

impl FromStr for FieldLocator {
    type Err = CodecError;

    /// Parses `<argument>` or `<argument>.<field>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| CodecError::ValueCoercion(format!("invalid locator `{s}`")))
        };

        match s.split_once('.') {
            Some((argument, field)) => Ok(Self::field(parse(argument)?, parse(field)?)),
            None => Ok(Self::argument(parse(s)?)),
        }
    }
}
