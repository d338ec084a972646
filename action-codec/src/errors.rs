//! Definitions of errors that can occur while encoding or classifying actions

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur while building action descriptors or inspecting calldata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The function signature could not be parsed
    InvalidSignature(String),
    /// The function signature parsed, but is not written in canonical form
    NonCanonicalSignature {
        /// The signature as given
        given: String,
        /// The canonical rendering of the same signature
        canonical: String,
    },
    /// A locator referenced an argument the function does not have
    ArgumentOutOfRange {
        /// The requested argument index
        argument: usize,
        /// The number of arguments the function takes
        len: usize,
    },
    /// A locator referenced a struct field the argument does not have
    FieldOutOfRange {
        /// The argument holding the struct
        argument: usize,
        /// The requested field index
        field: usize,
        /// The number of fields in the struct
        len: usize,
    },
    /// A locator requested a field of an argument that is not a struct
    NotAStruct(usize),
    /// A locator requested a field of a struct with a dynamic layout
    DynamicStruct(usize),
    /// The located value does not occupy exactly one static word
    UnhashableValue(String),
    /// Calldata was too short to hold a selector
    CalldataTooShort(usize),
    /// The number of call arguments did not match the signature
    ArgumentCount {
        /// The number of arguments the signature declares
        expected: usize,
        /// The number of arguments supplied
        got: usize,
    },
    /// An argument string could not be coerced into its ABI type
    ValueCoercion(String),
    /// An unknown action type was given
    InvalidActionType(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::InvalidSignature(s) => write!(f, "invalid function signature: {}", s),
            CodecError::NonCanonicalSignature { given, canonical } => {
                write!(f, "signature `{given}` is not canonical, expected `{canonical}`")
            }
            CodecError::ArgumentOutOfRange { argument, len } => {
                write!(f, "argument {argument} out of range for function with {len} arguments")
            }
            CodecError::FieldOutOfRange {
                argument,
                field,
                len,
            } => write!(
                f,
                "field {field} out of range for struct argument {argument} with {len} fields"
            ),
            CodecError::NotAStruct(argument) => write!(f, "argument {argument} is not a struct"),
            CodecError::DynamicStruct(argument) => {
                write!(f, "struct argument {argument} has a dynamic layout")
            }
            CodecError::UnhashableValue(ty) => {
                write!(f, "value of type `{ty}` does not occupy a single static word")
            }
            CodecError::CalldataTooShort(len) => {
                write!(f, "calldata of {len} bytes is too short to hold a selector")
            }
            CodecError::ArgumentCount { expected, got } => {
                write!(f, "expected {expected} arguments, got {got}")
            }
            CodecError::ValueCoercion(s) => write!(f, "error coercing argument: {}", s),
            CodecError::InvalidActionType(s) => write!(f, "invalid action type: {}", s),
        }
    }
}

impl Error for CodecError {}
