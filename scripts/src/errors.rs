//! Definitions of errors that can occur during the execution of the contract management scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use action_codec::CodecError;

/// Errors that can occur during the execution of the contract management scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading the deployments file
    ReadDeployments(String),
    /// Error writing the deployments file
    WriteDeployments(String),
    /// Error reading an approval plan
    ReadPlan(String),
    /// Error parsing a Solidity compilation artifact
    ArtifactParsing(String),
    /// One or more required environment variables are missing or invalid
    MissingEnv(Vec<String>),
    /// The connected chain has no entry in the network table
    UnsupportedChain(u64),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// A transaction was mined but reverted
    TransactionReverted(String),
    /// A call was refused by the balance contract's allowlist
    ActionNotAllowed(String),
    /// An argument was invalid for the requested operation
    InvalidArgument(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ReadPlan(s) => write!(f, "error reading approval plan: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::MissingEnv(vars) => {
                write!(f, "missing or invalid environment variables: {}", vars.join(", "))
            }
            ScriptError::UnsupportedChain(id) => write!(f, "unsupported chain id: {}", id),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::TransactionReverted(s) => write!(f, "transaction reverted: {}", s),
            ScriptError::ActionNotAllowed(s) => write!(f, "action not allowed: {}", s),
            ScriptError::InvalidArgument(s) => write!(f, "invalid argument: {}", s),
        }
    }
}

impl Error for ScriptError {}

impl From<CodecError> for ScriptError {
    fn from(e: CodecError) -> Self {
        ScriptError::CalldataConstruction(e.to_string())
    }
}
