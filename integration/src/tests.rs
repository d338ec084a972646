//! Integration tests for the balance contract's allowlist and its operations scripts

mod allowlist;
mod execute;
mod plan;
