//! Test utilities

pub mod allowlist;
pub mod deployments;
pub mod transactions;
