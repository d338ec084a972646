//! Scripts for deploying and operating the balance-managed fund contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
mod commands;
pub mod config;
pub mod constants;
pub mod context;
pub mod errors;
pub mod plan;
pub mod solidity;
pub mod types;
pub mod utils;
