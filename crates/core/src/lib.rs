//! Core types for the dexquote price resolution engine
//!
//! This crate provides the shared vocabulary used across the workspace:
//! - Chain and protocol-generation identifiers
//! - Pair requests, resolved pairs, reserve snapshots and price results
//! - Token decimal classification tables
//! - Error taxonomy and configuration types

pub mod config;
pub mod errors;
pub mod tokens;
pub mod types;

pub use config::*;
pub use errors::*;
pub use tokens::*;
pub use types::*;
