//! TxGuard CLI - batch runner and console reviewer
//!
//! This crate provides the `txguard` binary and command orchestration.

pub mod commands;
pub mod console;
pub mod context;

pub use context::{AppContext, Inputs};
