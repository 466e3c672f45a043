//! Subcommands

pub mod drop;
pub mod query;
pub mod schemas;
pub mod upload;
