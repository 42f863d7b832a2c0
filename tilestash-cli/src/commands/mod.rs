//! CLI command implementations.

pub mod common;
pub mod config;
pub mod download;
pub mod packages;
pub mod search;
pub mod tile;
