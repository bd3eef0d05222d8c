//! CLI command implementations.

pub mod boundary;
pub mod common;
pub mod config;
pub mod estimate;
pub mod polygon_area;
