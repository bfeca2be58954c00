//! # unibench-tools - Tools for Unified Benchmark Instances
//!
//! This crate contains command line tools built on the `unibench` library:
//! converters from the raw benchmark formats to the unified format, an
//! instance inspector and dataset (de)compression with resumable progress.

pub mod checkpoint;
pub mod utils;
