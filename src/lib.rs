//! # unibench - Unified Benchmark Instances for Partitioning and Coloring
//!
//! `unibench` loads graph partitioning, graph coloring and number
//! partitioning benchmark instances stored in a unified text format and
//! normalizes the raw formats the benchmarks are distributed in (DIMACS,
//! DIMACS10/METIS, Matrix Market, P&K) into it.
//!
//! ## Crate Features
//!
//! | Feature name | Description |
//! | --- | --- |
//! | `compression` | Transparent reading and writing of gzip, bzip2 and tar-wrapped xz files. |
//! | `fxhash` | Use the faster firefox hash function from `rustc-hash`. |
//! | `serde` | Serialization of instances and types with `serde`. |
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! Currently, the MSRV is 1.76.0.

pub mod instances;
pub mod loader;
pub mod types;
