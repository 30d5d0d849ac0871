//! # Hashgraph Test Suite
//!
//! Cross-subsystem scenarios and benchmarks.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs     # Deterministic members, DAGs and pipelines
//! │   └── integration/    # Cross-subsystem scenarios
//! └── benches/            # Criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p hg-tests
//!
//! # By scenario
//! cargo test -p hg-tests integration::restart::
//!
//! # Benchmarks
//! cargo bench -p hg-tests
//! ```

pub mod fixtures;
pub mod integration;
