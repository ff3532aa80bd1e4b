//! Deterministic, pure logic over parsed run parameters.
//!
//! Core modules must be free of I/O side effects. They operate on the
//! in-memory model and return deterministic outputs suitable for tests.

pub mod compare;
pub mod invariants;
pub mod model;
pub mod run_id;
