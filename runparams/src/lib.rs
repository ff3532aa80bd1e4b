//! Ingestion of Illumina `runParameters.xml` documents.
//!
//! A sequencer writes `runParameters.xml` into every run folder. This crate
//! reads it into a validated [`RunConfiguration`] and reports every defect it
//! finds. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (model, run ID shape, invariants,
//!   expected-run comparison). No I/O.
//! - **[`io`]**: XML documents, run folders and TOML files.
//!
//! [`scan`] and [`summary`] back the `runparams` CLI commands.
//!
//! ```no_run
//! let bytes = std::fs::read("runParameters.xml")?;
//! let run = runparams::parse(&bytes)?;
//! println!("{} on lanes {:?}", run.run_id, run.align_to_phix);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod scan;
pub mod summary;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::model::{
    ReadDefinition, ReadLengths, ReagentKit, ReagentKitKind, RunConfiguration,
};
pub use crate::error::{ParseError, Violation};
pub use crate::io::config::ReaderConfig;
pub use crate::io::reader::{RunParametersReader, parse};
