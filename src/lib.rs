//! recomp-tracker: recomposition diagnostics for reactive render functions
//!
//! The static half analyzes a Rust source file, decides which render functions
//! need instrumentation and injects a tracker call into their bodies. The
//! runtime half is what those calls reach: it diffs each re-execution's
//! arguments against the previous ones and logs the meaningful changes.

pub mod analysis;
pub mod cli;
pub mod engine;
pub mod error;
pub mod instrument;
pub mod options;
pub mod report;
pub mod runtime;

pub use engine::{Engine, EngineOutput};
pub use error::{Error, Result};

// Re-export commonly used types
pub use analysis::{Analysis, ClosureSet, FunctionId};
pub use options::InstrumentOptions;
pub use report::InstrumentationReport;
