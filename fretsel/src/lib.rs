//! JSON front end for `fretcore`: datasets, selection pipelines and the
//! `fretsel` command line.

pub mod alternate;
pub mod cli;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod report;

pub use error::{Result, SelError};
pub use pipeline::{run_pipeline, Pipeline, SelectionStep};
