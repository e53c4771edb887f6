//! Photon alternation and burst selection for single-molecule FRET.

pub mod error;

// alternating excitation
pub mod alex;

// statistics helpers
pub mod algorithm;

// photons, bursts and background of an acquisition
pub mod data;

// burst selection predicates
pub mod select;

pub use error::Fault;
