//! Configuration faults.
//!
//! Every error the core can produce is a setup problem: wrong window edges,
//! wrong detector ids, thresholds that do not match the channel count, or a
//! predicate applied to data that cannot carry it. There is no recoverable
//! kind here, degenerate inputs (empty channels, tiny populations) return
//! neutral results instead of errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    #[error("alternation period must be > 0")]
    ZeroPeriod,

    #[error("donor and acceptor excitation windows overlap: {photons} photon(s) fall in both")]
    OverlappingWindows { photons: usize },

    #[error("emission masks do not partition the photons: {detail}")]
    EmissionPartition { detail: String },

    #[error("length mismatch for `{what}`: expected {expected}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("per-channel threshold `{name}` has {found} value(s) but the dataset has {nch} channel(s)")]
    ThresholdChannelMismatch {
        name: &'static str,
        nch: usize,
        found: usize,
    },

    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("`{0}` requires an alternating-excitation dataset")]
    RequiresAlternation(&'static str),

    #[error("channel index {ich} out of range for a dataset with {nch} channel(s)")]
    ChannelOutOfRange { ich: usize, nch: usize },

    #[error("burst {burst} references period bin {bp} but `{what}` has {bins} bin(s)")]
    PeriodBinOutOfRange {
        what: &'static str,
        burst: usize,
        bp: usize,
        bins: usize,
    },

    #[error("burst array `{0}` is not available in this dataset")]
    MissingBurstData(&'static str),
}

impl Fault {
    pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), Fault> {
        if expected == found {
            Ok(())
        } else {
            Err(Fault::LengthMismatch { what, expected, found })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len() {
        assert!(Fault::check_len("nd", 3, 3).is_ok());
        let err = Fault::check_len("nd", 3, 2).unwrap_err();
        assert_eq!(
            err,
            Fault::LengthMismatch { what: "nd", expected: 3, found: 2 }
        );
        assert_eq!(err.to_string(), "length mismatch for `nd`: expected 3, found 2");
    }
}
