use log::info;
use serde::{Deserialize, Serialize};

use fretcore::alex::{alternation_histogram, apply_alternation, AlexPhotons, AlternationConfig};
use fretcore::Fault;

use crate::io::RawPhotons;

/// Photon counts before and after applying the alternation, plus the
/// histogram of arrival times within the period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlternationReport {
    pub raw: usize,
    pub kept: usize,
    pub donor_ex: usize,
    pub acceptor_ex: usize,
    pub acceptor_em_acceptor_ex: usize,
    pub histogram: Vec<u64>,
}

/// Apply `config` to a raw stream. The histogram covers all raw photons.
pub fn alternate(
    raw: RawPhotons,
    config: &AlternationConfig,
    bins: usize,
) -> Result<(AlexPhotons, AlternationReport), Fault> {
    let histogram = alternation_histogram(&raw.times, config.period.length, bins);
    let n_raw = raw.times.len();
    let photons = apply_alternation(raw.times, raw.detectors, config)?;

    let report = AlternationReport {
        raw: n_raw,
        kept: photons.len(),
        donor_ex: photons.donor_ex.iter().filter(|x| **x).count(),
        acceptor_ex: photons.acceptor_ex.iter().filter(|x| **x).count(),
        acceptor_em_acceptor_ex: photons.acceptor_em_acceptor_ex(),
        histogram,
    };
    info!(
        "alternation: {} of {} photon(s) kept, {} donor-ex, {} acceptor-ex",
        report.kept, report.raw, report.donor_ex, report.acceptor_ex
    );
    Ok((photons, report))
}
