use serde::{Deserialize, Serialize};

use crate::algorithm::utility::select_by_mask;
use crate::error::Fault;

/// Burst-level arrays of one channel, as produced by the burst search.
///
/// Start and end are clock ticks. All arrays share the burst count.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bursts {
    pub start: Vec<u64>,
    pub end: Vec<u64>,
    pub nd: Vec<f64>,
    pub na: Vec<f64>,
    pub nt: Vec<f64>,
    /// Background period bin of each burst.
    pub bp: Vec<usize>,
    /// FRET efficiency E.
    pub efficiency: Vec<f64>,
    /// Peak photon rate inside each burst, when the burst search computed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rate: Option<Vec<f64>>,
}

impl Bursts {
    pub fn len(&self) -> usize {
        self.start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_empty()
    }

    /// Burst duration in clock ticks.
    pub fn width(&self) -> Vec<u64> {
        self.start
            .iter()
            .zip(self.end.iter())
            .map(|(s, e)| e.saturating_sub(*s))
            .collect()
    }

    pub fn width_s(&self, clk_p: f64) -> Vec<f64> {
        self.width().iter().map(|w| *w as f64 * clk_p).collect()
    }

    pub fn start_s(&self, clk_p: f64) -> Vec<f64> {
        self.start.iter().map(|s| *s as f64 * clk_p).collect()
    }

    /// Gap between consecutive bursts, `start[i + 1] - end[i]`, in clock ticks.
    ///
    /// Negative or zero for overlapping or touching bursts.
    pub fn separation(&self) -> Vec<i64> {
        self.start
            .iter()
            .skip(1)
            .zip(self.end.iter())
            .map(|(next_start, end)| *next_start as i64 - *end as i64)
            .collect()
    }

    pub fn validate(&self) -> Result<(), Fault> {
        let n = self.len();
        Fault::check_len("end", n, self.end.len())?;
        Fault::check_len("nd", n, self.nd.len())?;
        Fault::check_len("na", n, self.na.len())?;
        Fault::check_len("nt", n, self.nt.len())?;
        Fault::check_len("bp", n, self.bp.len())?;
        Fault::check_len("efficiency", n, self.efficiency.len())?;
        if let Some(max_rate) = &self.max_rate {
            Fault::check_len("max_rate", n, max_rate.len())?;
        }
        Ok(())
    }

    /// Narrow every array to the bursts whose mask entry is `true`.
    pub fn select(&self, mask: &[bool]) -> Result<Bursts, Fault> {
        Fault::check_len("burst mask", self.len(), mask.len())?;
        Ok(Bursts {
            start: select_by_mask(&self.start, mask),
            end: select_by_mask(&self.end, mask),
            nd: select_by_mask(&self.nd, mask),
            na: select_by_mask(&self.na, mask),
            nt: select_by_mask(&self.nt, mask),
            bp: select_by_mask(&self.bp, mask),
            efficiency: select_by_mask(&self.efficiency, mask),
            max_rate: self.max_rate.as_ref().map(|m| select_by_mask(m, mask)),
        })
    }
}

/// Burst arrays that only exist with alternating excitation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlexBursts {
    /// Acceptor emission during acceptor excitation.
    pub naa: Vec<f64>,
    /// Stoichiometry S.
    pub stoichiometry: Vec<f64>,
}

impl AlexBursts {
    pub fn validate(&self, n_bursts: usize) -> Result<(), Fault> {
        Fault::check_len("naa", n_bursts, self.naa.len())?;
        Fault::check_len("stoichiometry", n_bursts, self.stoichiometry.len())
    }

    pub fn select(&self, mask: &[bool]) -> Result<AlexBursts, Fault> {
        Fault::check_len("burst mask", self.naa.len(), mask.len())?;
        Ok(AlexBursts {
            naa: select_by_mask(&self.naa, mask),
            stoichiometry: select_by_mask(&self.stoichiometry, mask),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bursts {
        Bursts {
            start: vec![100, 300, 350, 1000],
            end: vec![200, 360, 500, 1100],
            nd: vec![10.0, 20.0, 30.0, 40.0],
            na: vec![1.0, 2.0, 3.0, 4.0],
            nt: vec![11.0, 22.0, 33.0, 44.0],
            bp: vec![0, 0, 1, 1],
            efficiency: vec![0.1, 0.2, 0.3, 0.4],
            max_rate: None,
        }
    }

    #[test]
    fn test_width_and_separation() {
        let b = sample();
        assert_eq!(b.width(), vec![100, 60, 150, 100]);
        assert_eq!(b.separation(), vec![100, -10, 500]);
        let w = b.width_s(1e-3);
        assert!((w[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_empty_separation() {
        let b = Bursts::default();
        assert!(b.separation().is_empty());
        assert!(b.width().is_empty());
        assert!(b.validate().is_ok());
    }

    #[test]
    fn test_select_keeps_arrays_aligned() {
        let b = sample();
        let narrowed = b.select(&[false, true, false, true]).unwrap();
        assert!(narrowed.validate().is_ok());
        assert_eq!(narrowed.start, vec![300, 1000]);
        assert_eq!(narrowed.nd, vec![20.0, 40.0]);
        assert_eq!(narrowed.bp, vec![0, 1]);
        assert_eq!(narrowed.efficiency, vec![0.2, 0.4]);
    }

    #[test]
    fn test_select_rejects_wrong_mask() {
        let b = sample();
        assert!(matches!(b.select(&[true]), Err(Fault::LengthMismatch { .. })));
    }

    #[test]
    fn test_validate_detects_mismatch() {
        let mut b = sample();
        b.na.pop();
        assert_eq!(
            b.validate(),
            Err(Fault::LengthMismatch { what: "na", expected: 4, found: 3 })
        );
    }
}
