//! Range selections on precomputed per-burst quantities.

use serde::{Deserialize, Serialize};

use crate::algorithm::utility::max_value;
use crate::data::dataset::Dataset;
use crate::error::Fault;
use crate::select::{in_range, ms_to_ticks, BurstMask, BurstPredicate};

/// Bursts with E in `[e1, e2]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ERange {
    pub e1: f64,
    pub e2: f64,
}

impl Default for ERange {
    fn default() -> Self {
        ERange { e1: -0.2, e2: 1.2 }
    }
}

impl BurstPredicate for ERange {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let bursts = d.bursts(ich)?;
        Ok((in_range(&bursts.efficiency, self.e1, self.e2), String::new()))
    }
}

/// Bursts with S in `[s1, s2]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SRange {
    pub s1: f64,
    pub s2: f64,
}

impl Default for SRange {
    fn default() -> Self {
        SRange { s1: -0.2, s2: 1.2 }
    }
}

impl BurstPredicate for SRange {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let alex = d.alex_bursts(ich, "S")?;
        Ok((in_range(&alex.stoichiometry, self.s1, self.s2), String::new()))
    }
}

/// Bursts inside the `[e1, e2] x [s1, s2]` box of the E-S histogram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ESRange {
    pub e1: f64,
    pub e2: f64,
    pub s1: f64,
    pub s2: f64,
}

impl Default for ESRange {
    fn default() -> Self {
        ESRange { e1: -0.2, e2: 1.2, s1: -0.2, s2: 1.2 }
    }
}

impl BurstPredicate for ESRange {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let alex = d.alex_bursts(ich, "ES")?;
        let bursts = d.bursts(ich)?;
        let e_mask = in_range(&bursts.efficiency, self.e1, self.e2);
        let s_mask = in_range(&alex.stoichiometry, self.s1, self.s2);
        let mask = e_mask.iter().zip(s_mask.iter()).map(|(e, s)| *e && *s).collect();
        Ok((mask, String::new()))
    }
}

/// Bursts inside the ellipse inscribed in the `[e1, e2] x [s1, s2]` box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ESEllipse {
    pub e1: f64,
    pub e2: f64,
    pub s1: f64,
    pub s2: f64,
}

impl Default for ESEllipse {
    fn default() -> Self {
        ESEllipse { e1: -0.2, e2: 1.2, s1: -0.2, s2: 1.2 }
    }
}

impl ESEllipse {
    /// Squared normalized radius, `<= 1` inside the ellipse.
    pub fn radius2(&self, e: f64, s: f64) -> f64 {
        let (rx, ry) = (0.5 * (self.e2 - self.e1).abs(), 0.5 * (self.s2 - self.s1).abs());
        let (mid_e, mid_s) = (0.5 * (self.e1 + self.e2), 0.5 * (self.s1 + self.s2));
        ((e - mid_e) / rx).powi(2) + ((s - mid_s) / ry).powi(2)
    }
}

impl BurstPredicate for ESEllipse {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let alex = d.alex_bursts(ich, "ESe")?;
        let bursts = d.bursts(ich)?;
        let mask = bursts
            .efficiency
            .iter()
            .zip(alex.stoichiometry.iter())
            .map(|(e, s)| self.radius2(*e, *s) <= 1.0)
            .collect();
        Ok((mask, String::new()))
    }
}

/// Bursts from background period `bp1` to `bp2`, both included. `bp2` defaults to the last period.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodRange {
    pub bp1: usize,
    pub bp2: Option<usize>,
}

impl BurstPredicate for PeriodRange {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let bp = &d.bursts(ich)?.bp;
        let Some(bp2) = self.bp2.or_else(|| bp.iter().max().copied()) else {
            return Ok((Vec::new(), String::new()));
        };
        let mask = bp.iter().map(|b| *b >= self.bp1 && *b <= bp2).collect();
        Ok((mask, String::new()))
    }
}

/// Bursts starting between `time_s1` and `time_s2` seconds. `time_s2` defaults to the last start.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRange {
    pub time_s1: f64,
    pub time_s2: Option<f64>,
}

impl BurstPredicate for TimeRange {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let start = d.bursts(ich)?.start_s(d.clk_p());
        let Some(time_s2) = self.time_s2.or_else(|| max_value(&start)) else {
            return Ok((Vec::new(), String::new()));
        };
        Ok((in_range(&start, self.time_s1, time_s2), String::new()))
    }
}

/// Bursts with width between `th1` and `th2` milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidthRange {
    pub th1: f64,
    pub th2: f64,
}

impl Default for WidthRange {
    fn default() -> Self {
        WidthRange { th1: 0.5, th2: 1.0 }
    }
}

impl BurstPredicate for WidthRange {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let clk_p = d.clk_p();
        let width: Vec<f64> = d.bursts(ich)?.width().iter().map(|w| *w as f64).collect();
        let mask = in_range(&width, ms_to_ticks(self.th1, clk_p), ms_to_ticks(self.th2, clk_p));
        Ok((mask, String::new()))
    }
}

/// Photon-count range `[th1, th2]` on one of the raw burst counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountRange {
    pub th1: f64,
    pub th2: f64,
}

impl Default for CountRange {
    fn default() -> Self {
        CountRange { th1: 20.0, th2: 1000.0 }
    }
}

/// Bursts with `nd` in range.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NdRange(pub CountRange);

/// Bursts with `na` in range.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NaRange(pub CountRange);

/// Bursts with `naa` in range.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NaaRange(pub CountRange);

impl BurstPredicate for NdRange {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        Ok((in_range(&d.bursts(ich)?.nd, self.0.th1, self.0.th2), String::new()))
    }
}

impl BurstPredicate for NaRange {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        Ok((in_range(&d.bursts(ich)?.na, self.0.th1, self.0.th2), String::new()))
    }
}

impl BurstPredicate for NaaRange {
    type Output = (BurstMask, String);

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let naa = &d.alex_bursts(ich, "naa")?.naa;
        Ok((in_range(naa, self.0.th1, self.0.th2), String::new()))
    }
}

/// Bursts whose peak rate is at least `min_rate_p` times the channel's highest peak rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxRate {
    pub min_rate_p: f64,
}

impl Default for MaxRate {
    fn default() -> Self {
        MaxRate { min_rate_p: 0.1 }
    }
}

impl BurstPredicate for MaxRate {
    type Output = BurstMask;

    fn evaluate(&self, d: &Dataset, ich: usize) -> Result<Self::Output, Fault> {
        let bursts = d.bursts(ich)?;
        if bursts.is_empty() {
            return Ok(Vec::new());
        }
        let max_rate = bursts.max_rate.as_ref().ok_or(Fault::MissingBurstData("max_rate"))?;
        let Some(highest) = max_value(max_rate) else {
            return Ok(Vec::new());
        };
        let min_rate = highest * self.min_rate_p;
        Ok(max_rate.iter().map(|r| *r >= min_rate).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::{alex_dataset, single_dataset};

    #[test]
    fn test_default_e_range_keeps_physical_values() {
        let d = alex_dataset();
        let (mask, label) = ERange::default().evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![true; 4]);
        assert!(label.is_empty());
    }

    #[test]
    fn test_e_range() {
        let d = alex_dataset();
        let (mask, _) = ERange { e1: 0.3, e2: 0.75 }.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![true, true, false, true]);
    }

    #[test]
    fn test_s_and_es_ranges() {
        let d = alex_dataset();
        let (mask, _) = SRange { s1: 0.65, s2: 0.8 }.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![false, true, true, true]);
        let es = ESRange { e1: 0.3, e2: 1.0, s1: 0.65, s2: 0.8 };
        assert_eq!(es.evaluate(&d, 0).unwrap().0, vec![false, true, false, true]);
    }

    #[test]
    fn test_s_needs_alternation() {
        let d = single_dataset();
        assert_eq!(SRange::default().evaluate(&d, 0), Err(Fault::RequiresAlternation("S")));
        assert_eq!(ESEllipse::default().evaluate(&d, 0), Err(Fault::RequiresAlternation("ESe")));
    }

    #[test]
    fn test_ellipse() {
        let sel = ESEllipse { e1: 0.0, e2: 1.0, s1: 0.0, s2: 1.0 };
        assert!((sel.radius2(0.5, 0.5)).abs() < 1e-12);
        assert!((sel.radius2(1.0, 0.5) - 1.0).abs() < 1e-12);
        // box corner is outside the inscribed ellipse
        assert!(sel.radius2(0.95, 0.95) > 1.0);

        let d = alex_dataset();
        let narrow = ESEllipse { e1: 0.2, e2: 0.8, s1: 0.5, s2: 0.9 };
        assert_eq!(narrow.evaluate(&d, 0).unwrap().0, vec![true, true, false, true]);
    }

    #[test]
    fn test_period_range() {
        let d = alex_dataset();
        let (mask, _) = PeriodRange { bp1: 1, bp2: None }.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![false, false, true, true]);
        let (mask, _) = PeriodRange { bp1: 0, bp2: Some(0) }.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![true, true, false, false]);
    }

    #[test]
    fn test_time_range() {
        let d = alex_dataset();
        // starts at 0, 1.25, 2.5, 3.75 ms
        let (mask, _) = TimeRange { time_s1: 1e-3, time_s2: None }.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![false, true, true, true]);
        let (mask, _) = TimeRange { time_s1: 0.0, time_s2: Some(2e-3) }.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![true, true, false, false]);
    }

    #[test]
    fn test_width_range() {
        let d = alex_dataset();
        // every burst is 80000 ticks = 1 ms wide
        let (mask, _) = WidthRange { th1: 0.5, th2: 1.5 }.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![true; 4]);
        let (mask, _) = WidthRange { th1: 1.5, th2: 3.0 }.evaluate(&d, 0).unwrap();
        assert_eq!(mask, vec![false; 4]);
    }

    #[test]
    fn test_count_ranges() {
        let d = alex_dataset();
        assert_eq!(NdRange::default().evaluate(&d, 0).unwrap().0, vec![false, true, true, false]);
        assert_eq!(NaRange::default().evaluate(&d, 0).unwrap().0, vec![true, true, false, false]);
        assert_eq!(NaaRange::default().evaluate(&d, 0).unwrap().0, vec![true, true, true, false]);
    }

    #[test]
    fn test_max_rate() {
        let mut d = single_dataset();
        assert_eq!(MaxRate::default().evaluate(&d, 0), Err(Fault::MissingBurstData("max_rate")));
        if let Dataset::SingleExcitation(data) = &mut d {
            data.channels[0].bursts.max_rate = Some(vec![100.0, 5.0, 10.0, 50.0]);
        }
        assert_eq!(MaxRate::default().evaluate(&d, 0).unwrap(), vec![true, false, true, true]);
    }

    #[test]
    fn test_empty_channel() {
        let d = alex_dataset();
        assert!(ERange::default().evaluate(&d, 1).unwrap().0.is_empty());
        assert!(ESEllipse::default().evaluate(&d, 1).unwrap().0.is_empty());
        assert!(PeriodRange::default().evaluate(&d, 1).unwrap().0.is_empty());
        assert!(TimeRange::default().evaluate(&d, 1).unwrap().0.is_empty());
        assert!(WidthRange::default().evaluate(&d, 1).unwrap().0.is_empty());
        assert!(MaxRate::default().evaluate(&d, 1).unwrap().is_empty());
    }
}
