//! Selection pipelines: an ordered list of predicate steps read from JSON.
//!
//! ```json
//! {"steps": [{"kind": "nda", "th1": 30}, {"kind": "es", "s1": 0.2, "s2": 0.8}]}
//! ```
//!
//! Parameters left out of a step take the predicate defaults.

use log::info;
use serde::{Deserialize, Serialize};

use fretcore::data::Dataset;
use fretcore::select::background::{
    NaBg, NaBgP, NaaBg, NaaBgP, NdBg, NdBgP, NtBg, NtBgP, SizeNoise, SizeNoiseOr,
};
use fretcore::select::fret::{ForBtFit, FretValue};
use fretcore::select::proximity::{Attached, Attached2, Nearby, Nearby2, Single};
use fretcore::select::range::{
    ERange, ESEllipse, ESRange, MaxRate, NaRange, NaaRange, NdRange, PeriodRange, SRange, TimeRange,
    WidthRange,
};
use fretcore::select::size::{Nda, NdaPercentile, TopNNda};
use fretcore::select::{select_bursts, SelectionSummary};
use fretcore::Fault;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionStep {
    E(ERange),
    S(SRange),
    Es(ESRange),
    EsEllipse(ESEllipse),
    Period(PeriodRange),
    Time(TimeRange),
    Width(WidthRange),
    Nd(NdRange),
    Na(NaRange),
    Naa(NaaRange),
    MaxRate(MaxRate),
    Nda(Nda),
    NdaPercentile(NdaPercentile),
    TopNNda(TopNNda),
    Single(Single),
    Attached,
    Attached2,
    Nearby(Nearby),
    Nearby2(Nearby2),
    NdBg(NdBg),
    NaBg(NaBg),
    NaaBg(NaaBg),
    NtBg(NtBg),
    NdBgP(NdBgP),
    NaBgP(NaBgP),
    NaaBgP(NaaBgP),
    NtBgP(NtBgP),
    SizeNoise(SizeNoise),
    SizeNoiseOr(SizeNoiseOr),
    FretValue(FretValue),
    ForBtFit(ForBtFit),
}

impl SelectionStep {
    /// The `kind` tag of the step.
    pub fn name(&self) -> &'static str {
        match self {
            SelectionStep::E(_) => "e",
            SelectionStep::S(_) => "s",
            SelectionStep::Es(_) => "es",
            SelectionStep::EsEllipse(_) => "es_ellipse",
            SelectionStep::Period(_) => "period",
            SelectionStep::Time(_) => "time",
            SelectionStep::Width(_) => "width",
            SelectionStep::Nd(_) => "nd",
            SelectionStep::Na(_) => "na",
            SelectionStep::Naa(_) => "naa",
            SelectionStep::MaxRate(_) => "max_rate",
            SelectionStep::Nda(_) => "nda",
            SelectionStep::NdaPercentile(_) => "nda_percentile",
            SelectionStep::TopNNda(_) => "top_n_nda",
            SelectionStep::Single(_) => "single",
            SelectionStep::Attached => "attached",
            SelectionStep::Attached2 => "attached2",
            SelectionStep::Nearby(_) => "nearby",
            SelectionStep::Nearby2(_) => "nearby2",
            SelectionStep::NdBg(_) => "nd_bg",
            SelectionStep::NaBg(_) => "na_bg",
            SelectionStep::NaaBg(_) => "naa_bg",
            SelectionStep::NtBg(_) => "nt_bg",
            SelectionStep::NdBgP(_) => "nd_bg_p",
            SelectionStep::NaBgP(_) => "na_bg_p",
            SelectionStep::NaaBgP(_) => "naa_bg_p",
            SelectionStep::NtBgP(_) => "nt_bg_p",
            SelectionStep::SizeNoise(_) => "size_noise",
            SelectionStep::SizeNoiseOr(_) => "size_noise_or",
            SelectionStep::FretValue(_) => "fret_value",
            SelectionStep::ForBtFit(_) => "for_bt_fit",
        }
    }

    /// Narrow `d` to the bursts this step selects.
    pub fn apply(&self, d: &Dataset) -> Result<(Dataset, SelectionSummary), Fault> {
        let name = self.name();
        match self {
            SelectionStep::E(p) => select_bursts(d, p, name),
            SelectionStep::S(p) => select_bursts(d, p, name),
            SelectionStep::Es(p) => select_bursts(d, p, name),
            SelectionStep::EsEllipse(p) => select_bursts(d, p, name),
            SelectionStep::Period(p) => select_bursts(d, p, name),
            SelectionStep::Time(p) => select_bursts(d, p, name),
            SelectionStep::Width(p) => select_bursts(d, p, name),
            SelectionStep::Nd(p) => select_bursts(d, p, name),
            SelectionStep::Na(p) => select_bursts(d, p, name),
            SelectionStep::Naa(p) => select_bursts(d, p, name),
            SelectionStep::MaxRate(p) => select_bursts(d, p, name),
            SelectionStep::Nda(p) => select_bursts(d, p, name),
            SelectionStep::NdaPercentile(p) => select_bursts(d, p, name),
            SelectionStep::TopNNda(p) => select_bursts(d, p, name),
            SelectionStep::Single(p) => select_bursts(d, p, name),
            SelectionStep::Attached => select_bursts(d, &Attached, name),
            SelectionStep::Attached2 => select_bursts(d, &Attached2, name),
            SelectionStep::Nearby(p) => select_bursts(d, p, name),
            SelectionStep::Nearby2(p) => select_bursts(d, p, name),
            SelectionStep::NdBg(p) => select_bursts(d, p, name),
            SelectionStep::NaBg(p) => select_bursts(d, p, name),
            SelectionStep::NaaBg(p) => select_bursts(d, p, name),
            SelectionStep::NtBg(p) => select_bursts(d, p, name),
            SelectionStep::NdBgP(p) => select_bursts(d, p, name),
            SelectionStep::NaBgP(p) => select_bursts(d, p, name),
            SelectionStep::NaaBgP(p) => select_bursts(d, p, name),
            SelectionStep::NtBgP(p) => select_bursts(d, p, name),
            SelectionStep::SizeNoise(p) => select_bursts(d, p, name),
            SelectionStep::SizeNoiseOr(p) => select_bursts(d, p, name),
            SelectionStep::FretValue(p) => select_bursts(d, p, name),
            SelectionStep::ForBtFit(p) => select_bursts(d, p, name),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pipeline {
    pub steps: Vec<SelectionStep>,
}

/// Apply every step in order, each one narrowing the result of the previous.
///
/// An empty pipeline returns the dataset unchanged with no summaries.
pub fn run_pipeline(dataset: Dataset, pipeline: &Pipeline) -> Result<(Dataset, Vec<SelectionSummary>), Fault> {
    let mut current = dataset;
    let mut summaries = Vec::with_capacity(pipeline.steps.len());
    for (i, step) in pipeline.steps.iter().enumerate() {
        let (selected, summary) = step.apply(&current)?;
        info!(
            "step {} `{}`: {} -> {} burst(s)",
            i + 1,
            step.name(),
            summary.total(),
            summary.kept()
        );
        current = selected;
        summaries.push(summary);
    }
    Ok((current, summaries))
}
