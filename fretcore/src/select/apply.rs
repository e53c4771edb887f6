use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::dataset::Dataset;
use crate::error::Fault;
use crate::select::{BurstPredicate, IntoSelection, Selection};

/// Outcome of one selection step over all channels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub name: String,
    pub label: Option<String>,
    pub kept_per_channel: Vec<usize>,
    pub total_per_channel: Vec<usize>,
}

impl SelectionSummary {
    pub fn kept(&self) -> usize {
        self.kept_per_channel.iter().sum()
    }

    pub fn total(&self) -> usize {
        self.total_per_channel.iter().sum()
    }
}

/// Evaluate `predicate` on every channel, checking each mask against the burst count.
pub fn evaluate_masks<P>(d: &Dataset, predicate: &P) -> Result<Vec<Selection>, Fault>
where
    P: BurstPredicate + ?Sized,
{
    (0..d.nch())
        .map(|ich| {
            let selection = predicate.evaluate(d, ich)?.into_selection();
            Fault::check_len("burst mask", d.n_bursts(ich)?, selection.mask.len())?;
            Ok(selection)
        })
        .collect()
}

/// Copy of `d` keeping only the bursts selected by `predicate`, channel by channel.
///
/// The summary label is the one produced for the first channel.
pub fn select_bursts<P>(d: &Dataset, predicate: &P, name: &str) -> Result<(Dataset, SelectionSummary), Fault>
where
    P: BurstPredicate + ?Sized,
{
    let selections = evaluate_masks(d, predicate)?;
    let mut selected = d.clone();
    let mut kept_per_channel = Vec::with_capacity(selections.len());
    let mut total_per_channel = Vec::with_capacity(selections.len());
    for (ich, selection) in selections.iter().enumerate() {
        total_per_channel.push(selection.mask.len());
        kept_per_channel.push(selection.kept());
        selected.retain_bursts(ich, &selection.mask)?;
    }

    let summary = SelectionSummary {
        name: name.to_string(),
        label: selections.first().and_then(|s| s.label.clone()),
        kept_per_channel,
        total_per_channel,
    };
    debug!("selection `{}`: kept {} of {} burst(s)", name, summary.kept(), summary.total());
    Ok((selected, summary))
}
