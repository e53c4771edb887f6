use fretcore::select::SelectionSummary;

/// One line per step: name, label, kept/total and the per-channel kept counts.
pub fn summary_table(summaries: &[SelectionSummary]) -> String {
    let mut out = format!("{:<4}{:<16}{:<24}{:>14}  {}\n", "#", "step", "label", "kept/total", "per channel");
    for (i, s) in summaries.iter().enumerate() {
        let per_channel = s.kept_per_channel.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(" ");
        out.push_str(&format!(
            "{:<4}{:<16}{:<24}{:>14}  {}\n",
            i + 1,
            s.name,
            s.label.as_deref().unwrap_or("-"),
            format!("{}/{}", s.kept(), s.total()),
            per_channel
        ));
    }
    out
}
