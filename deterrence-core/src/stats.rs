//! Descriptive statistics over selected sessions.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::numbers::{count_to_f64, fixed};
use crate::session::GameSession;
use crate::variables::VariableId;

/// Summary measures of a dataset, kept at full precision.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (divides by `n`).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

impl DescriptiveStats {
    /// Compute statistics from unsorted values. `None` for an empty dataset.
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Compute statistics from values already sorted ascending.
    #[must_use]
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let n = sorted.len();
        let count = count_to_f64(n);
        let mean = sorted.iter().sum::<f64>() / count;
        let variance = sorted
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / count;
        Some(Self {
            n,
            mean,
            median: median_of_sorted(sorted),
            std_dev: variance.sqrt(),
            min,
            max,
            range: max - min,
        })
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Display row for one variable; numbers are fixed to two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStat {
    pub label: String,
    pub n: usize,
    pub mean: String,
    pub median: String,
    pub std_dev: String,
    pub min: String,
    pub max: String,
    pub range: String,
}

impl SummaryStat {
    #[must_use]
    pub fn from_stats(label: impl Into<String>, stats: &DescriptiveStats) -> Self {
        Self {
            label: label.into(),
            n: stats.n,
            mean: fixed(stats.mean, 2),
            median: fixed(stats.median, 2),
            std_dev: fixed(stats.std_dev, 2),
            min: fixed(stats.min, 2),
            max: fixed(stats.max, 2),
            range: fixed(stats.range, 2),
        }
    }
}

pub type SummaryTable = BTreeMap<VariableId, SummaryStat>;

/// Descriptive statistics for each selected variable across the selected
/// sessions. Empty when either selection is empty.
#[must_use]
pub fn summarize(sessions: &[&GameSession], variables: &[VariableId]) -> SummaryTable {
    if sessions.is_empty() || variables.is_empty() {
        return SummaryTable::new();
    }
    variables
        .iter()
        .filter_map(|variable| {
            let values = sessions.iter().map(|session| variable.extract(session));
            DescriptiveStats::new(values)
                .map(|stats| (*variable, SummaryStat::from_stats(variable.label(), &stats)))
        })
        .collect()
}
