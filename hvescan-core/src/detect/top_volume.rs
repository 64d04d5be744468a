//! Highest-volume days (HVD) ranking.

use serde::{Deserialize, Serialize};

use super::event::{HveEvent, VolumeDay};
use crate::domain::Bar;

/// Population ranked for the top-K highest-volume days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvdSource {
    /// Every bar in the series.
    #[default]
    AllDays,
    /// Only record events (a subset of all days).
    Records,
}

impl HvdSource {
    /// Rank the configured population, padded to exactly `k` slots.
    pub fn rank(&self, bars: &[Bar], events: &[HveEvent], k: usize) -> Vec<Option<VolumeDay>> {
        match self {
            HvdSource::AllDays => top_k_by_volume(bars.iter().map(VolumeDay::from), k),
            HvdSource::Records => top_k_by_volume(events.iter().map(VolumeDay::from), k),
        }
    }
}

/// Top `k` days by volume, descending. Ties keep input order. The result
/// always has length `k`; missing slots are `None`.
pub fn top_k_by_volume<I>(days: I, k: usize) -> Vec<Option<VolumeDay>>
where
    I: IntoIterator<Item = VolumeDay>,
{
    let mut ranked: Vec<VolumeDay> = days.into_iter().collect();
    ranked.sort_by(|a, b| b.volume.cmp(&a.volume));

    let mut out: Vec<Option<VolumeDay>> = ranked.into_iter().take(k).map(Some).collect();
    out.resize(k, None);
    out
}
