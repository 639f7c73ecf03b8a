use serde::{Deserialize, Serialize};

/// Mean, population standard deviation and median of a sample.
///
/// An empty sample summarizes to all zeros.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
	pub mean: f64,
	pub std: f64,
	pub median: f64,
}

impl Summary {
	pub fn of(values: &[usize]) -> Self {
		if values.is_empty() {
			return Self::default();
		}

		let count = values.len() as f64;
		let mean = values.iter().sum::<usize>() as f64 / count;
		let variance = values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / count;

		let mut sorted = values.to_vec();
		sorted.sort_unstable();
		let middle = sorted.len() / 2;
		let median = if sorted.len() % 2 == 0 {
			(sorted[middle - 1] + sorted[middle]) as f64 / 2.0
		} else {
			sorted[middle] as f64
		};

		Self { mean, std: variance.sqrt(), median }
	}
}

/// Per-rank statistics of a generation run.
///
/// `n` summarizes the suffix lengths used at this rank, `matches` the
/// follower totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
	pub n: Summary,
	pub matches: Summary,
}

/// Raw per-rank samples collected while generating.
#[derive(Clone, Debug, Default)]
pub(crate) struct RankHistory {
	ranks: Vec<(Vec<usize>, Vec<usize>)>,
}

impl RankHistory {
	/// Records the `n` and follower total used at `rank`.
	pub(crate) fn record(&mut self, rank: usize, n: usize, matches: usize) {
		if self.ranks.len() <= rank {
			self.ranks.resize_with(rank + 1, Default::default);
		}
		let (ns, totals) = &mut self.ranks[rank];
		ns.push(n);
		totals.push(matches);
	}

	/// Summarizes every rank, padded with empty ranks up to `min_ranks`.
	pub(crate) fn summarize(&self, min_ranks: usize) -> Vec<LevelStats> {
		let mut stats: Vec<LevelStats> = self
			.ranks
			.iter()
			.map(|(ns, totals)| LevelStats { n: Summary::of(ns), matches: Summary::of(totals) })
			.collect();
		if stats.len() < min_ranks {
			stats.resize(min_ranks, LevelStats::default());
		}
		stats
	}
}
