use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::level::MatchLevel;

/// Default per-rank decay of the rank-decay policy.
pub const DEFAULT_DECAY: f64 = 0.1;

/// How admitted levels are weighted when merged into one distribution.
///
/// Every policy sums `weight(level) * count(level, symbol)` over the
/// admitted levels; they differ only in `weight`.
///
/// # Variants
/// - `RankDecay { decay }`: the level of rank `i` (0 = longest match)
///   weighs `decay^i`. Admission order alone sets relative influence.
/// - `SpecificityLogRatio`: a level weighs
///   `ln(broadest + 1) / ln(total + 1)`, where `broadest` is the total of
///   the last admitted level. A level with a single match weighs
///   `ln(broadest + 1)` instead, since its denominator would vanish.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BlendPolicy {
	RankDecay { decay: f64 },
	SpecificityLogRatio,
}

impl Default for BlendPolicy {
	fn default() -> Self {
		Self::RankDecay { decay: DEFAULT_DECAY }
	}
}

impl BlendPolicy {
	/// Checks the policy parameters.
	///
	/// # Errors
	/// Returns `Error::InvalidDecay` unless `0 < decay < 1`.
	pub fn validate(&self) -> Result<()> {
		match *self {
			Self::RankDecay { decay } if !(decay > 0.0 && decay < 1.0) => Err(Error::InvalidDecay(decay)),
			_ => Ok(()),
		}
	}

	/// Weight of the level at `rank` holding `total_matches` followers,
	/// given the follower total of the broadest admitted level.
	pub fn level_weight(&self, rank: usize, total_matches: usize, broadest: usize) -> f64 {
		match *self {
			Self::RankDecay { decay } => decay.powf(rank as f64),
			Self::SpecificityLogRatio => {
				let numerator = (broadest as f64 + 1.0).ln();
				if total_matches == 1 {
					numerator
				} else {
					numerator / (total_matches as f64 + 1.0).ln()
				}
			}
		}
	}

	/// Merges `levels` into one unnormalized symbol → weight map.
	///
	/// Returns an empty map for an empty level list. Symbols whose weight
	/// underflows to zero are left out.
	pub fn blend<T: Ord + Copy>(&self, levels: &[MatchLevel<T>]) -> BTreeMap<T, f64> {
		let mut combined = BTreeMap::new();
		let Some(broadest) = levels.last().map(|level| level.total_matches) else {
			return combined;
		};

		for (rank, level) in levels.iter().enumerate() {
			let weight = self.level_weight(rank, level.total_matches, broadest);
			for (&symbol, &count) in &level.counts {
				*combined.entry(symbol).or_insert(0.0) += weight * count as f64;
			}
		}

		combined.retain(|_, weight| *weight > 0.0);
		combined
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn level(n: usize, counts: &[(u8, usize)]) -> MatchLevel<u8> {
		let counts: BTreeMap<u8, usize> = counts.iter().copied().collect();
		let total_matches = counts.values().sum();
		MatchLevel { n, counts, total_matches }
	}

	fn normalized(weights: &BTreeMap<u8, f64>) -> Vec<(u8, f64)> {
		let total: f64 = weights.values().sum();
		weights.iter().map(|(&s, &w)| (s, w / total)).collect()
	}

	#[test]
	fn test_empty_levels() {
		assert!(BlendPolicy::default().blend::<u8>(&[]).is_empty());
		assert!(BlendPolicy::SpecificityLogRatio.blend::<u8>(&[]).is_empty());
	}

	#[test]
	fn test_rank_decay_weights() {
		let levels = [level(3, &[(b'a', 1)]), level(1, &[(b'a', 2), (b'b', 3)])];
		let blended = BlendPolicy::RankDecay { decay: 0.1 }.blend(&levels);

		assert!((blended[&b'a'] - 1.2).abs() < 1e-12);
		assert!((blended[&b'b'] - 0.3).abs() < 1e-12);
	}

	#[test]
	fn test_log_ratio_weights() {
		let levels = [level(3, &[(b'a', 3)]), level(1, &[(b'a', 3), (b'b', 4)])];
		let blended = BlendPolicy::SpecificityLogRatio.blend(&levels);

		let first = 8f64.ln() / 4f64.ln();
		assert!((blended[&b'a'] - (first * 3.0 + 3.0)).abs() < 1e-12);
		assert!((blended[&b'b'] - 4.0).abs() < 1e-12);
	}

	#[test]
	fn test_log_ratio_single_match_branch() {
		let policy = BlendPolicy::SpecificityLogRatio;
		assert!((policy.level_weight(0, 1, 9) - 10f64.ln()).abs() < 1e-12);
		assert!((policy.level_weight(0, 2, 9) - 10f64.ln() / 3f64.ln()).abs() < 1e-12);
		assert!((policy.level_weight(4, 9, 9) - 1.0).abs() < 1e-12);
	}

	#[test]
	fn test_single_level_is_plain_frequency() {
		let levels = [level(2, &[(b'x', 1), (b'y', 3)])];
		for policy in [BlendPolicy::default(), BlendPolicy::SpecificityLogRatio] {
			let probabilities = normalized(&policy.blend(&levels));
			assert_eq!(probabilities.len(), 2);
			assert!((probabilities[0].1 - 0.25).abs() < 1e-12);
			assert!((probabilities[1].1 - 0.75).abs() < 1e-12);
		}
	}

	#[test]
	fn test_validate_decay() {
		assert!(BlendPolicy::RankDecay { decay: 0.5 }.validate().is_ok());
		assert!(BlendPolicy::RankDecay { decay: 0.0 }.validate().is_err());
		assert!(BlendPolicy::RankDecay { decay: 1.0 }.validate().is_err());
		assert!(BlendPolicy::RankDecay { decay: f64::NAN }.validate().is_err());
		assert!(BlendPolicy::SpecificityLogRatio.validate().is_ok());
	}
}
