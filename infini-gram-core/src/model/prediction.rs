use std::collections::BTreeMap;

use crate::index::CorpusIndex;
use crate::model::blend::BlendPolicy;
use crate::model::config::ModelConfig;
use crate::model::level::{LevelScanner, MatchLevel};

/// The next-symbol distribution of one context.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction<T> {
	/// Admitted levels, longest suffix first.
	pub levels: Vec<MatchLevel<T>>,
	/// Blended, unnormalized weights.
	pub weights: BTreeMap<T, f64>,
}

impl<T: Ord + Copy> Prediction<T> {
	/// Whether no suffix of the context was found in the corpus.
	pub fn is_unseen(&self) -> bool {
		self.levels.is_empty()
	}

	/// Normalized probability of `symbol`.
	///
	/// Returns `None` when the distribution is empty.
	pub fn probability(&self, symbol: T) -> Option<f64> {
		let total: f64 = self.weights.values().sum();
		if !(total > 0.0) {
			return None;
		}
		Some(self.weights.get(&symbol).copied().unwrap_or(0.0) / total)
	}
}

/// Runs level discovery then blending for a context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Predictor {
	scanner: LevelScanner,
	policy: BlendPolicy,
}

impl Predictor {
	pub fn new(scanner: LevelScanner, policy: BlendPolicy) -> Self {
		Self { scanner, policy }
	}

	pub fn from_config(config: &ModelConfig) -> Self {
		Self::new(LevelScanner::new(config.max_levels()), config.policy())
	}

	pub fn scanner(&self) -> &LevelScanner {
		&self.scanner
	}

	pub fn predict<T: Ord + Copy>(&self, index: &CorpusIndex<T>, context: &[T]) -> Prediction<T> {
		let levels = self.scanner.scan(index, context);
		let weights = self.policy.blend(&levels);
		Prediction { levels, weights }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::config::LevelBudget;

	#[test]
	fn test_probability_of_seen_and_unseen_symbols() {
		let index = CorpusIndex::build(b"abac".to_vec());
		let predictor = Predictor::new(LevelScanner::new(LevelBudget::Limited(1)), BlendPolicy::default());
		let prediction = predictor.predict(&index, b"a");

		assert!(!prediction.is_unseen());
		assert_eq!(prediction.probability(b'b'), Some(0.5));
		assert_eq!(prediction.probability(b'c'), Some(0.5));
		assert_eq!(prediction.probability(b'z'), Some(0.0));
	}

	#[test]
	fn test_unseen_context() {
		let index = CorpusIndex::build(b"ab".to_vec());
		let prediction = Predictor::from_config(&ModelConfig::default()).predict(&index, b"x");

		assert!(prediction.is_unseen());
		assert!(prediction.weights.is_empty());
		assert_eq!(prediction.probability(b'a'), None);
	}
}
