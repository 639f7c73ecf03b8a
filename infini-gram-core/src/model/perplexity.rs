use std::ops::Range;
use std::sync::mpsc;
use std::thread;

use log::{debug, info};

use crate::Symbol;
use crate::error::{Error, Result};
use crate::index::CorpusIndex;
use crate::model::config::ModelConfig;
use crate::model::prediction::Predictor;

/// Probability substituted when the model gives the true symbol nothing.
pub const SMOOTHING_FLOOR: f64 = 1e-10;

/// Scores held-out text against a corpus index.
///
/// Every position but the first is predicted from the (at most
/// `context_window`) symbols before it. No sampling is involved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerplexityEvaluator {
	predictor: Predictor,
	context_window: usize,
}

impl PerplexityEvaluator {
	pub fn new(config: &ModelConfig) -> Self {
		Self { predictor: Predictor::from_config(config), context_window: config.context_window() }
	}

	/// Probability the model gives `text[position]`, floored.
	///
	/// Unseen contexts and symbols the admitted levels never produced both
	/// get `SMOOTHING_FLOOR`.
	pub fn symbol_probability<T: Ord + Copy>(&self, index: &CorpusIndex<T>, text: &[T], position: usize) -> f64 {
		let start = position.saturating_sub(self.context_window);
		let prediction = self.predictor.predict(index, &text[start..position]);

		match prediction.probability(text[position]) {
			Some(p) if p > 0.0 => p,
			_ => SMOOTHING_FLOOR,
		}
	}

	/// Perplexity of `text`: `exp` of the mean negative log-probability
	/// over positions `1..text.len()`.
	///
	/// # Errors
	/// Returns `Error::TextTooShort` if `text` has fewer than 2 symbols.
	pub fn perplexity<T: Ord + Copy>(&self, index: &CorpusIndex<T>, text: &[T]) -> Result<f64> {
		let evaluated = evaluated_positions(text)?;
		let count = evaluated.len();
		let log_sum = self.log_likelihood(index, text, evaluated);

		let perplexity = (-log_sum / count as f64).exp();
		info!("perplexity {:.4} over {} symbols", perplexity, count);
		Ok(perplexity)
	}

	/// Same score as `perplexity`, computed on `workers` threads.
	///
	/// Positions are cut into contiguous chunks; partial sums are added in
	/// chunk order so the result does not depend on thread scheduling.
	/// `workers == 0` uses one worker per CPU.
	///
	/// # Errors
	/// Returns `Error::TextTooShort` for texts under 2 symbols and
	/// `Error::WorkerPanicked` if a worker dies.
	pub fn perplexity_parallel<T: Symbol>(&self, index: &CorpusIndex<T>, text: &[T], workers: usize) -> Result<f64> {
		let evaluated = evaluated_positions(text)?;
		let count = evaluated.len();
		let workers = if workers == 0 { num_cpus::get() } else { workers };
		let chunk_size = count.div_ceil(workers);

		let (tx, rx) = mpsc::channel();
		let all_joined = thread::scope(|scope| {
			let mut handles = Vec::new();
			for (chunk, first) in evaluated.clone().step_by(chunk_size).enumerate() {
				let tx = tx.clone();
				let positions = first..(first + chunk_size).min(text.len());
				handles.push(scope.spawn(move || {
					let partial = self.log_likelihood(index, text, positions);
					// The receiver outlives the scope
					let _ = tx.send((chunk, partial));
				}));
			}
			let joined: Vec<bool> = handles.into_iter().map(|handle| handle.join().is_ok()).collect();
			joined.into_iter().all(|ok| ok)
		});
		drop(tx);
		if !all_joined {
			return Err(Error::WorkerPanicked);
		}

		let mut partials: Vec<(usize, f64)> = rx.iter().collect();
		partials.sort_unstable_by_key(|(chunk, _)| *chunk);
		debug!("combined {} partial sums", partials.len());
		let log_sum: f64 = partials.iter().map(|(_, partial)| partial).sum();

		let perplexity = (-log_sum / count as f64).exp();
		info!("perplexity {:.4} over {} symbols ({} workers)", perplexity, count, workers);
		Ok(perplexity)
	}

	fn log_likelihood<T: Ord + Copy>(&self, index: &CorpusIndex<T>, text: &[T], positions: Range<usize>) -> f64 {
		positions.map(|position| self.symbol_probability(index, text, position).ln()).sum()
	}
}

/// Positions that have at least one symbol of context.
fn evaluated_positions<T>(text: &[T]) -> Result<Range<usize>> {
	if text.len() < 2 {
		return Err(Error::TextTooShort(text.len()));
	}
	Ok(1..text.len())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn evaluator(k: i64, window: usize) -> PerplexityEvaluator {
		let mut config = ModelConfig::default();
		config.set_max_levels(k).unwrap();
		config.set_context_window(window).unwrap();
		PerplexityEvaluator::new(&config)
	}

	#[test]
	fn test_certain_prediction_has_perplexity_one() {
		let index = CorpusIndex::build(b"ABABAB".to_vec());
		let perplexity = evaluator(-1, 200).perplexity(&index, b"AB").unwrap();
		assert!((perplexity - 1.0).abs() < 1e-9);
	}

	#[test]
	fn test_unseen_symbols_use_floor() {
		let index = CorpusIndex::build(b"ABABAB".to_vec());
		let evaluator = evaluator(-1, 200);

		// "x" is never in the corpus, "A" is never followed by "A"
		assert_eq!(evaluator.symbol_probability(&index, b"xA", 1), SMOOTHING_FLOOR);
		assert_eq!(evaluator.symbol_probability(&index, b"AA", 1), SMOOTHING_FLOOR);

		let perplexity = evaluator.perplexity(&index, b"xy").unwrap();
		assert!((perplexity - 1e10).abs() / 1e10 < 1e-9);
	}

	#[test]
	fn test_uniform_choice() {
		// "a" is followed by "b" and "c" equally often
		let index = CorpusIndex::build(b"abac".to_vec());
		let perplexity = evaluator(1, 1).perplexity(&index, b"ab").unwrap();
		assert!((perplexity - 2.0).abs() < 1e-9);
	}

	#[test]
	fn test_too_short_text() {
		let index = CorpusIndex::build(b"ab".to_vec());
		assert!(matches!(evaluator(1, 4).perplexity(&index, b"a"), Err(Error::TextTooShort(1))));
		assert!(matches!(evaluator(1, 4).perplexity_parallel(&index, b"", 2), Err(Error::TextTooShort(0))));
	}

	#[test]
	fn test_parallel_matches_sequential() {
		let corpus = b"the quick brown fox jumps over the lazy dog while the cat sleeps".to_vec();
		let index = CorpusIndex::build(corpus);
		let text = b"the lazy cat jumps over the quick dog";
		let evaluator = evaluator(-1, 8);

		let sequential = evaluator.perplexity(&index, text).unwrap();
		for workers in [0, 1, 3, 64] {
			let parallel = evaluator.perplexity_parallel(&index, text, workers).unwrap();
			assert!((sequential - parallel).abs() / sequential < 1e-9);
		}
	}
}
