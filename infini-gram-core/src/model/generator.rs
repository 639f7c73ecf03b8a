use log::{debug, info};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::Result;
use crate::index::CorpusIndex;
use crate::model::config::ModelConfig;
use crate::model::prediction::Predictor;
use crate::model::sampler::TemperatureSampler;
use crate::model::stats::{LevelStats, RankHistory};

/// Result of a generation run.
#[derive(Clone, Debug, PartialEq)]
pub struct Generation<T> {
	/// Prompt followed by every generated symbol.
	pub symbols: Vec<T>,
	/// Number of leading symbols that came from the prompt.
	pub prompt_len: usize,
	/// Per-rank statistics of `n` and follower totals, rank 0 first.
	pub stats: Vec<LevelStats>,
}

impl<T> Generation<T> {
	/// The symbols appended after the prompt.
	pub fn appended(&self) -> &[T] {
		&self.symbols[self.prompt_len..]
	}
}

/// Sliding-window sequence generator.
///
/// # Responsibilities
/// - Query the trailing context window at every step
/// - Blend the admitted levels and sample the next symbol
/// - Record which `n` and follower total each rank used
///
/// Generation stops after `max_symbols` symbols (prompt included) or as
/// soon as the current context has no sampleable continuation. There is
/// no end-of-sequence symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Generator {
	predictor: Predictor,
	sampler: TemperatureSampler,
	context_window: usize,
}

impl Generator {
	/// Creates a generator from a validated configuration.
	///
	/// # Errors
	/// Returns an error if the configured temperature is invalid.
	pub fn new(config: &ModelConfig) -> Result<Self> {
		Ok(Self {
			predictor: Predictor::from_config(config),
			sampler: TemperatureSampler::new(config.temperature())?,
			context_window: config.context_window(),
		})
	}

	/// Generates with a fresh OS-seeded RNG, or a fixed seed when given.
	pub fn generate_seeded<T: Ord + Copy>(
		&self,
		index: &CorpusIndex<T>,
		prompt: &[T],
		max_symbols: usize,
		seed: Option<u64>,
	) -> Generation<T> {
		let mut rng = match seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		self.generate(index, prompt, max_symbols, &mut rng)
	}

	/// Extends `prompt` until it holds `max_symbols` symbols or the model
	/// runs out of continuations.
	///
	/// # Notes
	/// - A prompt already `max_symbols` long (or longer) is returned as is.
	/// - Ranks never used report zero statistics; with a bounded level
	///   count there is always one entry per allowed rank.
	pub fn generate<T, R>(&self, index: &CorpusIndex<T>, prompt: &[T], max_symbols: usize, rng: &mut R) -> Generation<T>
	where
		T: Ord + Copy,
		R: Rng + ?Sized,
	{
		let mut symbols = prompt.to_vec();
		let mut history = RankHistory::default();

		while symbols.len() < max_symbols {
			let start = symbols.len().saturating_sub(self.context_window);
			let prediction = self.predictor.predict(index, &symbols[start..]);

			let Some(next) = self.sampler.sample(&prediction.weights, rng) else {
				debug!("no continuation after {} symbols, stopping", symbols.len());
				break;
			};

			symbols.push(next);
			for (rank, level) in prediction.levels.iter().enumerate() {
				history.record(rank, level.n, level.total_matches);
			}
		}

		info!("generated {} symbols after a {}-symbol prompt", symbols.len() - prompt.len(), prompt.len());
		let min_ranks = self.predictor.scanner().budget().limit().unwrap_or(0);
		Generation { symbols, prompt_len: prompt.len(), stats: history.summarize(min_ranks) }
	}
}
