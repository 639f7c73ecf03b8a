use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by configuration, corpus loading and evaluation.
///
/// An unseen context is not an error: it flows through the model as an
/// empty level list, an empty distribution and finally `None`.
#[derive(Debug, Error)]
pub enum Error {
	#[error("temperature must be finite and greater than 0, got {0}")]
	InvalidTemperature(f64),

	#[error("decay must be strictly between 0 and 1, got {0}")]
	InvalidDecay(f64),

	#[error("level count must be at least 1 (use a negative value for unbounded)")]
	InvalidLevelBudget,

	#[error("context window must be at least 1 symbol")]
	InvalidContextWindow,

	#[error("train fraction must be strictly between 0 and 1, got {0}")]
	InvalidSplit(f64),

	#[error("perplexity needs at least 2 symbols of text, got {0}")]
	TextTooShort(usize),

	#[error("corpus is empty")]
	EmptyCorpus,

	#[error("failed to read corpus {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("perplexity worker thread panicked")]
	WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
