//! Unbounded-order n-gram language modelling over a static corpus.
//!
//! Instead of fixing an n-gram order up front, every query searches the
//! corpus for several suffixes of the context that actually recur there and
//! blends their next-symbol statistics. This crate provides:
//! - An exact-match suffix array over any ordered symbol type
//! - Level discovery, blending and temperature sampling
//! - A sliding-window generator and a perplexity evaluator
//! - Byte-level and whitespace-word-level symbol granularities
//!
//! The corpus index is always passed by reference; nothing here keeps
//! global state, so several corpora can live side by side.

/// Crate-wide error type.
pub mod error;

/// Exact substring search over a static corpus (suffix array).
pub mod index;

/// Corpus loading and train / held-out splitting.
pub mod io;

/// Level discovery, blending, sampling, generation and evaluation.
pub mod model;

/// Whitespace-delimited word vocabulary for the word-level variant.
pub mod vocab;


pub use error::{Error, Result};
pub use index::CorpusIndex;
pub use model::blend::BlendPolicy;
pub use model::config::{LevelBudget, ModelConfig};
pub use model::generator::{Generation, Generator};
pub use model::level::{LevelScanner, MatchLevel};
pub use model::perplexity::{PerplexityEvaluator, SMOOTHING_FLOOR};
pub use model::prediction::{Prediction, Predictor};
pub use model::sampler::TemperatureSampler;
pub use model::stats::{LevelStats, Summary};
pub use vocab::{Vocabulary, WordCorpus};

/// Any symbol the model can index: bytes for characters, ids for words.
///
/// `Send + Sync` lets a shared index be scored from several threads.
pub trait Symbol: Copy + Ord + Send + Sync + std::fmt::Debug + 'static {}

impl<T> Symbol for T where T: Copy + Ord + Send + Sync + std::fmt::Debug + 'static {}
