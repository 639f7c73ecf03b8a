use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::blend::BlendPolicy;

/// Default trailing window used as query context.
pub const DEFAULT_CONTEXT_WINDOW: usize = 200;

/// Default number of levels admitted per query.
pub const DEFAULT_MAX_LEVELS: usize = 2;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.8;

/// Maximum number of match levels admitted per query.
///
/// # Variants
/// - `Limited(k)`: stop once `k >= 1` levels are admitted.
/// - `Unbounded`: admit every strictly improving level down to one symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelBudget {
	Limited(usize),
	Unbounded,
}

impl LevelBudget {
	/// Builds a budget from the conventional signed level count.
	///
	/// Any negative value means unbounded.
	///
	/// # Errors
	/// Returns `Error::InvalidLevelBudget` for `0`.
	pub fn from_signed(k: i64) -> Result<Self> {
		match k {
			0 => Err(Error::InvalidLevelBudget),
			k if k < 0 => Ok(Self::Unbounded),
			k => Ok(Self::Limited(k as usize)),
		}
	}

	/// Whether another level may be admitted after `admitted` levels.
	pub fn allows(&self, admitted: usize) -> bool {
		match self {
			Self::Limited(k) => admitted < *k,
			Self::Unbounded => true,
		}
	}

	/// The bound, if any.
	pub fn limit(&self) -> Option<usize> {
		match self {
			Self::Limited(k) => Some(*k),
			Self::Unbounded => None,
		}
	}
}

/// Tunables shared by the generator and the perplexity evaluator.
///
/// # Responsibilities
/// - Track the level budget, context window, blending policy and temperature
/// - Reject invalid values at the point they are set
///
/// # Invariants
/// - `temperature` is finite and `> 0`
/// - `context_window >= 1`
/// - `max_levels` is never `Limited(0)`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelConfig {
	/// Maximum number of levels admitted per query.
	max_levels: LevelBudget,

	/// Number of trailing symbols used as context.
	context_window: usize,

	/// How admitted levels are weighted against each other.
	policy: BlendPolicy,

	/// Sampling temperature (< 1 sharpens, > 1 flattens).
	temperature: f64,
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self {
			max_levels: LevelBudget::Limited(DEFAULT_MAX_LEVELS),
			context_window: DEFAULT_CONTEXT_WINDOW,
			policy: BlendPolicy::default(),
			temperature: DEFAULT_TEMPERATURE,
		}
	}
}

impl ModelConfig {
	pub fn max_levels(&self) -> LevelBudget {
		self.max_levels
	}

	pub fn context_window(&self) -> usize {
		self.context_window
	}

	pub fn policy(&self) -> BlendPolicy {
		self.policy
	}

	pub fn temperature(&self) -> f64 {
		self.temperature
	}

	/// Sets the level budget from a signed count (negative = unbounded).
	///
	/// # Errors
	/// Returns an error if `k == 0`.
	pub fn set_max_levels(&mut self, k: i64) -> Result<()> {
		self.max_levels = LevelBudget::from_signed(k)?;
		Ok(())
	}

	/// Sets the context window.
	///
	/// # Errors
	/// Returns an error if `window == 0`.
	pub fn set_context_window(&mut self, window: usize) -> Result<()> {
		if window == 0 {
			return Err(Error::InvalidContextWindow);
		}
		self.context_window = window;
		Ok(())
	}

	/// Sets the blending policy.
	///
	/// # Errors
	/// Returns an error if a rank-decay factor is outside `(0, 1)`.
	pub fn set_policy(&mut self, policy: BlendPolicy) -> Result<()> {
		policy.validate()?;
		self.policy = policy;
		Ok(())
	}

	/// Sets the sampling temperature.
	///
	/// # Errors
	/// Returns an error unless the value is finite and `> 0`.
	pub fn set_temperature(&mut self, temperature: f64) -> Result<()> {
		validate_temperature(temperature)?;
		self.temperature = temperature;
		Ok(())
	}
}

/// Rejects temperatures that would put NaN or infinity into sampling.
pub(crate) fn validate_temperature(temperature: f64) -> Result<()> {
	if temperature.is_finite() && temperature > 0.0 {
		Ok(())
	} else {
		Err(Error::InvalidTemperature(temperature))
	}
}
