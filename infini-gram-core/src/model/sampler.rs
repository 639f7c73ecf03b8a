use std::collections::BTreeMap;

use rand::Rng;

use crate::error::Result;
use crate::model::config::validate_temperature;

/// Draws one symbol from blended weights after temperature adjustment.
///
/// Each weight `w` becomes `w^(1/temperature)`: below 1 the dominant
/// symbol takes over, above 1 the distribution flattens.
///
/// # Invariants
/// - `temperature` is finite and `> 0`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemperatureSampler {
	temperature: f64,
}

impl TemperatureSampler {
	/// Creates a sampler.
	///
	/// # Errors
	/// Returns `Error::InvalidTemperature` unless `temperature` is finite and `> 0`.
	pub fn new(temperature: f64) -> Result<Self> {
		validate_temperature(temperature)?;
		Ok(Self { temperature })
	}

	pub fn temperature(&self) -> f64 {
		self.temperature
	}

	/// Applies the temperature to `weights`.
	///
	/// Weights are first divided by the largest one: the result is
	/// proportional to `w^(1/temperature)` but cannot overflow.
	/// Non-positive weights are dropped.
	pub fn adjust<T: Ord + Copy>(&self, weights: &BTreeMap<T, f64>) -> BTreeMap<T, f64> {
		let peak = weights.values().copied().fold(0.0, f64::max);
		if !(peak > 0.0 && peak.is_finite()) {
			return BTreeMap::new();
		}

		let exponent = 1.0 / self.temperature;
		weights
			.iter()
			.filter(|(_, w)| **w > 0.0)
			.map(|(&symbol, &w)| (symbol, (w / peak).powf(exponent)))
			.filter(|(_, w)| *w > 0.0)
			.collect()
	}

	/// Samples one symbol, or `None` if there is nothing to sample.
	///
	/// This method performs:
	/// - a uniform draw in `[0, total)`
	/// - a cumulative subtraction over the symbols in ascending order
	///
	/// With a seeded `rng` the draw is reproducible.
	pub fn sample<T, R>(&self, weights: &BTreeMap<T, f64>, rng: &mut R) -> Option<T>
	where
		T: Ord + Copy,
		R: Rng + ?Sized,
	{
		let adjusted = self.adjust(weights);
		let total: f64 = adjusted.values().sum();
		if !(total > 0.0) {
			return None;
		}

		let mut remaining = rng.random::<f64>() * total;
		let mut fallback = None;
		for (&symbol, &weight) in &adjusted {
			remaining -= weight;
			if remaining < 0.0 {
				return Some(symbol);
			}
			fallback = Some(symbol);
		}

		// Rounding can leave a tiny non-negative remainder
		fallback
	}
}
