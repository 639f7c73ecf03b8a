//! The modelling pipeline, leaves first.
//!
//! - Level discovery over context suffixes (`LevelScanner`)
//! - Blending of per-level statistics (`BlendPolicy`)
//! - Temperature sampling (`TemperatureSampler`)
//! - Sliding-window generation (`Generator`)
//! - Held-out scoring (`PerplexityEvaluator`)

/// Validated tunables shared by generation and evaluation.
pub mod config;

/// Recurring-suffix discovery and per-level next-symbol counts.
pub mod level;

/// Weighting policies combining several levels into one distribution.
pub mod blend;

/// Temperature-adjusted cumulative-weight sampling.
pub mod sampler;

/// Scanner + blender glue producing one distribution per context.
pub mod prediction;

/// Sliding-window text generation with per-rank diagnostics.
pub mod generator;

/// Perplexity of held-out text.
pub mod perplexity;

/// Mean / standard deviation / median summaries.
pub mod stats;
