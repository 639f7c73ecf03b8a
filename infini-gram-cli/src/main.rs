use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use infini_gram_core::io::{corpus_name, read_corpus, split_corpus};
use infini_gram_core::model::blend::DEFAULT_DECAY;
use infini_gram_core::{BlendPolicy, CorpusIndex, Generator, LevelStats, ModelConfig, PerplexityEvaluator, Vocabulary, WordCorpus};

/// Unbounded-order n-gram text generation and evaluation.
#[derive(Parser)]
#[command(name = "infini-gram", version, about)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Generate text continuing a prompt
	Generate(GenerateArgs),
	/// Score the held-out tail of a corpus
	Perplexity(PerplexityArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
	/// Level i weighs decay^i
	RankDecay,
	/// Level weighs ln(broadest + 1) / ln(matches + 1)
	LogRatio,
}

/// Options shared by both commands.
#[derive(Args)]
struct ModelArgs {
	/// Corpus text file
	#[arg(long, default_value = "data.txt")]
	corpus: PathBuf,

	/// Levels admitted per query (negative = unbounded)
	#[arg(short, long, default_value_t = 2, allow_negative_numbers = true)]
	k: i64,

	/// Trailing symbols used as context
	#[arg(long, default_value_t = 200)]
	context_window: usize,

	#[arg(long, value_enum, default_value_t = Policy::RankDecay)]
	policy: Policy,

	/// Per-rank decay of the rank-decay policy
	#[arg(long, default_value_t = DEFAULT_DECAY)]
	decay: f64,

	/// Use whitespace-delimited words as symbols instead of bytes
	#[arg(long)]
	words: bool,
}

#[derive(Args)]
struct GenerateArgs {
	#[command(flatten)]
	model: ModelArgs,

	#[arg(long, default_value = "First Citizen:")]
	prompt: String,

	/// Output length in symbols, prompt included
	#[arg(long, default_value_t = 1000)]
	max_symbols: usize,

	#[arg(short, long, default_value_t = 0.8)]
	temperature: f64,

	/// RNG seed for reproducible output
	#[arg(long)]
	seed: Option<u64>,
}

#[derive(Args)]
struct PerplexityArgs {
	#[command(flatten)]
	model: ModelArgs,

	/// Share of the corpus used for training; the rest is scored
	#[arg(long, default_value_t = 0.9)]
	train_fraction: f64,

	/// Worker threads (0 = one per CPU)
	#[arg(long, default_value_t = 0)]
	workers: usize,
}

impl ModelArgs {
	fn config(&self) -> Result<ModelConfig, Box<dyn std::error::Error>> {
		let mut config = ModelConfig::default();
		config.set_max_levels(self.k)?;
		config.set_context_window(self.context_window)?;
		config.set_policy(match self.policy {
			Policy::RankDecay => BlendPolicy::RankDecay { decay: self.decay },
			Policy::LogRatio => BlendPolicy::SpecificityLogRatio,
		})?;
		Ok(config)
	}

	fn read_bytes(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
		let bytes = read_corpus(&self.corpus)?;
		info!("loaded corpus '{}' ({} bytes)", corpus_name(&self.corpus), bytes.len());
		Ok(bytes)
	}
}

fn generate(args: &GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
	let mut config = args.model.config()?;
	config.set_temperature(args.temperature)?;
	let generator = Generator::new(&config)?;
	let bytes = args.model.read_bytes()?;

	let start = Instant::now();
	let (output, symbols, stats) = if args.model.words {
		let corpus = WordCorpus::build(&String::from_utf8_lossy(&bytes));
		let prompt = corpus.vocabulary().encode(&args.prompt);
		let generation = generator.generate_seeded(corpus.index(), &prompt, args.max_symbols, args.seed);
		let appended = corpus.vocabulary().decode(generation.appended());
		let output = if appended.is_empty() {
			args.prompt.trim().to_owned()
		} else {
			format!("{} {}", args.prompt.trim(), appended)
		};
		(output, generation.symbols.len(), generation.stats)
	} else {
		let index = CorpusIndex::build(bytes);
		let generation = generator.generate_seeded(&index, args.prompt.as_bytes(), args.max_symbols, args.seed);
		let output = String::from_utf8_lossy(&generation.symbols).into_owned();
		(output, generation.symbols.len(), generation.stats)
	};

	println!("{}", output);
	println!("\nGenerated {} symbols in {:.4}s", symbols, start.elapsed().as_secs_f64());
	print_stats(&stats);
	Ok(())
}

fn print_stats(stats: &[LevelStats]) {
	for (rank, s) in stats.iter().enumerate() {
		if s.n.mean > 0.0 {
			println!(
				"  Level {}: n(med={:.1}, avg={:.2}, std={:.2}) m(med={:.1}, avg={:.1}, std={:.1})",
				rank + 1,
				s.n.median,
				s.n.mean,
				s.n.std,
				s.matches.median,
				s.matches.mean,
				s.matches.std
			);
		}
	}
}

fn perplexity(args: &PerplexityArgs) -> Result<(), Box<dyn std::error::Error>> {
	let evaluator = PerplexityEvaluator::new(&args.model.config()?);
	let bytes = args.model.read_bytes()?;

	let start = Instant::now();
	let score = if args.model.words {
		let mut vocabulary = Vocabulary::new();
		let ids = vocabulary.tokenize(&String::from_utf8_lossy(&bytes));
		let (train, held_out) = split_corpus(&ids, args.train_fraction)?;
		let index = CorpusIndex::build(train.to_vec());
		evaluator.perplexity_parallel(&index, held_out, args.workers)?
	} else {
		let (train, held_out) = split_corpus(&bytes, args.train_fraction)?;
		let index = CorpusIndex::build(train.to_vec());
		evaluator.perplexity_parallel(&index, held_out, args.workers)?
	};

	println!("Perplexity: {:.4}", score);
	info!("scored in {:.2}s", start.elapsed().as_secs_f64());
	Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	match Cli::parse().command {
		Command::Generate(args) => generate(&args),
		Command::Perplexity(args) => perplexity(&args),
	}
}
