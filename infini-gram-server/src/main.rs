use std::env;

use actix_web::middleware::Logger;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use log::info;
use serde::{Deserialize, Serialize};

use infini_gram_core::io::{corpus_name, read_corpus};
use infini_gram_core::{BlendPolicy, CorpusIndex, Generator, LevelStats, ModelConfig, PerplexityEvaluator};

/// Corpus used when no path is given on the command line.
const DEFAULT_CORPUS: &str = "./data/corpus.txt";

/// Query parameters of the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	prompt: Option<String>,
	max_symbols: Option<usize>,
	temperature: Option<f64>,
	seed: Option<u64>,
	k: Option<i64>,
	context_window: Option<usize>,
	policy: Option<String>, // "rank_decay" (default) or "log_ratio"
	decay: Option<f64>,
}

/// Query parameters of the `/v1/perplexity` endpoint
#[derive(Deserialize)]
struct PerplexityParams {
	text: String,
	k: Option<i64>,
	context_window: Option<usize>,
	policy: Option<String>,
	decay: Option<f64>,
}

#[derive(Serialize)]
struct GenerateResponse {
	text: String,
	appended: String,
	stats: Vec<LevelStats>,
}

#[derive(Serialize)]
struct PerplexityResponse {
	perplexity: f64,
	evaluated: usize,
}

#[derive(Serialize)]
struct CorpusResponse<'a> {
	name: &'a str,
	symbols: usize,
}

/// Read-only state shared by all workers; the index is never mutated.
struct SharedData {
	name: String,
	index: CorpusIndex<u8>,
}

/// Builds a validated configuration from optional query values,
/// falling back to defaults.
fn model_config(
	k: Option<i64>,
	context_window: Option<usize>,
	policy: Option<&str>,
	decay: Option<f64>,
) -> Result<ModelConfig, String> {
	let mut config = ModelConfig::default();
	if let Some(k) = k {
		config.set_max_levels(k).map_err(|e| e.to_string())?;
	}
	if let Some(window) = context_window {
		config.set_context_window(window).map_err(|e| e.to_string())?;
	}
	let policy = match policy.map(str::to_lowercase).as_deref() {
		None | Some("rank_decay") => match decay {
			Some(decay) => BlendPolicy::RankDecay { decay },
			None => BlendPolicy::default(),
		},
		Some("log_ratio") => BlendPolicy::SpecificityLogRatio,
		Some(other) => return Err(format!("Unknown policy '{}', expected 'rank_decay' or 'log_ratio'", other)),
	};
	config.set_policy(policy).map_err(|e| e.to_string())?;
	Ok(config)
}

/// HTTP GET endpoint `/v1/generate`
///
/// Continues `prompt` and returns the text with per-rank statistics.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let mut config = match model_config(query.k, query.context_window, query.policy.as_deref(), query.decay) {
		Ok(config) => config,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};
	if let Err(e) = config.set_temperature(query.temperature.unwrap_or(config.temperature())) {
		return HttpResponse::BadRequest().body(e.to_string());
	}
	let generator = match Generator::new(&config) {
		Ok(generator) => generator,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	let prompt = query.prompt.clone().unwrap_or_default();
	let max_symbols = query.max_symbols.unwrap_or(200);
	let generation = generator.generate_seeded(&data.index, prompt.as_bytes(), max_symbols, query.seed);

	HttpResponse::Ok().json(GenerateResponse {
		text: String::from_utf8_lossy(&generation.symbols).into_owned(),
		appended: String::from_utf8_lossy(generation.appended()).into_owned(),
		stats: generation.stats,
	})
}

/// HTTP GET endpoint `/v1/perplexity`
///
/// Scores `text` against the loaded corpus.
#[get("/v1/perplexity")]
async fn get_perplexity(data: web::Data<SharedData>, query: web::Query<PerplexityParams>) -> impl Responder {
	let evaluator = match model_config(query.k, query.context_window, query.policy.as_deref(), query.decay) {
		Ok(config) => PerplexityEvaluator::new(&config),
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let text = query.text.as_bytes();
	match evaluator.perplexity(&data.index, text) {
		Ok(perplexity) => HttpResponse::Ok().json(PerplexityResponse { perplexity, evaluated: text.len() - 1 }),
		Err(e) => HttpResponse::BadRequest().body(e.to_string()),
	}
}

#[get("/v1/corpus")]
async fn get_corpus(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(CorpusResponse { name: &data.name, symbols: data.index.len() })
}

/// Main entry point for the server.
///
/// Indexes the corpus given as first argument once, shares it read-only
/// and starts an Actix-web HTTP server.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - A corpus that cannot be read aborts startup.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CORPUS.to_owned());
	let bytes = read_corpus(&path).map_err(std::io::Error::other)?;
	let shared_data = web::Data::new(SharedData {
		name: corpus_name(&path),
		index: CorpusIndex::build(bytes),
	});
	info!("serving corpus '{}' ({} bytes)", shared_data.name, shared_data.index.len());

	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_perplexity)
			.service(get_corpus)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
