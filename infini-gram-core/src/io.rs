use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Reads a corpus file as raw bytes.
///
/// - Reads the entire file into memory
/// - No decoding is done, the byte model works on arbitrary input
///
/// # Errors
/// Returns `Error::Io` (carrying the path) if the file cannot be read,
/// and `Error::EmptyCorpus` if it is empty.
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> Result<Vec<u8>> {
	let path = filename.as_ref();
	let bytes = fs::read(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
	if bytes.is_empty() {
		return Err(Error::EmptyCorpus);
	}
	Ok(bytes)
}

/// Splits a corpus into a training head and a held-out tail.
///
/// `train_fraction` of the symbols (rounded down) go to training.
///
/// Example:
/// 10 symbols with `0.9` → 9 training symbols, 1 held-out symbol
///
/// # Errors
/// Returns `Error::InvalidSplit` unless `0 < train_fraction < 1`.
pub fn split_corpus<T>(data: &[T], train_fraction: f64) -> Result<(&[T], &[T])> {
	if !(train_fraction > 0.0 && train_fraction < 1.0) {
		return Err(Error::InvalidSplit(train_fraction));
	}
	let cut = (data.len() as f64 * train_fraction) as usize;
	Ok(data.split_at(cut.min(data.len())))
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/shakespeare.txt"` → `"shakespeare"`
/// - `"corpus"` → `"corpus"`
pub fn corpus_name<P: AsRef<Path>>(input_path: P) -> String {
	input_path
		.as_ref()
		.file_stem()
		.map(|stem| stem.to_string_lossy().to_string())
		.unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_split_ninety_ten() {
		let data: Vec<u8> = (0..10).collect();
		let (train, held_out) = split_corpus(&data, 0.9).unwrap();
		assert_eq!(train.len(), 9);
		assert_eq!(held_out, &[9]);
	}

	#[test]
	fn test_split_rejects_bad_fraction() {
		let data = b"abc";
		assert!(matches!(split_corpus(data, 0.0), Err(Error::InvalidSplit(_))));
		assert!(matches!(split_corpus(data, 1.0), Err(Error::InvalidSplit(_))));
		assert!(matches!(split_corpus(data, f64::NAN), Err(Error::InvalidSplit(_))));
	}

	#[test]
	fn test_read_missing_corpus() {
		let err = read_corpus("./does/not/exist.txt").unwrap_err();
		assert!(matches!(err, Error::Io { .. }));
		assert!(err.to_string().contains("exist.txt"));
	}

	#[test]
	fn test_read_corpus_round_trip() {
		let path = std::env::temp_dir().join(format!("infini-gram-io-{}.txt", std::process::id()));
		fs::write(&path, b"hello").unwrap();
		assert_eq!(read_corpus(&path).unwrap(), b"hello");

		fs::write(&path, b"").unwrap();
		assert!(matches!(read_corpus(&path), Err(Error::EmptyCorpus)));
		fs::remove_file(&path).unwrap();
	}

	#[test]
	fn test_corpus_name() {
		assert_eq!(corpus_name("./data/shakespeare.txt"), "shakespeare");
		assert_eq!(corpus_name("corpus"), "corpus");
	}
}
