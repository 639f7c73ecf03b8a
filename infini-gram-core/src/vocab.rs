use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::index::CorpusIndex;

/// Id given to words absent from the vocabulary.
///
/// It never occurs in an indexed corpus, so any context suffix containing
/// it is simply unseen.
pub const UNKNOWN_WORD: u32 = u32::MAX;

/// Bidirectional mapping between whitespace-delimited words and ids.
///
/// # Invariants
/// - `ids[words[i]] == i` for every interned word
/// - `UNKNOWN_WORD` is never assigned
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Vocabulary {
	words: Vec<String>,
	ids: HashMap<String, u32>,
}

impl Vocabulary {
	pub fn new() -> Self {
		Self::default()
	}

	/// Splits `text` on whitespace, interning every new word.
	pub fn tokenize(&mut self, text: &str) -> Vec<u32> {
		text.split_whitespace().map(|word| self.intern(word)).collect()
	}

	/// Splits `text` on whitespace without growing the vocabulary.
	///
	/// Unknown words become `UNKNOWN_WORD`.
	pub fn encode(&self, text: &str) -> Vec<u32> {
		text.split_whitespace()
			.map(|word| self.ids.get(word).copied().unwrap_or(UNKNOWN_WORD))
			.collect()
	}

	/// Joins the words of `ids` with single spaces.
	///
	/// Unknown ids are skipped.
	pub fn decode(&self, ids: &[u32]) -> String {
		ids.iter()
			.filter_map(|&id| self.word(id))
			.collect::<Vec<_>>()
			.join(" ")
	}

	pub fn word(&self, id: u32) -> Option<&str> {
		self.words.get(id as usize).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	fn intern(&mut self, word: &str) -> u32 {
		if let Some(&id) = self.ids.get(word) {
			return id;
		}
		let id = self.words.len() as u32;
		self.words.push(word.to_owned());
		self.ids.insert(word.to_owned(), id);
		id
	}
}

/// Word-level corpus: a vocabulary plus an index over word ids.
#[derive(Clone, Debug)]
pub struct WordCorpus {
	vocabulary: Vocabulary,
	index: CorpusIndex<u32>,
}

impl WordCorpus {
	/// Tokenizes `text` on whitespace and indexes the word sequence.
	pub fn build(text: &str) -> Self {
		let mut vocabulary = Vocabulary::new();
		let ids = vocabulary.tokenize(text);
		info!("tokenized {} words ({} distinct)", ids.len(), vocabulary.len());
		Self { vocabulary, index: CorpusIndex::build(ids) }
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn index(&self) -> &CorpusIndex<u32> {
		&self.index
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tokenize_interns_once() {
		let mut vocabulary = Vocabulary::new();
		let ids = vocabulary.tokenize("the cat  sat\non the\tmat");
		assert_eq!(ids, vec![0, 1, 2, 3, 0, 4]);
		assert_eq!(vocabulary.len(), 5);
		assert_eq!(vocabulary.decode(&ids), "the cat sat on the mat");
	}

	#[test]
	fn test_encode_unknown_words() {
		let mut vocabulary = Vocabulary::new();
		vocabulary.tokenize("to be or not");
		assert_eq!(vocabulary.encode("to see or"), vec![0, UNKNOWN_WORD, 2]);
		assert_eq!(vocabulary.decode(&[0, UNKNOWN_WORD, 2]), "to or");
	}

	#[test]
	fn test_word_corpus_lookup() {
		let corpus = WordCorpus::build("to be or not to be");
		let pattern = corpus.vocabulary().encode("to be");
		assert_eq!(corpus.index().count(&pattern), 2);
		assert!(corpus.index().lookup(&corpus.vocabulary().encode("to sea")).is_empty());
	}
}
