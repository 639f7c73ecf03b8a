use std::collections::BTreeMap;

use log::trace;

use crate::index::CorpusIndex;
use crate::model::config::LevelBudget;

/// One admitted suffix match of a context against the corpus.
///
/// Conceptually this is the state of an order-`n` Markov chain, built on
/// the fly: the `n` trailing context symbols followed by every symbol the
/// corpus shows after them.
///
/// # Invariants
/// - `total_matches == counts.values().sum()`
/// - Every count is strictly positive
#[derive(Clone, Debug, PartialEq)]
pub struct MatchLevel<T> {
	/// Suffix length that matched.
	pub n: usize,
	/// Next symbol → number of times the corpus shows it after the suffix.
	pub counts: BTreeMap<T, usize>,
	/// Sum of `counts`.
	pub total_matches: usize,
}

impl<T: Ord + Copy> MatchLevel<T> {
	fn new(n: usize) -> Self {
		Self { n, counts: BTreeMap::new(), total_matches: 0 }
	}

	/// Records one occurrence of `next` following the suffix.
	fn add_follower(&mut self, next: T) {
		*self.counts.entry(next).or_insert(0) += 1;
		self.total_matches += 1;
	}
}

/// Discovers the match levels of a context.
///
/// Suffixes are tried from the full context down to a single symbol. A
/// suffix becomes a level only if it produces strictly more followers than
/// the previously admitted level, so each level is both shorter and
/// broader than the one before it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelScanner {
	budget: LevelBudget,
}

impl LevelScanner {
	pub fn new(budget: LevelBudget) -> Self {
		Self { budget }
	}

	pub fn budget(&self) -> LevelBudget {
		self.budget
	}

	/// Returns the admitted levels of `context`, longest suffix first.
	///
	/// - Suffixes absent from the corpus are skipped without using budget.
	/// - An occurrence ending exactly at the end of the corpus has no
	///   follower and contributes nothing.
	/// - An empty result means no suffix of the context (down to one
	///   symbol) has a follower in the corpus.
	pub fn scan<T: Ord + Copy>(&self, index: &CorpusIndex<T>, context: &[T]) -> Vec<MatchLevel<T>> {
		let corpus = index.corpus();
		let mut levels: Vec<MatchLevel<T>> = Vec::new();
		let mut last_total = 0;

		for start in 0..context.len() {
			if !self.budget.allows(levels.len()) {
				break;
			}

			let suffix = &context[start..];
			let offsets = index.lookup(suffix);
			if offsets.is_empty() {
				continue;
			}

			let n = suffix.len();
			let mut level = MatchLevel::new(n);
			for &offset in offsets {
				if let Some(&next) = corpus.get(offset + n) {
					level.add_follower(next);
				}
			}

			if level.total_matches > last_total {
				trace!("admitted level n={} with {} matches", n, level.total_matches);
				last_total = level.total_matches;
				levels.push(level);
			}
		}

		levels
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scanner(k: i64) -> LevelScanner {
		LevelScanner::new(LevelBudget::from_signed(k).unwrap())
	}

	#[test]
	fn test_single_level_counts() {
		let index = CorpusIndex::build(b"the cat sat on the mat".to_vec());
		let levels = scanner(1).scan(&index, b"the");

		assert_eq!(levels.len(), 1);
		assert_eq!(levels[0].n, 3);
		assert_eq!(levels[0].total_matches, 2);
		assert_eq!(levels[0].counts, BTreeMap::from([(b' ', 2)]));
	}

	#[test]
	fn test_unseen_context_is_empty() {
		let index = CorpusIndex::build(b"ab".to_vec());
		assert!(scanner(-1).scan(&index, b"x").is_empty());
		assert!(scanner(-1).scan(&index, b"").is_empty());
	}

	#[test]
	fn test_match_at_corpus_end_has_no_follower() {
		// "b" only occurs as the final symbol
		let index = CorpusIndex::build(b"ab".to_vec());
		assert!(scanner(-1).scan(&index, b"b").is_empty());

		let levels = scanner(-1).scan(&index, b"a");
		assert_eq!(levels.len(), 1);
		assert_eq!(levels[0].counts, BTreeMap::from([(b'b', 1)]));
	}

	#[test]
	fn test_redundant_levels_are_pruned() {
		// "at" and "t" both follow "cat"; "cat" once, "at" twice, "t" three times
		let index = CorpusIndex::build(b"cat. bat. it.".to_vec());
		let levels = scanner(-1).scan(&index, b"cat");

		let ns: Vec<usize> = levels.iter().map(|l| l.n).collect();
		let totals: Vec<usize> = levels.iter().map(|l| l.total_matches).collect();
		assert_eq!(ns, vec![3, 2, 1]);
		assert_eq!(totals, vec![1, 2, 3]);
	}

	#[test]
	fn test_equal_totals_are_not_admitted_twice() {
		// "xa" and "a" both occur exactly once
		let index = CorpusIndex::build(b"xab".to_vec());
		let levels = scanner(-1).scan(&index, b"xa");
		assert_eq!(levels.len(), 1);
		assert_eq!(levels[0].n, 2);
	}

	#[test]
	fn test_budget_limits_levels() {
		let index = CorpusIndex::build(b"cat. bat. it.".to_vec());
		let levels = scanner(2).scan(&index, b"cat");
		assert_eq!(levels.len(), 2);
		assert_eq!(levels[1].n, 2);
	}

	#[test]
	fn test_unmatched_prefix_does_not_use_budget() {
		let index = CorpusIndex::build(b"the cat sat on the mat".to_vec());
		let levels = scanner(1).scan(&index, b"zzz the");
		assert_eq!(levels.len(), 1);
		assert_eq!(levels[0].n, 4);
	}
}
