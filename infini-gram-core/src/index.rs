use log::info;

/// Exact substring search over a static symbol sequence.
///
/// The index owns the corpus and a suffix array over it. It is built once
/// and only read afterwards, so a single instance can be shared by
/// reference between any number of scanners, generators and evaluators.
///
/// # Invariants
/// - `suffixes` is a permutation of `0..corpus.len()`
/// - `corpus[suffixes[i]..]` is sorted ascending in `i`
#[derive(Debug, Clone)]
pub struct CorpusIndex<T> {
	/// The reference text.
	corpus: Vec<T>,
	/// Start offsets of every suffix of `corpus`, in sorted order.
	suffixes: Vec<usize>,
}

impl<T: Ord + Copy> CorpusIndex<T> {
	/// Builds the index over `corpus`.
	pub fn build(corpus: Vec<T>) -> Self {
		let suffixes = suffix_array(&corpus);
		info!("indexed corpus of {} symbols", corpus.len());
		Self { corpus, suffixes }
	}

	/// Returns the start offset of every occurrence of `pattern`.
	///
	/// Offsets come in suffix order, not text order. An empty slice means
	/// the pattern does not occur; an empty pattern never matches.
	pub fn lookup(&self, pattern: &[T]) -> &[usize] {
		if pattern.is_empty() {
			return &[];
		}

		let len = self.corpus.len();
		let prefix = |start: usize| &self.corpus[start..(start + pattern.len()).min(len)];

		let lower = self.suffixes.partition_point(|&s| prefix(s) < pattern);
		let upper = lower + self.suffixes[lower..].partition_point(|&s| prefix(s) == pattern);
		&self.suffixes[lower..upper]
	}

	/// Number of occurrences of `pattern`.
	pub fn count(&self, pattern: &[T]) -> usize {
		self.lookup(pattern).len()
	}

	/// The indexed corpus.
	pub fn corpus(&self) -> &[T] {
		&self.corpus
	}

	/// Corpus length in symbols.
	pub fn len(&self) -> usize {
		self.corpus.len()
	}

	pub fn is_empty(&self) -> bool {
		self.corpus.is_empty()
	}
}

/// Sorts all suffixes of `text` by prefix doubling.
///
/// Each round sorts by the pair (rank of the first `gap` symbols, rank of
/// the next `gap` symbols) and stops as soon as every rank is distinct.
/// Rank 0 is reserved for "past the end" so shorter suffixes sort first.
fn suffix_array<T: Ord + Copy>(text: &[T]) -> Vec<usize> {
	let n = text.len();
	let mut sa: Vec<usize> = (0..n).collect();
	if n < 2 {
		return sa;
	}

	sa.sort_unstable_by(|&a, &b| text[a].cmp(&text[b]));
	let mut rank = vec![0usize; n];
	rank[sa[0]] = 1;
	for i in 1..n {
		rank[sa[i]] = rank[sa[i - 1]] + usize::from(text[sa[i]] != text[sa[i - 1]]);
	}

	let mut next = vec![0usize; n];
	let mut gap = 1;
	while gap < n && rank[sa[n - 1]] < n {
		let key = |i: usize| (rank[i], if i + gap < n { rank[i + gap] } else { 0 });
		sa.sort_unstable_by_key(|&i| key(i));

		next[sa[0]] = 1;
		for i in 1..n {
			next[sa[i]] = next[sa[i - 1]] + usize::from(key(sa[i]) != key(sa[i - 1]));
		}
		std::mem::swap(&mut rank, &mut next);
		gap *= 2;
	}

	sa
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sorted(offsets: &[usize]) -> Vec<usize> {
		let mut offsets = offsets.to_vec();
		offsets.sort_unstable();
		offsets
	}

	#[test]
	fn test_suffix_array_is_sorted() {
		let text = b"mississippi".to_vec();
		let sa = suffix_array(&text);
		assert_eq!(sa, vec![10, 7, 4, 1, 0, 9, 8, 6, 3, 5, 2]);
	}

	#[test]
	fn test_lookup_finds_every_occurrence() {
		let index = CorpusIndex::build(b"the cat sat on the mat".to_vec());
		assert_eq!(sorted(index.lookup(b"the")), vec![0, 15]);
		assert_eq!(sorted(index.lookup(b"at")), vec![5, 9, 20]);
		assert_eq!(index.count(b"t"), 5);
	}

	#[test]
	fn test_lookup_missing_pattern() {
		let index = CorpusIndex::build(b"ab".to_vec());
		assert!(index.lookup(b"x").is_empty());
		assert!(index.lookup(b"abc").is_empty());
		assert!(index.lookup(b"").is_empty());
	}

	#[test]
	fn test_lookup_at_corpus_end() {
		let index = CorpusIndex::build(b"abab".to_vec());
		assert_eq!(sorted(index.lookup(b"b")), vec![1, 3]);
		assert_eq!(sorted(index.lookup(b"ab")), vec![0, 2]);
	}

	#[test]
	fn test_empty_and_single_symbol_corpus() {
		let empty: CorpusIndex<u8> = CorpusIndex::build(Vec::new());
		assert!(empty.is_empty());
		assert!(empty.lookup(b"a").is_empty());

		let single = CorpusIndex::build(vec![7u32]);
		assert_eq!(single.lookup(&[7]), &[0]);
	}
}
