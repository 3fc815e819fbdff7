use std::ops::Range;

/// Position counted in chars rather than bytes, as `annotate-snippets` expects.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CharIndex(pub usize);

/// Converts a byte range of `s` into a char range. `None` when a bound is not on a char boundary.
pub fn get_char_range(s: &str, range: Range<usize>) -> Option<Range<CharIndex>> {
	let mut iter = s
		.char_indices()
		.enumerate()
		.map(|(char_position, (index, _))| (CharIndex(char_position), index))
		.chain(std::iter::once((CharIndex(s.chars().count()), s.len())));
	let start = iter.find(|(_, index)| *index == range.start)?.0;
	let end = if range.end == range.start {
		start
	} else {
		iter.find(|(_, index)| *index == range.end)?.0
	};
	Some(start..end)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn multibyte_chars() {
		assert_eq!(get_char_range("a ≠ b", 2..5), Some(CharIndex(2)..CharIndex(3)));
		assert_eq!(get_char_range("a ≠ b", 3..5), None);
		assert_eq!(get_char_range("ab", 2..2), Some(CharIndex(2)..CharIndex(2)));
	}
}
