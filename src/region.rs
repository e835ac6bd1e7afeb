use std::ops::{Index, Range};

/// Represents an area within source text.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub struct Region {
    /// The beginning of the range, inclusive.
    pub begin: usize,
    /// The ending of the range, exclusive.
    pub end: usize,
}

impl Region {
    /// Create a new Region from the given range.
    pub fn new(position: Range<usize>) -> Self {
        Self {
            begin: position.start,
            end: position.end,
        }
    }

    /// Create an empty [`Region`] sitting at the given offset.
    ///
    /// Used to point at the end of the source when input runs out.
    pub fn at(offset: usize) -> Self {
        Self {
            begin: offset,
            end: offset,
        }
    }
}

impl Index<Region> for str {
    type Output = str;

    fn index(&self, region: Region) -> &Self::Output {
        let Region { begin, end } = region;

        &self[begin..end]
    }
}

impl From<Range<usize>> for Region {
    fn from(value: Range<usize>) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index() {
        let source = "{{ name }}";

        assert_eq!(&source[Region::new(3..7)], "name");
        assert_eq!(&source[Region::from(0..2)], "{{");
    }

    #[test]
    fn test_at_is_empty() {
        assert_eq!(&"abcd"[Region::at(4)], "");
    }
}
