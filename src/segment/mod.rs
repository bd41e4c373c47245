//! Grapheme cluster segmentation.
//!
//! Segments a codepoint stream into user-perceived characters per the
//! extended grapheme cluster rules of UAX #29 (Unicode 13.0.0). Both
//! iterators run over any cloneable rune iterator, so they work equally
//! over tree readers and plain strings. The editor builds a fresh
//! iterator around a tree reader each time it steps the cursor.

mod grapheme;
mod grapheme_props;

pub use grapheme::{GraphemeClusterIter, ReverseGraphemeClusterIter};

/// A run of codepoints forming one grapheme cluster, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Segment {
    runes: Vec<char>,
}

impl Segment {
    pub fn new() -> Segment {
        Segment::default()
    }

    pub fn append(&mut self, ch: char) {
        self.runes.push(ch);
    }

    pub fn num_runes(&self) -> u64 {
        self.runes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.runes.is_empty()
    }

    pub fn runes(&self) -> &[char] {
        &self.runes
    }

    /// Reverses the runes in place. The reverse iterator collects runes
    /// in reverse document order and calls this to restore document
    /// order before emitting a segment.
    pub fn reverse_runes(&mut self) {
        self.runes.reverse();
    }
}

impl FromIterator<char> for Segment {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Segment {
        Segment {
            runes: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for ch in &self.runes {
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}
