use super::reader::TreeReader;
use super::utf8::{char_width, is_continuation};

/// Replacement emitted for bytes that do not decode as UTF-8.
const REPLACEMENT: char = '\u{FFFD}';

/// A cloneable codepoint stream.
///
/// This is the seam between the document tree and everything that walks
/// codepoints: segmentation clones the iterator for lookahead and the
/// parser clones it to track peek distance, so clones must preserve
/// position without sharing it. Any cloneable `char` iterator (including
/// `str::Chars`) satisfies the bound.
pub trait RuneIter: Iterator<Item = char> + Clone {}

impl<T> RuneIter for T where T: Iterator<Item = char> + Clone {}

/// Decodes document-order codepoints from a forward tree reader.
#[derive(Clone)]
pub struct ForwardRuneIter<'a> {
    reader: TreeReader<'a>,
}

impl<'a> ForwardRuneIter<'a> {
    pub fn new(reader: TreeReader<'a>) -> ForwardRuneIter<'a> {
        ForwardRuneIter { reader }
    }
}

impl Iterator for ForwardRuneIter<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let lead = self.reader.next_byte()?;
        let width = char_width(lead);
        let mut buf = [lead, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            match self.reader.next_byte() {
                Some(b) => *slot = b,
                None => return Some(REPLACEMENT),
            }
        }
        match std::str::from_utf8(&buf[..width]) {
            Ok(s) => s.chars().next(),
            Err(_) => Some(REPLACEMENT),
        }
    }
}

/// Decodes codepoints in reverse document order from a backward tree
/// reader. The reader yields bytes reversed, so continuation bytes
/// arrive before their lead byte; the iterator collects bytes until it
/// sees a non-continuation byte, then reassembles the codepoint.
#[derive(Clone)]
pub struct BackwardRuneIter<'a> {
    reader: TreeReader<'a>,
}

impl<'a> BackwardRuneIter<'a> {
    pub fn new(reader: TreeReader<'a>) -> BackwardRuneIter<'a> {
        BackwardRuneIter { reader }
    }
}

impl Iterator for BackwardRuneIter<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let mut reversed = [0u8; 4];
        let mut n = 0;
        loop {
            let b = match self.reader.next_byte() {
                Some(b) => b,
                None if n == 0 => return None,
                // Orphaned continuation bytes at the start of the stream.
                None => return Some(REPLACEMENT),
            };
            reversed[n] = b;
            n += 1;
            if !is_continuation(b) {
                break;
            }
            if n == 4 {
                return Some(REPLACEMENT);
            }
        }
        let mut buf = [0u8; 4];
        for i in 0..n {
            buf[i] = reversed[n - 1 - i];
        }
        if char_width(buf[0]) != n {
            return Some(REPLACEMENT);
        }
        match std::str::from_utf8(&buf[..n]) {
            Ok(s) => s.chars().next(),
            Err(_) => Some(REPLACEMENT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{ReadDirection, Tree};

    #[test]
    fn test_forward_rune_iter() {
        let text = "a£b፴cd\u{10AAAA}e";
        let tree = Tree::from(text);
        let iter = ForwardRuneIter::new(tree.reader_at_position(0, ReadDirection::Forward));
        let decoded: String = iter.collect();
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_forward_rune_iter_from_position() {
        let tree = Tree::from("a£b፴cd");
        let iter = ForwardRuneIter::new(tree.reader_at_position(3, ReadDirection::Forward));
        let decoded: String = iter.collect();
        assert_eq!(decoded, "፴cd");
    }

    #[test]
    fn test_backward_rune_iter() {
        let text = "a£፴cd";
        let tree = Tree::from(text);
        let iter = BackwardRuneIter::new(tree.reader_at_position(3, ReadDirection::Backward));
        let decoded: Vec<char> = iter.collect();
        assert_eq!(decoded, vec!['፴', '£', 'a']);
    }

    #[test]
    fn test_backward_rune_iter_full_document() {
        let text = "ab\ncd\u{10AAAA}";
        let tree = Tree::from(text);
        let pos = tree.num_chars();
        let iter = BackwardRuneIter::new(tree.reader_at_position(pos, ReadDirection::Backward));
        let decoded: Vec<char> = iter.collect();
        let expected: Vec<char> = text.chars().rev().collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_iterators_are_cloneable() {
        let tree = Tree::from("abc");
        let mut iter = ForwardRuneIter::new(tree.reader_at_position(0, ReadDirection::Forward));
        assert_eq!(iter.next(), Some('a'));
        let mut clone = iter.clone();
        assert_eq!(iter.next(), Some('b'));
        assert_eq!(clone.next(), Some('b'));
        assert_eq!(clone.next(), Some('c'));
    }
}
