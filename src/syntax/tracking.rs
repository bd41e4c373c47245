use std::cell::Cell;
use std::rc::Rc;

use crate::text::ForwardRuneIter;

/// Decorator over a forward rune iterator that records the maximum
/// number of runes read through it, across every clone.
///
/// Parse functions clone the iterator to look ahead; whatever any clone
/// reads counts toward the shared maximum. Reading at the end of the
/// stream also counts one rune, so a computation that observed
/// end-of-document is invalidated when text is appended behind it.
pub struct TrackingRuneIter<'a> {
    inner: ForwardRuneIter<'a>,
    read: u64,
    max_read: Rc<Cell<u64>>,
}

impl<'a> TrackingRuneIter<'a> {
    pub(crate) fn new(inner: ForwardRuneIter<'a>) -> TrackingRuneIter<'a> {
        TrackingRuneIter {
            inner,
            read: 0,
            max_read: Rc::new(Cell::new(0)),
        }
    }

    /// Maximum rune count read through this iterator or any clone.
    pub(crate) fn max_read(&self) -> u64 {
        self.max_read.get()
    }
}

impl Clone for TrackingRuneIter<'_> {
    fn clone(&self) -> Self {
        TrackingRuneIter {
            inner: self.inner.clone(),
            read: self.read,
            max_read: Rc::clone(&self.max_read),
        }
    }
}

impl Iterator for TrackingRuneIter<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        self.read += 1;
        if self.read > self.max_read.get() {
            self.max_read.set(self.read);
        }
        self.inner.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{ReadDirection, Tree};

    fn tracking_iter(tree: &Tree) -> TrackingRuneIter<'_> {
        TrackingRuneIter::new(ForwardRuneIter::new(
            tree.reader_at_position(0, ReadDirection::Forward),
        ))
    }

    #[test]
    fn test_max_read_counts_reads() {
        let tree = Tree::from("abcdef");
        let mut iter = tracking_iter(&tree);
        assert_eq!(iter.max_read(), 0);
        iter.next();
        iter.next();
        assert_eq!(iter.max_read(), 2);
    }

    #[test]
    fn test_clone_shares_max_read() {
        let tree = Tree::from("abcdef");
        let mut iter = tracking_iter(&tree);
        iter.next();

        let mut lookahead = iter.clone();
        lookahead.next();
        lookahead.next();
        assert_eq!(iter.max_read(), 3);

        // The original's own position is unaffected by the clone.
        assert_eq!(iter.next(), Some('b'));
        assert_eq!(iter.max_read(), 3);
    }

    #[test]
    fn test_reading_past_end_counts() {
        let tree = Tree::from("ab");
        let mut iter = tracking_iter(&tree);
        assert_eq!(iter.next(), Some('a'));
        assert_eq!(iter.next(), Some('b'));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.max_read(), 3);
    }
}
