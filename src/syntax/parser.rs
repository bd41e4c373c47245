use tracing::debug;

use super::computation::Computation;
use super::tracking::TrackingRuneIter;
use super::{ParseFunc, ParseState};
use crate::text::{ForwardRuneIter, ReadDirection, Tree};

/// A single point edit, in codepoint positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Edit {
    pub pos: u64,
    pub num_inserted: u64,
    pub num_deleted: u64,
}

impl Edit {
    pub fn insertion(pos: u64, num_inserted: u64) -> Edit {
        Edit {
            pos,
            num_inserted,
            num_deleted: 0,
        }
    }

    pub fn deletion(pos: u64, num_deleted: u64) -> Edit {
        Edit {
            pos,
            num_inserted: 0,
            num_deleted,
        }
    }
}

/// Incremental tokenizer for one language.
///
/// The parser caches the computation from the last parse. Reparsing
/// after an edit walks the document from the start, reusing cached
/// subcomputations wherever the position, entry state, and lookahead
/// window still line up; only the span the edit invalidated runs the
/// parse function again. The parser must observe every edit, in order,
/// or the cached position translations become incoherent.
pub struct Parser {
    parse_func: ParseFunc,
    prev_computation: Option<Computation>,
}

impl Parser {
    pub fn new(parse_func: ParseFunc) -> Parser {
        Parser {
            parse_func,
            prev_computation: None,
        }
    }

    /// Tokenizes the entire document and caches the result.
    pub fn parse_all(&mut self, tree: &Tree) -> Option<Computation> {
        let n = tree.num_chars();
        let mut pos = 0u64;
        let mut state = ParseState::Empty;
        let mut leaves = Vec::new();
        while pos < n {
            let c = self.run_parse_func(tree, pos, &state);
            pos += c.consumed_length();
            state = c.end_state().clone();
            leaves.push(c);
        }
        let computation = Computation::concat_leaves(leaves);
        self.prev_computation = computation.clone();
        computation
    }

    /// Re-tokenizes the document after `edit`, reusing as much of the
    /// previous computation as the edit leaves valid. Must be called
    /// once per edit, after the edit has been applied to `tree`.
    pub fn reparse_after_edit(&mut self, tree: &Tree, edit: Edit) -> Option<Computation> {
        let n = tree.num_chars();
        let mut pos = 0u64;
        let mut state = ParseState::Empty;
        let mut computation: Option<Computation> = None;
        let mut reused = 0u64;
        let mut reparsed = 0u64;
        while pos < n {
            let next = match self.find_reusable_computation(pos, edit, &state) {
                Some(c) => {
                    reused += 1;
                    c
                }
                None => {
                    reparsed += 1;
                    self.run_parse_func(tree, pos, &state)
                }
            };
            state = next.end_state().clone();
            pos += next.consumed_length();
            computation = Some(match computation {
                Some(c) => c.append(next),
                None => next,
            });
        }
        debug!(reused, reparsed, "reparse after edit");
        self.prev_computation = computation.clone();
        computation
    }

    fn run_parse_func(&self, tree: &Tree, pos: u64, state: &ParseState) -> Computation {
        let reader = tree.reader_at_position(pos, ReadDirection::Forward);
        let mut iter = TrackingRuneIter::new(ForwardRuneIter::new(reader));
        let result = (self.parse_func)(&mut iter, state);
        let max_read = iter.max_read();
        if result.is_success() {
            Computation::leaf(
                max_read.max(result.num_consumed),
                result.num_consumed,
                state.clone(),
                result.next_state,
                result.tokens,
            )
        } else {
            // Recover from a failed parse by consuming one codepoint
            // with no tokens, carrying the entry state forward.
            Computation::leaf(max_read.max(1), 1, state.clone(), state.clone(), Vec::new())
        }
    }

    fn find_reusable_computation(
        &self,
        pos: u64,
        edit: Edit,
        state: &ParseState,
    ) -> Option<Computation> {
        let prev = self.prev_computation.as_ref()?;

        if pos < edit.pos {
            // Before the edit: reuse anything whose lookahead window
            // ends at or before the edited position.
            return prev.largest_matching_sub_computation(pos, edit.pos, state);
        }

        if edit.num_inserted > 0 && pos >= edit.pos + edit.num_inserted {
            // Past the insertion: translate to the previous document's
            // coordinates by subtracting the inserted characters.
            return prev.largest_matching_sub_computation(
                pos - edit.num_inserted,
                u64::MAX,
                state,
            );
        }

        if edit.num_deleted > 0 && pos >= edit.pos {
            // Past the deletion: translate by adding the deleted
            // characters back.
            return prev.largest_matching_sub_computation(pos + edit.num_deleted, u64::MAX, state);
        }

        // Inside the edited range: nothing cached applies.
        None
    }
}
