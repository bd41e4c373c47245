use std::sync::Arc;

use super::token::{ComputedToken, Token};
use super::ParseState;

/// A memoized parse result.
///
/// Leaves record a single parse function invocation: how many runes it
/// consumed, how far it looked ahead, the states it entered and exited
/// with, and the tokens it produced. Branches concatenate two
/// computations and cache subtree totals. Nodes are immutable and
/// shared between parses through `Arc`, which is what makes reusing
/// subcomputations after an edit safe without copying.
#[derive(Clone, Debug)]
pub struct Computation(Arc<CompNode>);

#[derive(Debug)]
struct CompNode {
    /// Runes looked at from the start of this computation, including
    /// lookahead past the consumed range.
    read_length: u64,
    /// Runes consumed by this subtree.
    consumed_length: u64,
    tree_height: u32,
    start_state: ParseState,
    end_state: ParseState,
    /// Leaf tokens, positioned relative to the computation start.
    tokens: Vec<ComputedToken>,
    children: Option<(Computation, Computation)>,
}

impl Computation {
    /// A leaf computation for one parse function invocation.
    /// `consumed_length` must be greater than zero.
    pub(crate) fn leaf(
        read_length: u64,
        consumed_length: u64,
        start_state: ParseState,
        end_state: ParseState,
        tokens: Vec<ComputedToken>,
    ) -> Computation {
        debug_assert!(consumed_length > 0, "computations must consume runes");
        debug_assert!(read_length >= consumed_length);
        Computation(Arc::new(CompNode {
            read_length,
            consumed_length,
            tree_height: 1,
            start_state,
            end_state,
            tokens,
            children: None,
        }))
    }

    fn branch(left: Computation, right: Computation) -> Computation {
        let read_length = left
            .read_length()
            .max(left.consumed_length() + right.read_length());
        Computation(Arc::new(CompNode {
            read_length,
            consumed_length: left.consumed_length() + right.consumed_length(),
            tree_height: left.tree_height().max(right.tree_height()) + 1,
            start_state: left.start_state().clone(),
            end_state: right.end_state().clone(),
            tokens: Vec::new(),
            children: Some((left, right)),
        }))
    }

    pub fn read_length(&self) -> u64 {
        self.0.read_length
    }

    pub fn consumed_length(&self) -> u64 {
        self.0.consumed_length
    }

    pub fn start_state(&self) -> &ParseState {
        &self.0.start_state
    }

    pub fn end_state(&self) -> &ParseState {
        &self.0.end_state
    }

    fn tree_height(&self) -> u32 {
        self.0.tree_height
    }

    fn children(&self) -> Option<(Computation, Computation)> {
        self.0
            .children
            .as_ref()
            .map(|(l, r)| (l.clone(), r.clone()))
    }

    /// Concatenates `other` after `self`, keeping the tree balanced.
    /// Runs in time proportional to the height difference.
    pub(crate) fn append(self, other: Computation) -> Computation {
        let h1 = self.tree_height() as i64;
        let h2 = other.tree_height() as i64;
        if h1 - h2 >= 2 {
            let (left, right) = self.children().expect("taller computation is a branch");
            let merged = right.append(other);
            Computation::balanced_branch(left, merged)
        } else if h2 - h1 >= 2 {
            let (left, right) = other.children().expect("taller computation is a branch");
            let merged = self.append(left);
            Computation::balanced_branch(merged, right)
        } else {
            Computation::branch(self, other)
        }
    }

    fn balanced_branch(left: Computation, right: Computation) -> Computation {
        let bf = left.tree_height() as i64 - right.tree_height() as i64;
        if bf > 1 {
            let (ll, lr) = left.children().expect("unbalanced side is a branch");
            if lr.tree_height() > ll.tree_height() {
                let (lrl, lrr) = lr.children().expect("taller child is a branch");
                Computation::branch(
                    Computation::branch(ll, lrl),
                    Computation::branch(lrr, right),
                )
            } else {
                Computation::branch(ll, Computation::branch(lr, right))
            }
        } else if bf < -1 {
            let (rl, rr) = right.children().expect("unbalanced side is a branch");
            if rl.tree_height() > rr.tree_height() {
                let (rll, rlr) = rl.children().expect("taller child is a branch");
                Computation::branch(
                    Computation::branch(left, rll),
                    Computation::branch(rlr, rr),
                )
            } else {
                Computation::branch(Computation::branch(left, rl), rr)
            }
        } else {
            Computation::branch(left, right)
        }
    }

    /// Builds a balanced computation from leaves in document order,
    /// splitting the run in half at every level so sibling heights
    /// never differ by more than one.
    pub(crate) fn concat_leaves(leaves: Vec<Computation>) -> Option<Computation> {
        fn build(nodes: &mut std::vec::IntoIter<Computation>, count: usize) -> Computation {
            if count == 1 {
                return nodes.next().expect("leaf count matches iterator length");
            }
            let left_count = count / 2;
            let left = build(nodes, left_count);
            let right = build(nodes, count - left_count);
            Computation::branch(left, right)
        }

        let count = leaves.len();
        if count == 0 {
            return None;
        }
        Some(build(&mut leaves.into_iter(), count))
    }

    /// Finds the largest subcomputation that starts exactly at `target`
    /// (in the coordinates of the document this computation was built
    /// from), entered with `state`, and whose lookahead window ends at
    /// or before `end_bound`.
    pub(crate) fn largest_matching_sub_computation(
        &self,
        target: u64,
        end_bound: u64,
        state: &ParseState,
    ) -> Option<Computation> {
        self.search_sub_computation(0, target, end_bound, state)
    }

    fn search_sub_computation(
        &self,
        base: u64,
        target: u64,
        end_bound: u64,
        state: &ParseState,
    ) -> Option<Computation> {
        if base == target
            && self.start_state() == state
            && base.saturating_add(self.read_length()) <= end_bound
        {
            return Some(self.clone());
        }
        let (left, right) = self.children()?;
        let left_end = base + left.consumed_length();
        if target < left_end {
            left.search_sub_computation(base, target, end_bound, state)
        } else {
            right.search_sub_computation(left_end, target, end_bound, state)
        }
    }

    /// Tokens overlapping `[start, end)`, with absolute positions.
    pub fn tokens_intersecting(&self, start: u64, end: u64) -> Vec<Token> {
        let mut out = Vec::new();
        self.collect_tokens(0, start, end, &mut out);
        out
    }

    /// Every token in the computation, in document order.
    pub fn tokens(&self) -> Vec<Token> {
        self.tokens_intersecting(0, u64::MAX)
    }

    fn collect_tokens(&self, base: u64, start: u64, end: u64, out: &mut Vec<Token>) {
        if base >= end || base + self.consumed_length() <= start {
            return;
        }
        match self.children() {
            Some((left, right)) => {
                let left_consumed = left.consumed_length();
                left.collect_tokens(base, start, end, out);
                right.collect_tokens(base + left_consumed, start, end, out);
            }
            None => {
                for token in &self.0.tokens {
                    let start_pos = base + token.offset;
                    let end_pos = start_pos + token.length;
                    if start_pos < end && end_pos > start {
                        out.push(Token {
                            start_pos,
                            end_pos,
                            role: token.role,
                        });
                    }
                }
            }
        }
    }
}
