//! Property tests for grapheme cluster segmentation, cross-checked
//! against the unicode-segmentation crate on scripts both cover.

mod common;

use proptest::prelude::*;
use unicode_segmentation::UnicodeSegmentation;
use vellum::segment::{GraphemeClusterIter, ReverseGraphemeClusterIter};
use vellum::text::{BackwardRuneIter, ForwardRuneIter, ReadDirection, Tree};

/// Codepoints spanning the interesting boundary rules: combining marks,
/// CR/LF, Hangul jamo and precomposed syllables, regional indicators,
/// ZWJ emoji sequences, skin tones, and Thai combining vowels.
fn arb_cluster_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        Just(' '),
        Just('\r'),
        Just('\n'),
        Just('\u{0301}'),
        Just('\u{0308}'),
        Just('\u{1F1FA}'),
        Just('\u{1F1F8}'),
        Just('\u{1F1EB}'),
        Just('\u{200D}'),
        Just('\u{1F468}'),
        Just('\u{1F469}'),
        Just('\u{1F467}'),
        Just('\u{1F3FB}'),
        Just('\u{1100}'),
        Just('\u{1161}'),
        Just('\u{11A8}'),
        Just('\u{AC00}'),
        Just('\u{0E17}'),
        Just('\u{0E35}'),
        Just('\u{0E48}'),
    ]
}

fn arb_text(max_len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(arb_cluster_char(), 0..max_len)
        .prop_map(|chars| chars.into_iter().collect())
}

fn forward_segments(s: &str) -> Vec<String> {
    GraphemeClusterIter::new(s.chars())
        .map(|seg| seg.to_string())
        .collect()
}

proptest! {
    #[test]
    fn prop_completeness(text in arb_text(300)) {
        common::init_test_tracing();
        let segments = forward_segments(&text);
        prop_assert_eq!(segments.concat(), text);
        for seg in &segments {
            prop_assert!(!seg.is_empty());
        }
    }

    #[test]
    fn prop_matches_oracle(text in arb_text(300)) {
        let expected: Vec<&str> = text.graphemes(true).collect();
        prop_assert_eq!(forward_segments(&text), expected);
    }

    #[test]
    fn prop_reverse_consistency(text in arb_text(300)) {
        let mut forward = forward_segments(&text);
        forward.reverse();

        let reverse: Vec<String> = ReverseGraphemeClusterIter::new(text.chars().rev())
            .map(|seg| seg.to_string())
            .collect();
        prop_assert_eq!(reverse, forward);
    }

    #[test]
    fn prop_streaming_matches_in_memory(text in arb_text(300)) {
        let tree = Tree::from(text.as_str());

        let over_tree: Vec<String> = GraphemeClusterIter::new(ForwardRuneIter::new(
            tree.reader_at_position(0, ReadDirection::Forward),
        ))
        .map(|seg| seg.to_string())
        .collect();
        prop_assert_eq!(over_tree, forward_segments(&text));

        let mut backward: Vec<String> = ReverseGraphemeClusterIter::new(BackwardRuneIter::new(
            tree.reader_at_position(tree.num_chars(), ReadDirection::Backward),
        ))
        .map(|seg| seg.to_string())
        .collect();
        backward.reverse();
        prop_assert_eq!(backward, forward_segments(&text));
    }
}
