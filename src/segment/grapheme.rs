use super::grapheme_props::{gb_prop, GbProp};
use super::Segment;
use crate::text::RuneIter;

/// Segments a forward codepoint stream into extended grapheme clusters.
///
/// The iterator assumes its first rune starts at a cluster boundary
/// (the start of the document or a previously reported boundary).
#[derive(Clone)]
pub struct GraphemeClusterIter<I> {
    rune_iter: I,
    current: Segment,
    done: bool,
    last_prop: GbProp,
    in_extended_pictographic: bool,
    after_ext_pic_zwj: bool,
    last_props_were_ri_odd: bool,
}

impl<I: RuneIter> GraphemeClusterIter<I> {
    pub fn new(rune_iter: I) -> GraphemeClusterIter<I> {
        GraphemeClusterIter {
            rune_iter,
            current: Segment::new(),
            done: false,
            last_prop: GbProp::None,
            in_extended_pictographic: false,
            after_ext_pic_zwj: false,
            last_props_were_ri_odd: false,
        }
    }

    /// Whether a cluster boundary precedes `r`, then folds `r` into the
    /// boundary-rule state.
    fn process_rune(&mut self, r: char) -> bool {
        let prop = gb_prop(r);
        let can_break = self.can_break_before(prop);

        self.last_props_were_ri_odd =
            prop == GbProp::RegionalIndicator && !self.last_props_were_ri_odd;
        self.after_ext_pic_zwj = self.in_extended_pictographic && prop == GbProp::Zwj;
        self.in_extended_pictographic = prop == GbProp::ExtendedPictographic
            || (self.in_extended_pictographic && prop == GbProp::Extend);
        self.last_prop = prop;

        can_break
    }

    fn can_break_before(&self, prop: GbProp) -> bool {
        use GbProp::*;

        // GB1 and GB2 (start/end of text) fall out of only emitting
        // non-empty segments.

        // GB3: CR x LF
        if prop == Lf && self.last_prop == Cr {
            return false;
        }

        // GB4: (Control | CR | LF) ÷
        // GB5: ÷ (Control | CR | LF)
        if matches!(self.last_prop, Control | Cr | Lf) || matches!(prop, Control | Cr | Lf) {
            return true;
        }

        // GB6: L x (L | V | LV | LVT)
        if self.last_prop == L && matches!(prop, L | V | Lv | Lvt) {
            return false;
        }

        // GB7: (LV | V) x (V | T)
        if matches!(self.last_prop, Lv | V) && matches!(prop, V | T) {
            return false;
        }

        // GB8: (LVT | T) x T
        if matches!(self.last_prop, Lvt | T) && prop == T {
            return false;
        }

        // GB9: x (Extend | ZWJ)
        // GB9a: x SpacingMark
        if matches!(prop, Extend | Zwj | SpacingMark) {
            return false;
        }

        // GB9b: Prepend x
        if self.last_prop == Prepend {
            return false;
        }

        // GB11: ExtPic Extend* ZWJ x ExtPic
        if self.after_ext_pic_zwj && prop == ExtendedPictographic {
            return false;
        }

        // GB12/GB13: RI runs pair up
        if self.last_props_were_ri_odd && prop == RegionalIndicator {
            return false;
        }

        // GB999: Any ÷ Any
        true
    }
}

impl<I: RuneIter> Iterator for GraphemeClusterIter<I> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.done {
            return None;
        }
        while let Some(r) = self.rune_iter.next() {
            if self.process_rune(r) && !self.current.is_empty() {
                let seg = std::mem::take(&mut self.current);
                self.current.append(r);
                return Some(seg);
            }
            self.current.append(r);
        }
        self.done = true;
        if self.current.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.current))
        }
    }
}

/// Segments a reversed codepoint stream into extended grapheme clusters.
///
/// The input iterator yields runes in reverse document order; emitted
/// segments are restored to document order. The rules that depend on
/// context further back in the document (GB11 and GB12/GB13) look ahead
/// through a clone of the rune iterator, which in reverse order means
/// looking at earlier document positions.
#[derive(Clone)]
pub struct ReverseGraphemeClusterIter<I> {
    rune_iter: I,
    current: Segment,
    done: bool,
    last_prop: GbProp,
}

impl<I: RuneIter> ReverseGraphemeClusterIter<I> {
    pub fn new(rune_iter: I) -> ReverseGraphemeClusterIter<I> {
        ReverseGraphemeClusterIter {
            rune_iter,
            current: Segment::new(),
            done: false,
            last_prop: GbProp::None,
        }
    }

    /// Whether a cluster boundary follows `r` in document order. `r` is
    /// the earlier codepoint; `last_prop` describes the later one.
    fn process_rune(&mut self, r: char) -> bool {
        let prop = gb_prop(r);
        let can_break = self.can_break_after(prop);
        self.last_prop = prop;
        can_break
    }

    fn can_break_after(&self, prop: GbProp) -> bool {
        use GbProp::*;

        // GB3: CR x LF
        if prop == Cr && self.last_prop == Lf {
            return false;
        }

        // GB4: (Control | CR | LF) ÷
        if matches!(prop, Control | Cr | Lf) {
            return true;
        }

        // GB5: ÷ (Control | CR | LF)
        if matches!(self.last_prop, Control | Cr | Lf) {
            return true;
        }

        // GB6: L x (L | V | LV | LVT)
        if prop == L && matches!(self.last_prop, L | V | Lv | Lvt) {
            return false;
        }

        // GB7: (LV | V) x (V | T)
        if matches!(prop, Lv | V) && matches!(self.last_prop, V | T) {
            return false;
        }

        // GB8: (LVT | T) x T
        if matches!(prop, Lvt | T) && self.last_prop == T {
            return false;
        }

        // GB9: x (Extend | ZWJ)
        if matches!(self.last_prop, Extend | Zwj) {
            return false;
        }

        // GB9a: x SpacingMark
        if self.last_prop == SpacingMark {
            return false;
        }

        // GB9b: Prepend x
        if prop == Prepend {
            return false;
        }

        // GB11: ExtPic Extend* ZWJ x ExtPic
        if prop == Zwj
            && self.last_prop == ExtendedPictographic
            && self.lookahead_extended_pictographic()
        {
            return false;
        }

        // GB12/GB13: the RI pair continues only when an even number of
        // regional indicators precedes it.
        if prop == RegionalIndicator
            && self.last_prop == RegionalIndicator
            && self.lookahead_even_ri()
        {
            return false;
        }

        // GB999: Any ÷ Any
        true
    }

    /// Scans past Extend codepoints for an Extended_Pictographic at an
    /// earlier document position.
    fn lookahead_extended_pictographic(&self) -> bool {
        let mut iter = self.rune_iter.clone();
        while let Some(r) = iter.next() {
            match gb_prop(r) {
                GbProp::Extend => continue,
                GbProp::ExtendedPictographic => return true,
                _ => return false,
            }
        }
        false
    }

    /// Counts the run of regional indicators at earlier document
    /// positions and reports whether it has even length.
    fn lookahead_even_ri(&self) -> bool {
        let mut count = 0u64;
        let mut iter = self.rune_iter.clone();
        while let Some(r) = iter.next() {
            if gb_prop(r) == GbProp::RegionalIndicator {
                count += 1;
            } else {
                break;
            }
        }
        count % 2 == 0
    }
}

impl<I: RuneIter> Iterator for ReverseGraphemeClusterIter<I> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.done {
            return None;
        }
        while let Some(r) = self.rune_iter.next() {
            if self.process_rune(r) && !self.current.is_empty() {
                let mut seg = std::mem::take(&mut self.current);
                self.current.append(r);
                seg.reverse_runes();
                return Some(seg);
            }
            self.current.append(r);
        }
        self.done = true;
        if self.current.is_empty() {
            None
        } else {
            let mut seg = std::mem::take(&mut self.current);
            seg.reverse_runes();
            Some(seg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_segments(s: &str) -> Vec<String> {
        GraphemeClusterIter::new(s.chars())
            .map(|seg| seg.to_string())
            .collect()
    }

    fn reverse_segments(s: &str) -> Vec<String> {
        ReverseGraphemeClusterIter::new(s.chars().rev())
            .map(|seg| seg.to_string())
            .collect()
    }

    #[test]
    fn test_empty() {
        assert!(forward_segments("").is_empty());
        assert!(reverse_segments("").is_empty());
    }

    #[test]
    fn test_ascii() {
        assert_eq!(forward_segments("abc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_combining_marks() {
        // a + combining diaeresis, e + combining acute
        let segments = forward_segments("a\u{0308}e\u{0301}");
        assert_eq!(segments, vec!["a\u{0308}", "e\u{0301}"]);
    }

    #[test]
    fn test_crlf() {
        assert_eq!(forward_segments("a\r\nb"), vec!["a", "\r\n", "b"]);
        assert_eq!(forward_segments("\n\n"), vec!["\n", "\n"]);
    }

    #[test]
    fn test_hangul_jamo() {
        // L + V + T forms one syllable cluster.
        assert_eq!(
            forward_segments("\u{1100}\u{1161}\u{11A8}"),
            vec!["\u{1100}\u{1161}\u{11A8}"]
        );
        // Precomposed LV + trailing jamo.
        assert_eq!(
            forward_segments("\u{AC00}\u{11A8}"),
            vec!["\u{AC00}\u{11A8}"]
        );
    }

    #[test]
    fn test_emoji_zwj_sequence() {
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        assert_eq!(forward_segments(family), vec![family]);
        assert_eq!(reverse_segments(family), vec![family]);
    }

    #[test]
    fn test_emoji_skin_tone() {
        let thumbs_up = "\u{1F44D}\u{1F3FB}";
        assert_eq!(forward_segments(thumbs_up), vec![thumbs_up]);
    }

    #[test]
    fn test_regional_indicators() {
        // Two flags: the four regional indicators pair up.
        let flags = "\u{1F1FA}\u{1F1F8}\u{1F1EB}\u{1F1F7}";
        assert_eq!(
            forward_segments(flags),
            vec!["\u{1F1FA}\u{1F1F8}", "\u{1F1EB}\u{1F1F7}"]
        );
        assert_eq!(
            reverse_segments(flags),
            vec!["\u{1F1EB}\u{1F1F7}", "\u{1F1FA}\u{1F1F8}"]
        );
    }

    #[test]
    fn test_thai_combining() {
        // Thai base + vowel + tone mark clusters as one character.
        let s = "\u{0E17}\u{0E35}\u{0E48}\u{0E19}\u{0E35}\u{0E48}";
        assert_eq!(
            forward_segments(s),
            vec!["\u{0E17}\u{0E35}\u{0E48}", "\u{0E19}\u{0E35}\u{0E48}"]
        );
    }

    #[test]
    fn test_reverse_matches_forward() {
        let cases = [
            "abc",
            "a\u{0308}e\u{0301}",
            "a\r\nb\nc",
            "\u{1F1FA}\u{1F1F8}\u{1F1EB}\u{1F1F7}\u{1F1E9}\u{1F1EA}",
            "x\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}y",
            "\u{1100}\u{1161}\u{11A8}\u{AC00}",
        ];
        for s in cases {
            let mut forward = forward_segments(s);
            forward.reverse();
            assert_eq!(reverse_segments(s), forward, "case {s:?}");
        }
    }

    #[test]
    fn test_completeness() {
        let cases = [
            "hello world",
            "a\u{0308}\u{0301}x",
            "\u{1F468}\u{200D}\u{1F469}",
            "line\r\nbreaks\n",
        ];
        for s in cases {
            let joined: String = forward_segments(s).concat();
            assert_eq!(joined, s, "case {s:?}");
            for seg in GraphemeClusterIter::new(s.chars()) {
                assert!(seg.num_runes() > 0);
            }
        }
    }
}
