//! Per-document buffer state.
//!
//! A buffer owns exactly one document tree and at most one incremental
//! parser. Every mutation goes through the tree first; the resulting
//! edit range is then handed to the parser exactly once, in order, so
//! the cached computations stay coherent with the document.

use tracing::debug;

use crate::file::WatchHandle;
use crate::syntax::{Computation, Edit, Language, Parser, Token};
use crate::text::Tree;

/// The state of one open document: tree, cursor, tokenizer, and the
/// on-disk watch handle captured at load time.
pub struct Buffer {
    tree: Tree,
    cursor: u64,
    language: Language,
    parser: Option<Parser>,
    computation: Option<Computation>,
    watch_handle: Option<WatchHandle>,
}

impl Buffer {
    /// An empty buffer with no tokenizer.
    pub fn new() -> Buffer {
        Buffer::from_tree(Tree::new())
    }

    pub fn from_tree(tree: Tree) -> Buffer {
        Buffer {
            tree,
            cursor: 0,
            language: Language::Plaintext,
            parser: None,
            computation: None,
            watch_handle: None,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn text(&self) -> String {
        self.tree.to_string()
    }

    pub fn num_chars(&self) -> u64 {
        self.tree.num_chars()
    }

    pub fn cursor_position(&self) -> u64 {
        self.cursor
    }

    /// Moves the cursor, clamping to the end of the document.
    pub fn move_cursor_to(&mut self, pos: u64) {
        self.cursor = pos.min(self.tree.num_chars());
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Swaps the active tokenizer and re-tokenizes the whole document.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        match language.parse_func() {
            Some(parse_func) => {
                let mut parser = Parser::new(parse_func);
                self.computation = parser.parse_all(&self.tree);
                self.parser = Some(parser);
            }
            None => {
                self.parser = None;
                self.computation = None;
            }
        }
        debug!(language = language.name(), "set buffer language");
    }

    /// Inserts a codepoint at the cursor and advances the cursor past
    /// it.
    pub fn insert_char(&mut self, ch: char) {
        let pos = self.cursor;
        self.tree.insert_at_position(pos, ch);
        self.cursor = pos + 1;
        self.reparse(Edit::insertion(pos, 1));
    }

    /// Deletes the codepoint at the cursor. Past the end of the
    /// document this is a no-op and the cursor does not move.
    pub fn delete_char(&mut self) {
        if self.cursor >= self.tree.num_chars() {
            return;
        }
        self.tree.delete_at_position(self.cursor);
        self.reparse(Edit::deletion(self.cursor, 1));
    }

    /// Deletes the codepoints between the cursor and `pos` (exclusive
    /// of the far end) in either direction. The cursor lands at the
    /// start of the deleted region.
    pub fn delete_to_position(&mut self, pos: u64) {
        let pos = pos.min(self.tree.num_chars());
        let (start, count) = if pos > self.cursor {
            (self.cursor, pos - self.cursor)
        } else {
            (pos, self.cursor - pos)
        };
        for _ in 0..count {
            self.tree.delete_at_position(start);
            self.reparse(Edit::deletion(start, 1));
        }
        self.cursor = start;
    }

    /// Tokens from the current computation overlapping `[start, end)`.
    pub fn tokens_in_range(&self, start: u64, end: u64) -> Vec<Token> {
        match &self.computation {
            Some(c) => c.tokens_intersecting(start, end),
            None => Vec::new(),
        }
    }

    /// Every token in the document.
    pub fn tokens(&self) -> Vec<Token> {
        self.tokens_in_range(0, u64::MAX)
    }

    pub fn set_watch_handle(&mut self, handle: WatchHandle) {
        self.watch_handle = Some(handle);
    }

    pub fn watch_handle(&self) -> Option<&WatchHandle> {
        self.watch_handle.as_ref()
    }

    fn reparse(&mut self, edit: Edit) {
        if let Some(parser) = &mut self.parser {
            self.computation = parser.reparse_after_edit(&self.tree, edit);
        }
    }
}

impl Default for Buffer {
    fn default() -> Buffer {
        Buffer::new()
    }
}
