//! In-memory document storage.
//!
//! The document is a balanced binary tree over UTF-8 leaves. Subtree
//! summaries (bytes, codepoints, line feeds) make position and line
//! queries O(log n), and streaming readers walk the tree in either
//! direction without materializing the text.

mod reader;
mod rune;
mod tree;
pub(crate) mod utf8;

pub use reader::{ReadDirection, TreeReader};
pub use rune::{BackwardRuneIter, ForwardRuneIter, RuneIter};
pub use tree::Tree;

use std::fmt;
use std::io;

/// Errors produced while building or mutating a document.
#[derive(Debug)]
pub enum TextError {
    /// The input byte stream was not well-formed UTF-8.
    InvalidUtf8,
    /// An error reported by a caller-supplied reader.
    Io(io::Error),
}

impl fmt::Display for TextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextError::InvalidUtf8 => write!(f, "invalid UTF-8 in input"),
            TextError::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for TextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextError::InvalidUtf8 => None,
            TextError::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for TextError {
    fn from(err: io::Error) -> Self {
        TextError::Io(err)
    }
}
