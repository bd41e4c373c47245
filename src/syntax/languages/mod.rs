//! Tokenizer registry.
//!
//! Maps the language identifier from the configuration to the parse
//! function driving the incremental parser for that buffer.

mod clike;
mod json;

use super::ParseFunc;

/// Languages with a registered tokenizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Language {
    /// No tokenizer; the document produces no tokens.
    #[default]
    Plaintext,
    Json,
    CLike,
}

impl Language {
    /// Resolves a configuration string to a language. Unrecognized
    /// names fall back to plaintext.
    pub fn from_name(name: &str) -> Language {
        match name {
            "json" => Language::Json,
            "c" | "clike" => Language::CLike,
            _ => Language::Plaintext,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Plaintext => "plaintext",
            Language::Json => "json",
            Language::CLike => "clike",
        }
    }

    /// The tokenizer for this language, if it has one.
    pub fn parse_func(self) -> Option<ParseFunc> {
        match self {
            Language::Plaintext => None,
            Language::Json => Some(json::parse_chunk),
            Language::CLike => Some(clike::parse_chunk),
        }
    }
}
