/// Classification of a token, shared by every language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenRole {
    Operator,
    Keyword,
    Identifier,
    Number,
    String,
    Comment,
    Punctuation,
}

/// A token positioned relative to the start of the parse function
/// invocation that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComputedToken {
    pub offset: u64,
    pub length: u64,
    pub role: TokenRole,
}

/// A token with absolute document positions, as reported by range
/// queries against a computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub start_pos: u64,
    pub end_pos: u64,
    pub role: TokenRole,
}
