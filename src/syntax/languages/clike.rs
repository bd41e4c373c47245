//! C-style tokenizer.
//!
//! Block comments are tokenized one line per invocation, carrying
//! `InBlockComment` between chunks. That keeps computations small, so
//! an edit inside a long comment invalidates a single line of it
//! rather than the whole construct.

use crate::syntax::token::{ComputedToken, TokenRole};
use crate::syntax::tracking::TrackingRuneIter;
use crate::syntax::{ParseResult, ParseState};

const KEYWORDS: &[&str] = &[
    "break", "case", "char", "const", "continue", "default", "do", "double", "else", "enum",
    "extern", "float", "for", "goto", "if", "int", "long", "return", "short", "signed", "sizeof",
    "static", "struct", "switch", "typedef", "union", "unsigned", "void", "volatile", "while",
];

pub(crate) fn parse_chunk(iter: &mut TrackingRuneIter<'_>, state: &ParseState) -> ParseResult {
    if *state == ParseState::InBlockComment {
        return continue_block_comment(iter);
    }
    let first = match peek(iter) {
        Some(ch) => ch,
        None => return ParseResult::failed(),
    };
    match first {
        ch if ch.is_whitespace() => consume_whitespace(iter),
        ch if ch.is_alphabetic() || ch == '_' => consume_identifier(iter),
        ch if ch.is_ascii_digit() => consume_number(iter),
        '"' | '\'' => consume_string(iter, first),
        '/' => consume_slash(iter),
        '(' | ')' | '[' | ']' | '{' | '}' | ';' | ',' => {
            iter.next();
            token_result(1, TokenRole::Punctuation)
        }
        '+' | '-' | '*' | '%' | '=' | '<' | '>' | '!' | '&' | '|' | '^' | '~' | '?' | ':'
        | '.' | '#' => {
            iter.next();
            token_result(1, TokenRole::Operator)
        }
        _ => ParseResult::failed(),
    }
}

fn peek(iter: &TrackingRuneIter<'_>) -> Option<char> {
    iter.clone().next()
}

fn token_result(num_consumed: u64, role: TokenRole) -> ParseResult {
    ParseResult {
        num_consumed,
        tokens: vec![ComputedToken {
            offset: 0,
            length: num_consumed,
            role,
        }],
        next_state: ParseState::Empty,
    }
}

fn consume_whitespace(iter: &mut TrackingRuneIter<'_>) -> ParseResult {
    let mut n = 0u64;
    while let Some(ch) = peek(iter) {
        if !ch.is_whitespace() {
            break;
        }
        iter.next();
        n += 1;
    }
    ParseResult {
        num_consumed: n,
        tokens: Vec::new(),
        next_state: ParseState::Empty,
    }
}

fn consume_identifier(iter: &mut TrackingRuneIter<'_>) -> ParseResult {
    let mut word = String::new();
    while let Some(ch) = peek(iter) {
        if !ch.is_alphanumeric() && ch != '_' {
            break;
        }
        iter.next();
        word.push(ch);
    }
    let role = if KEYWORDS.contains(&word.as_str()) {
        TokenRole::Keyword
    } else {
        TokenRole::Identifier
    };
    token_result(word.chars().count() as u64, role)
}

fn consume_number(iter: &mut TrackingRuneIter<'_>) -> ParseResult {
    let mut n = 0u64;
    // Hex literals.
    if peek(iter) == Some('0') {
        let mut lookahead = iter.clone();
        lookahead.next();
        if matches!(lookahead.next(), Some('x') | Some('X')) {
            iter.next();
            iter.next();
            n += 2;
            while let Some(ch) = peek(iter) {
                if !ch.is_ascii_hexdigit() {
                    break;
                }
                iter.next();
                n += 1;
            }
            return token_result(n, TokenRole::Number);
        }
    }
    n += consume_digits(iter);
    if peek(iter) == Some('.') {
        iter.next();
        n += 1;
        n += consume_digits(iter);
    }
    if matches!(peek(iter), Some('e') | Some('E')) {
        let mut lookahead = iter.clone();
        lookahead.next();
        if matches!(lookahead.next(), Some(ch) if ch.is_ascii_digit() || ch == '+' || ch == '-') {
            iter.next();
            n += 1;
            if matches!(peek(iter), Some('+') | Some('-')) {
                iter.next();
                n += 1;
            }
            n += consume_digits(iter);
        }
    }
    token_result(n, TokenRole::Number)
}

fn consume_digits(iter: &mut TrackingRuneIter<'_>) -> u64 {
    let mut n = 0u64;
    while let Some(ch) = peek(iter) {
        if !ch.is_ascii_digit() {
            break;
        }
        iter.next();
        n += 1;
    }
    n
}

/// String and character literals. Stops at an unescaped closing quote
/// or at the end of the line.
fn consume_string(iter: &mut TrackingRuneIter<'_>, quote: char) -> ParseResult {
    iter.next();
    let mut n = 1u64;
    loop {
        match peek(iter) {
            None | Some('\n') => break,
            Some('\\') => {
                iter.next();
                n += 1;
                if !matches!(peek(iter), None | Some('\n')) {
                    iter.next();
                    n += 1;
                }
            }
            Some(ch) => {
                iter.next();
                n += 1;
                if ch == quote {
                    break;
                }
            }
        }
    }
    token_result(n, TokenRole::String)
}

/// A `/` starts a line comment, a block comment, or is a division
/// operator.
fn consume_slash(iter: &mut TrackingRuneIter<'_>) -> ParseResult {
    let mut lookahead = iter.clone();
    lookahead.next();
    match lookahead.next() {
        Some('/') => {
            iter.next();
            iter.next();
            let mut n = 2u64;
            while let Some(ch) = peek(iter) {
                if ch == '\n' {
                    break;
                }
                iter.next();
                n += 1;
            }
            token_result(n, TokenRole::Comment)
        }
        Some('*') => {
            iter.next();
            iter.next();
            block_comment_body(iter, 2)
        }
        _ => {
            iter.next();
            token_result(1, TokenRole::Operator)
        }
    }
}

fn continue_block_comment(iter: &mut TrackingRuneIter<'_>) -> ParseResult {
    if peek(iter).is_none() {
        return ParseResult::failed();
    }
    block_comment_body(iter, 0)
}

/// Consumes comment content up to `*/` or the end of the line,
/// whichever comes first. `n` counts runes already consumed by the
/// caller (the opening delimiter).
fn block_comment_body(iter: &mut TrackingRuneIter<'_>, mut n: u64) -> ParseResult {
    loop {
        match iter.next() {
            None => {
                return ParseResult {
                    num_consumed: n,
                    tokens: comment_token(n),
                    next_state: ParseState::InBlockComment,
                };
            }
            Some('\n') => {
                n += 1;
                return ParseResult {
                    num_consumed: n,
                    tokens: comment_token(n),
                    next_state: ParseState::InBlockComment,
                };
            }
            Some('*') => {
                n += 1;
                if peek(iter) == Some('/') {
                    iter.next();
                    n += 1;
                    return ParseResult {
                        num_consumed: n,
                        tokens: comment_token(n),
                        next_state: ParseState::Empty,
                    };
                }
            }
            Some(_) => n += 1,
        }
    }
}

fn comment_token(length: u64) -> Vec<ComputedToken> {
    vec![ComputedToken {
        offset: 0,
        length,
        role: TokenRole::Comment,
    }]
}

#[cfg(test)]
mod tests {
    use crate::syntax::{Edit, Language, Parser, TokenRole};
    use crate::text::Tree;

    fn tokenize(text: &str) -> Vec<(u64, u64, TokenRole)> {
        let tree = Tree::from(text);
        let mut parser = Parser::new(Language::CLike.parse_func().unwrap());
        match parser.parse_all(&tree) {
            Some(c) => c
                .tokens()
                .iter()
                .map(|t| (t.start_pos, t.end_pos, t.role))
                .collect(),
            None => Vec::new(),
        }
    }

    #[test]
    fn test_declaration() {
        assert_eq!(
            tokenize("int x;"),
            vec![
                (0, 3, TokenRole::Keyword),
                (4, 5, TokenRole::Identifier),
                (5, 6, TokenRole::Punctuation),
            ]
        );
    }

    #[test]
    fn test_line_comment() {
        assert_eq!(
            tokenize("x // rest\ny"),
            vec![
                (0, 1, TokenRole::Identifier),
                (2, 9, TokenRole::Comment),
                (10, 11, TokenRole::Identifier),
            ]
        );
    }

    #[test]
    fn test_block_comment_single_line() {
        assert_eq!(
            tokenize("/* note */ x"),
            vec![(0, 10, TokenRole::Comment), (11, 12, TokenRole::Identifier)]
        );
    }

    #[test]
    fn test_block_comment_spans_lines() {
        // One comment token per line, resumed through the carry state.
        assert_eq!(
            tokenize("/* a\nb */ x"),
            vec![
                (0, 5, TokenRole::Comment),
                (5, 9, TokenRole::Comment),
                (10, 11, TokenRole::Identifier),
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_eq!(tokenize("/* open"), vec![(0, 7, TokenRole::Comment)]);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            tokenize(r#"s = "a\"b";"#),
            vec![
                (0, 1, TokenRole::Identifier),
                (2, 3, TokenRole::Operator),
                (4, 10, TokenRole::String),
                (10, 11, TokenRole::Punctuation),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokenize("0x1F 3.25 1e9"),
            vec![
                (0, 4, TokenRole::Number),
                (5, 9, TokenRole::Number),
                (10, 13, TokenRole::Number),
            ]
        );
    }

    #[test]
    fn test_edit_extends_identifier() {
        let mut tree = Tree::from("int x;");
        let mut parser = Parser::new(Language::CLike.parse_func().unwrap());
        parser.parse_all(&tree);

        tree.insert_at_position(4, 'y');
        parser.reparse_after_edit(&tree, Edit::insertion(4, 1));
        tree.insert_at_position(5, 'y');
        let c = parser
            .reparse_after_edit(&tree, Edit::insertion(5, 1))
            .unwrap();

        // "int yyx;" - the identifier now spans positions 4..7.
        let tokens = c.tokens();
        assert_eq!(tokens[1].start_pos, 4);
        assert_eq!(tokens[1].end_pos, 7);
        assert_eq!(tokens[1].role, TokenRole::Identifier);
    }

    #[test]
    fn test_comment_state_survives_edit_before_it() {
        let mut tree = Tree::from("a\n/* b\nc */\nd");
        let mut parser = Parser::new(Language::CLike.parse_func().unwrap());
        let full = parser.parse_all(&tree).unwrap();
        let before: Vec<_> = full.tokens();

        // Insert at the very start and reparse incrementally.
        tree.insert_at_position(0, 'x');
        let c = parser
            .reparse_after_edit(&tree, Edit::insertion(0, 1))
            .unwrap();

        let mut fresh = Parser::new(Language::CLike.parse_func().unwrap());
        let expected = fresh.parse_all(&tree).unwrap();
        assert_eq!(c.tokens(), expected.tokens());
        assert_ne!(before, c.tokens());
    }
}
