//! JSON tokenizer.
//!
//! Stateless: every chunk both enters and leaves the `Empty` state.
//! Each invocation consumes one run of whitespace or one token.

use crate::syntax::token::{ComputedToken, TokenRole};
use crate::syntax::tracking::TrackingRuneIter;
use crate::syntax::{ParseResult, ParseState};

pub(crate) fn parse_chunk(iter: &mut TrackingRuneIter<'_>, _state: &ParseState) -> ParseResult {
    let first = match peek(iter) {
        Some(ch) => ch,
        None => return ParseResult::failed(),
    };
    match first {
        ch if ch.is_whitespace() => consume_whitespace(iter),
        '"' => consume_string(iter),
        '-' => consume_number(iter),
        ch if ch.is_ascii_digit() => consume_number(iter),
        't' => consume_keyword(iter, "true"),
        'f' => consume_keyword(iter, "false"),
        'n' => consume_keyword(iter, "null"),
        '{' | '}' | '[' | ']' | ':' | ',' => consume_punctuation(iter),
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

fn consume_string(iter: &mut TrackingRuneIter<'_>) -> ParseResult {
    iter.next(); // opening quote
    let mut n = 1u64;
    loop {
        match iter.next() {
            None => break,
            Some('\\') => {
                n += 1;
                if iter.next().is_some() {
                    n += 1;
                }
            }
            Some('"') => {
                n += 1;
                break;
            }
            Some(_) => n += 1,
        }
    }
    token_result(n, TokenRole::String)
}

fn consume_number(iter: &mut TrackingRuneIter<'_>) -> ParseResult {
    let mut n = 0u64;
    if peek(iter) == Some('-') {
        iter.next();
        n += 1;
    }
    n += consume_digits(iter);
    if peek(iter) == Some('.') {
        iter.next();
        n += 1;
        n += consume_digits(iter);
    }
    if matches!(peek(iter), Some('e') | Some('E')) {
        iter.next();
        n += 1;
        if matches!(peek(iter), Some('+') | Some('-')) {
            iter.next();
            n += 1;
        }
        n += consume_digits(iter);
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

fn consume_keyword(iter: &mut TrackingRuneIter<'_>, word: &str) -> ParseResult {
    let mut n = 0u64;
    for expected in word.chars() {
        if peek(iter) != Some(expected) {
            return ParseResult::failed();
        }
        iter.next();
        n += 1;
    }
    token_result(n, TokenRole::Keyword)
}

fn consume_punctuation(iter: &mut TrackingRuneIter<'_>) -> ParseResult {
    iter.next();
    token_result(1, TokenRole::Punctuation)
}

#[cfg(test)]
mod tests {
    use crate::syntax::{Language, Parser, TokenRole};
    use crate::text::Tree;

    fn tokenize(text: &str) -> Vec<(u64, u64, TokenRole)> {
        let tree = Tree::from(text);
        let mut parser = Parser::new(Language::Json.parse_func().unwrap());
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
    fn test_empty() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_object() {
        let tokens = tokenize(r#"{"key": 123}"#);
        assert_eq!(
            tokens,
            vec![
                (0, 1, TokenRole::Punctuation),
                (1, 6, TokenRole::String),
                (6, 7, TokenRole::Punctuation),
                (8, 11, TokenRole::Number),
                (11, 12, TokenRole::Punctuation),
            ]
        );
    }

    #[test]
    fn test_keywords() {
        let tokens = tokenize("[true, false, null]");
        let roles: Vec<TokenRole> = tokens.iter().map(|t| t.2).collect();
        assert_eq!(
            roles,
            vec![
                TokenRole::Punctuation,
                TokenRole::Keyword,
                TokenRole::Punctuation,
                TokenRole::Keyword,
                TokenRole::Punctuation,
                TokenRole::Keyword,
                TokenRole::Punctuation,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("-12.5e+3");
        assert_eq!(tokens, vec![(0, 8, TokenRole::Number)]);
    }

    #[test]
    fn test_string_with_escapes() {
        let tokens = tokenize(r#""a\"b""#);
        assert_eq!(tokens, vec![(0, 6, TokenRole::String)]);
    }

    #[test]
    fn test_unterminated_string_consumes_rest() {
        let tokens = tokenize(r#""abc"#);
        assert_eq!(tokens, vec![(0, 4, TokenRole::String)]);
    }

    #[test]
    fn test_unrecognized_input_recovers() {
        // '@' fails the parse; the framework advances one codepoint.
        let tokens = tokenize("@1");
        assert_eq!(tokens, vec![(1, 2, TokenRole::Number)]);
    }
}
