//! Lexer for predicate expressions using logos

use logos::Logos;

use crate::error::{Error, Result};

/// Token types of the predicate language
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token<'src> {
    // Keywords
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("undefined")]
    Undefined,

    // Identifiers
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice())]
    Ident(&'src str),

    // Literals
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    String(&'src str),

    #[regex(r"'([^'\\]|\\.)*'", |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    SingleQuoteString(&'src str),

    // Operators
    #[token("===")]
    StrictEq,
    #[token("!==")]
    StrictNotEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    Lte,
    #[token(">")]
    Gt,
    #[token(">=")]
    Gte,
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("!")]
    Bang,
    #[token("-")]
    Minus,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
}

/// A token with its byte span
pub type SpannedToken<'src> = (Token<'src>, std::ops::Range<usize>);

/// Lex a predicate into tokens, failing on the first unexpected character
pub fn lex(source: &str) -> Result<Vec<SpannedToken<'_>>> {
    Token::lexer(source)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => Ok((token, span)),
            Err(_) => Err(Error::Lex {
                position: span.start,
            }),
        })
        .collect()
}

/// Resolve backslash escapes in a quoted literal
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        lex(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_lex_member_access() {
        assert_eq!(
            tokens("model.matchers[index]"),
            vec![
                Token::Ident("model"),
                Token::Dot,
                Token::Ident("matchers"),
                Token::LBracket,
                Token::Ident("index"),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_lex_keywords_and_longer_idents() {
        assert_eq!(
            tokens("return returned true"),
            vec![Token::Return, Token::Ident("returned"), Token::True]
        );
    }

    #[test]
    fn test_lex_operators_longest_match() {
        assert_eq!(
            tokens("=== !== == != <= >= < > && || !"),
            vec![
                Token::StrictEq,
                Token::StrictNotEq,
                Token::EqEq,
                Token::NotEq,
                Token::Lte,
                Token::Gte,
                Token::Lt,
                Token::Gt,
                Token::And,
                Token::Or,
                Token::Bang,
            ]
        );
    }

    #[test]
    fn test_lex_strings_and_numbers() {
        assert_eq!(
            tokens(r#"'a b' "c" 1.5 10"#),
            vec![
                Token::SingleQuoteString("a b"),
                Token::String("c"),
                Token::Number("1.5"),
                Token::Number("10"),
            ]
        );
    }

    #[test]
    fn test_lex_rejects_unknown_character() {
        let err = lex("model.a = 1").unwrap_err();
        assert!(matches!(err, Error::Lex { position: 8 }));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"it\'s"), "it's");
        assert_eq!(unescape(r"a\\b"), r"a\b");
        assert_eq!(unescape(r"line\n"), "line\n");
    }
}
