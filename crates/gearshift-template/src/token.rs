//! Flat token stream over template source.

use once_cell::sync::Lazy;
use regex::Regex;

static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("Invalid regex pattern"));

/// One lexical unit. Borrowed from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    /// Variable name plus the raw tag, kept for unresolved output.
    Var { name: &'a str, raw: &'a str },
    IfOpen(&'a str),
    /// Raw tag, emitted as text when outside an `if`.
    Else(&'a str),
    IfClose,
    EachOpen(&'a str),
    EachClose,
}

/// Whether `name` is a valid variable identifier.
pub fn is_identifier(name: &str) -> bool {
    IDENT.is_match(name)
}

/// Split source into tokens. Never fails: unrecognised tags are text.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };

        if open > 0 {
            tokens.push(Token::Text(&rest[..open]));
        }

        let raw = &rest[open..open + 2 + close + 2];
        tokens.push(classify(after[..close].trim(), raw));
        rest = &after[close + 2..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    tokens
}

fn classify<'a>(inner: &'a str, raw: &'a str) -> Token<'a> {
    match inner {
        "else" => return Token::Else(raw),
        "/if" => return Token::IfClose,
        "/each" => return Token::EachClose,
        _ => {}
    }

    let block = |prefix: &str| {
        inner
            .strip_prefix(prefix)
            .filter(|r| r.starts_with(char::is_whitespace))
            .map(str::trim)
            .filter(|k| is_identifier(k))
    };

    if let Some(key) = block("#if") {
        Token::IfOpen(key)
    } else if let Some(key) = block("#each") {
        Token::EachOpen(key)
    } else if is_identifier(inner) {
        Token::Var { name: inner, raw }
    } else {
        Token::Text(raw)
    }
}
