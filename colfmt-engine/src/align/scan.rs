//! Lexical scanning of single token texts
//!
//! The engine never parses a language grammar, but a few of its rules depend on what kind
//! of text a token carries: the merge pass inserts a boundary space only between
//! identifier-like characters, and numeric literals are flagged for right-justification.
//! This module provides that classification using a logos scanner over one token string
//! at a time.

use logos::Logos;

/// Lexemes recognized inside a single token text.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme {
    // Hex first so the `0x` prefix never lexes as a decimal zero.
    #[regex(r"0[xX][0-9a-fA-F_]+[lLuU]?", priority = 4)]
    #[regex(r"[0-9][0-9_]*(\.[0-9]+)?([eE][+-]?[0-9]+)?[fFdDlLuU]?", priority = 3)]
    Number,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Word,

    #[regex(r"[ \t\r\n]+")]
    Space,

    #[regex(r"[+\-*/%=<>!&|^~?:.,;@#]+")]
    Operator,

    #[regex(r"[()\[\]{}]")]
    Bracket,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,

    #[regex(r"'([^'\\]|\\.)'")]
    CharLit,
}

/// Coarse lexical category of a whole token text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Identifier,
    Number,
    Operator,
    Bracket,
    String,
    Whitespace,
    /// Empty text, or text the scanner does not recognize as a single lexeme.
    Mixed,
}

/// Classify a token's text.
///
/// The category is only meaningful when the entire text is one lexeme; anything
/// else (including empty text) is `Mixed` and treated conservatively by callers.
pub fn category(text: &str) -> Category {
    let mut lexer = Lexeme::lexer(text);
    let first = match lexer.next() {
        Some(Ok(lexeme)) => lexeme,
        _ => return Category::Mixed,
    };
    if lexer.next().is_some() {
        return Category::Mixed;
    }
    match first {
        Lexeme::Number => Category::Number,
        Lexeme::Word => Category::Identifier,
        Lexeme::Space => Category::Whitespace,
        Lexeme::Operator => Category::Operator,
        Lexeme::Bracket => Category::Bracket,
        Lexeme::Str | Lexeme::CharLit => Category::String,
    }
}

/// Whether a token text is a numeric literal (right-justification candidate).
pub fn is_numeric_literal(text: &str) -> bool {
    category(text) == Category::Number
}

/// Whether a character would glue to an adjacent identifier or number.
pub fn is_identifier_like(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether merging `right` directly after `left` needs a separating space.
///
/// Only required when both boundary characters are identifier-like; `x` + `++`
/// can touch, `int` + `x` cannot.
pub fn needs_boundary_space(left: &str, right: &str) -> bool {
    let last = left.chars().next_back();
    let first = right.chars().next();
    matches!((last, first), (Some(l), Some(r)) if is_identifier_like(l) && is_identifier_like(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_identifier() {
        assert_eq!(category("longname"), Category::Identifier);
        assert_eq!(category("_tmp$0"), Category::Identifier);
    }

    #[test]
    fn test_category_number() {
        assert_eq!(category("42"), Category::Number);
        assert_eq!(category("3.25e-4"), Category::Number);
        assert_eq!(category("0xFF_EC"), Category::Number);
        assert_eq!(category("10L"), Category::Number);
    }

    #[test]
    fn test_category_operator_and_bracket() {
        assert_eq!(category("+="), Category::Operator);
        assert_eq!(category("("), Category::Bracket);
    }

    #[test]
    fn test_category_mixed() {
        assert_eq!(category(""), Category::Mixed);
        assert_eq!(category("a + b"), Category::Mixed);
        assert_eq!(category("foo("), Category::Mixed);
    }

    #[test]
    fn test_numeric_literal_detection() {
        assert!(is_numeric_literal("333"));
        assert!(!is_numeric_literal("x3"));
        assert!(!is_numeric_literal("\"3\""));
    }

    #[test]
    fn test_boundary_space() {
        assert!(needs_boundary_space("int", "x"));
        assert!(needs_boundary_space("x", "2"));
        assert!(!needs_boundary_space("x", "++"));
        assert!(!needs_boundary_space("=", "1"));
        assert!(!needs_boundary_space("", "x"));
    }
}
