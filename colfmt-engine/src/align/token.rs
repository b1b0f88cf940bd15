//! Token records and the session token pool
//!
//! A token is created once per input element and after that is mutated only by the
//! alignment engine, which assigns its horizontal position and (for merged or
//! rearranged tokens) an alternate representation used in place of the original text.
//! Tokens live in an index-addressed pool owned by the session; lines and token
//! columns refer to them by [`TokenId`].

use std::ops::{Index, IndexMut};

use super::line::LineId;
use super::tree::ColumnId;

/// Identity of a token inside the session pool. This is the handle returned to
/// the token producer by `push_token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TokenId(pub(crate) usize);

/// Public alias used at the producer boundary.
pub type TokenHandle = TokenId;

/// One classified lexical unit of a source line.
#[derive(Debug, Clone)]
pub struct Token {
    /// Original text as received from the producer.
    pub text: String,
    /// Replacement text computed during alignment (merged trailing tokens,
    /// rearranged modifiers). `None` means the original text renders as-is.
    pub alternate: Option<String>,
    /// Whether the token is whitespace (spacing or line breaks).
    pub is_whitespace: bool,
    /// Whether the token aligns on its trailing edge within its column.
    pub right_justified: bool,
    /// The line the token belongs to.
    pub line: LineId,
    /// The token column the token was assigned to; `None` means unaligned.
    pub column: Option<ColumnId>,
    /// Horizontal position computed by the alignment engine.
    pub position: Option<u32>,
    /// Minimum leading spacing (columns of original whitespace before the token),
    /// used when rendering unaligned tokens.
    pub leading_spaces: u32,
}

impl Token {
    /// The text this token renders as.
    pub fn render_text(&self) -> &str {
        self.alternate.as_deref().unwrap_or(&self.text)
    }

    /// Rendered width in character columns.
    pub fn render_width(&self) -> u32 {
        self.render_text().chars().count() as u32
    }

    /// Whether this is a whitespace token carrying a line break.
    pub fn has_line_break(&self) -> bool {
        self.is_whitespace && self.text.contains('\n')
    }

    /// Whether the token was merged away and renders as nothing.
    pub fn renders_empty(&self) -> bool {
        self.render_text().is_empty()
    }
}

/// Index-addressed storage for all tokens of a formatting session.
#[derive(Debug, Default)]
pub struct TokenPool {
    tokens: Vec<Token>,
}

impl TokenPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: Token) -> TokenId {
        let id = TokenId(self.tokens.len());
        self.tokens.push(token);
        id
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Index<TokenId> for TokenPool {
    type Output = Token;

    fn index(&self, id: TokenId) -> &Token {
        &self.tokens[id.0]
    }
}

impl IndexMut<TokenId> for TokenPool {
    fn index_mut(&mut self, id: TokenId) -> &mut Token {
        &mut self.tokens[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Token {
        Token {
            text: text.to_string(),
            alternate: None,
            is_whitespace: false,
            right_justified: false,
            line: LineId(0),
            column: None,
            position: None,
            leading_spaces: 0,
        }
    }

    #[test]
    fn test_render_text_prefers_alternate() {
        let mut token = word("x");
        assert_eq!(token.render_text(), "x");
        token.alternate = Some("x)".to_string());
        assert_eq!(token.render_text(), "x)");
        assert_eq!(token.render_width(), 2);
    }

    #[test]
    fn test_merged_token_renders_empty() {
        let mut token = word("++");
        token.alternate = Some(String::new());
        assert!(token.renders_empty());
    }

    #[test]
    fn test_line_break_detection() {
        let mut ws = word("  \n");
        ws.is_whitespace = true;
        assert!(ws.has_line_break());
        let mut plain = word(" ");
        plain.is_whitespace = true;
        assert!(!plain.has_line_break());
    }

    #[test]
    fn test_pool_hands_out_sequential_ids() {
        let mut pool = TokenPool::new();
        let a = pool.insert(word("a"));
        let b = pool.insert(word("b"));
        assert_ne!(a, b);
        assert_eq!(pool[a].text, "a");
        assert_eq!(pool[b].text, "b");
        assert_eq!(pool.len(), 2);
    }
}
