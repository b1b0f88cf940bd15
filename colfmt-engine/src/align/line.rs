//! Lines and the open alignment batch
//!
//! A line is an ordered token sequence plus the derived facts the group manager and
//! engine need cheaply: whether the line is blank, whether it contains any aligned
//! token at all, its brace-nesting indent level, and its indent bias (the bucket for
//! wrapped continuation lines). The immutability flag freezes a line that is still
//! being produced while an earlier batch aligns, so the engine excludes its tokens.

use std::ops::{Index, IndexMut};

use super::role::StatementRole;
use super::token::{Token, TokenId};

/// Identity of a line inside the session line pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct LineId(pub(crate) usize);

/// One source line: an ordered token sequence with derived flags.
#[derive(Debug, Clone)]
pub struct Line {
    pub tokens: Vec<TokenId>,
    /// Brace-nesting depth at the start of the line.
    pub indent_level: u32,
    /// Continuation bucket; non-zero for wrapped sub-lines.
    pub indent_bias: i32,
    /// Set while the line is being produced during an alignment of earlier lines.
    pub immutable: bool,
    /// Statement role the producer reported for this line.
    pub statement: StatementRole,
    blank: bool,
    any_aligned: bool,
}

impl Line {
    pub fn new(indent_level: u32, indent_bias: i32) -> Self {
        Self {
            tokens: Vec::new(),
            indent_level,
            indent_bias,
            immutable: false,
            statement: StatementRole::Unknown,
            blank: true,
            any_aligned: false,
        }
    }

    /// Append a token, updating the derived flags.
    pub fn push(&mut self, id: TokenId, token: &Token) {
        if !token.is_whitespace {
            self.blank = false;
            if token.column.is_some() {
                self.any_aligned = true;
            }
        }
        self.tokens.push(id);
    }

    /// Whether the line is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.blank
    }

    /// Whether no token of the line was assigned a column.
    pub fn is_entirely_unaligned(&self) -> bool {
        !self.blank && !self.any_aligned
    }

    /// Whether the alignment engine reformats this line at all.
    pub fn participates(&self) -> bool {
        !self.blank && self.any_aligned && !self.immutable
    }

    /// Horizontal column where the line's content starts: nesting level plus the
    /// continuation bucket, in units of the configured indent width.
    pub fn indent_columns(&self, indent_width: u32) -> u32 {
        let bias = self.indent_bias.max(0) as u32;
        (self.indent_level + bias) * indent_width
    }
}

/// Index-addressed storage for all lines of a formatting session.
#[derive(Debug, Default)]
pub struct LinePool {
    lines: Vec<Line>,
}

impl LinePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, line: Line) -> LineId {
        let id = LineId(self.lines.len());
        self.lines.push(line);
        id
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Index<LineId> for LinePool {
    type Output = Line;

    fn index(&self, id: LineId) -> &Line {
        &self.lines[id.0]
    }
}

impl IndexMut<LineId> for LinePool {
    fn index_mut(&mut self, id: LineId) -> &mut Line {
        &mut self.lines[id.0]
    }
}
