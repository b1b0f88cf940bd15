//! The column tree
//!
//!     The tree encodes "what comes after what": a Sequence is an ordered run of columns,
//!     a Choice holds alternative Sequences keyed by a discriminant role (different lines
//!     may populate different alternatives), and a TokenColumn is a leaf collecting the
//!     tokens assigned to one syntactic position across all lines of the current batch.
//!
//!     Nodes live in an arena and refer to each other by [`ColumnId`]. The tree is grown
//!     lazily while tokens arrive and is never restructured during alignment; the engine
//!     keeps all per-pass numeric state (tabstops, widths) in parallel arrays indexed by
//!     the same ids.
//!
//! Ordering on insertion
//!
//!     Lookup is cursor-based: the session scans a sequence's children starting at the
//!     position after the previously matched column of the current line, and a missing
//!     column is inserted exactly at the scan start. This keeps column order consistent
//!     with token order even when a later line introduces a column (say, an `=` between
//!     a name and a semicolon) that earlier lines did not have, and it resolves repeated
//!     roles on one line to successive columns without explicit occurrence numbering.

use std::collections::BTreeMap;

use super::role::{ColumnRole, SequenceRole};
use super::token::TokenId;

/// Identity of a column node inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ColumnId(pub(crate) usize);

/// The three column kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Sequence,
    Choice,
    Token,
}

/// An ordered run of child columns.
#[derive(Debug)]
pub struct SequenceColumn {
    /// `None` for the session root.
    pub role: Option<SequenceRole>,
    pub parent: Option<ColumnId>,
    pub children: Vec<ColumnId>,
}

/// Alternative sequences keyed by a discriminant role.
#[derive(Debug)]
pub struct ChoiceColumn {
    pub role: ColumnRole,
    pub parent: ColumnId,
    pub alternatives: Vec<(SequenceRole, ColumnId)>,
}

/// A leaf column holding, per indent-bias bucket, the tokens assigned to it.
#[derive(Debug)]
pub struct TokenColumn {
    pub role: ColumnRole,
    pub parent: ColumnId,
    pub buckets: BTreeMap<i32, Vec<TokenId>>,
}

impl TokenColumn {
    /// Tokens assigned to this column for one indent-bias bucket.
    pub fn tokens(&self, bias: i32) -> &[TokenId] {
        self.buckets.get(&bias).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One node of the column tree.
#[derive(Debug)]
pub enum ColumnNode {
    Sequence(SequenceColumn),
    Choice(ChoiceColumn),
    Token(TokenColumn),
}

impl ColumnNode {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnNode::Sequence(_) => ColumnKind::Sequence,
            ColumnNode::Choice(_) => ColumnKind::Choice,
            ColumnNode::Token(_) => ColumnKind::Token,
        }
    }
}

/// Arena of column nodes; the root sequence is created up front and lives for the
/// whole formatting session.
#[derive(Debug)]
pub struct ColumnArena {
    nodes: Vec<ColumnNode>,
    root: ColumnId,
}

impl Default for ColumnArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnArena {
    pub fn new() -> Self {
        let root = ColumnNode::Sequence(SequenceColumn {
            role: None,
            parent: None,
            children: Vec::new(),
        });
        Self {
            nodes: vec![root],
            root: ColumnId(0),
        }
    }

    pub fn root(&self) -> ColumnId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: ColumnId) -> &ColumnNode {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: ColumnId) -> ColumnKind {
        self.node(id).kind()
    }

    /// Borrow a node as a sequence. Panics on kind mismatch; ids are only ever
    /// produced by this arena, so a mismatch is a programmer error.
    pub fn sequence(&self, id: ColumnId) -> &SequenceColumn {
        match &self.nodes[id.0] {
            ColumnNode::Sequence(seq) => seq,
            other => panic!("column {:?} is a {:?}, not a sequence", id, other.kind()),
        }
    }

    pub fn choice(&self, id: ColumnId) -> &ChoiceColumn {
        match &self.nodes[id.0] {
            ColumnNode::Choice(choice) => choice,
            other => panic!("column {:?} is a {:?}, not a choice", id, other.kind()),
        }
    }

    pub fn token_column(&self, id: ColumnId) -> &TokenColumn {
        match &self.nodes[id.0] {
            ColumnNode::Token(column) => column,
            other => panic!("column {:?} is a {:?}, not a token column", id, other.kind()),
        }
    }

    fn sequence_mut(&mut self, id: ColumnId) -> &mut SequenceColumn {
        match &mut self.nodes[id.0] {
            ColumnNode::Sequence(seq) => seq,
            other => panic!("column {:?} is a {:?}, not a sequence", id, other.kind()),
        }
    }

    /// Find the token column for `role` in `seq`, scanning children from `start`,
    /// inserting a new column at `start` when absent.
    ///
    /// Returns the column and the next scan cursor. Returns `None` when the role is
    /// already used by a Choice in the scanned range; the caller degrades the token
    /// to unaligned placement rather than corrupting the tree.
    pub fn find_or_insert_token(
        &mut self,
        seq: ColumnId,
        role: ColumnRole,
        start: usize,
    ) -> Option<(ColumnId, usize)> {
        let start = start.min(self.sequence(seq).children.len());
        let scan: Vec<ColumnId> = self.sequence(seq).children[start..].to_vec();
        for (offset, child) in scan.iter().enumerate() {
            match self.node(*child) {
                ColumnNode::Token(column) if column.role == role => {
                    return Some((*child, start + offset + 1));
                }
                ColumnNode::Choice(choice) if choice.role == role => {
                    return None;
                }
                _ => {}
            }
        }
        let id = ColumnId(self.nodes.len());
        self.nodes.push(ColumnNode::Token(TokenColumn {
            role,
            parent: seq,
            buckets: BTreeMap::new(),
        }));
        self.sequence_mut(seq).children.insert(start, id);
        Some((id, start + 1))
    }

    /// Find the choice for `role` in `seq` (inserting at `start` when absent) and the
    /// alternative sequence for `alt` inside it (appending when absent).
    ///
    /// Returns `(alternative sequence, cursor after the choice)`, or `None` when the
    /// role is already used by a token column in the scanned range.
    pub fn find_or_insert_choice(
        &mut self,
        seq: ColumnId,
        role: ColumnRole,
        alt: SequenceRole,
        start: usize,
    ) -> Option<(ColumnId, usize)> {
        let start = start.min(self.sequence(seq).children.len());
        let scan: Vec<ColumnId> = self.sequence(seq).children[start..].to_vec();
        let mut found = None;
        for (offset, child) in scan.iter().enumerate() {
            match self.node(*child) {
                ColumnNode::Choice(choice) if choice.role == role => {
                    found = Some((*child, start + offset + 1));
                    break;
                }
                ColumnNode::Token(column) if column.role == role => {
                    return None;
                }
                _ => {}
            }
        }
        let (choice_id, cursor) = match found {
            Some(found) => found,
            None => {
                let id = ColumnId(self.nodes.len());
                self.nodes.push(ColumnNode::Choice(ChoiceColumn {
                    role,
                    parent: seq,
                    alternatives: Vec::new(),
                }));
                self.sequence_mut(seq).children.insert(start, id);
                (id, start + 1)
            }
        };
        let alt_seq = self.find_or_append_alternative(choice_id, alt);
        Some((alt_seq, cursor))
    }

    fn find_or_append_alternative(&mut self, choice: ColumnId, alt: SequenceRole) -> ColumnId {
        if let ColumnNode::Choice(node) = self.node(choice) {
            if let Some((_, seq)) = node.alternatives.iter().find(|(role, _)| *role == alt) {
                return *seq;
            }
        }
        let id = ColumnId(self.nodes.len());
        self.nodes.push(ColumnNode::Sequence(SequenceColumn {
            role: Some(alt),
            parent: Some(choice),
            children: Vec::new(),
        }));
        match &mut self.nodes[choice.0] {
            ColumnNode::Choice(node) => node.alternatives.push((alt, id)),
            other => panic!("column {:?} is a {:?}, not a choice", choice, other.kind()),
        }
        id
    }

    /// Record a token in a token column's bucket for the given indent bias.
    pub fn assign_token(&mut self, column: ColumnId, bias: i32, token: TokenId) {
        match &mut self.nodes[column.0] {
            ColumnNode::Token(node) => {
                let bucket = node.buckets.entry(bias).or_default();
                debug_assert!(
                    !bucket.contains(&token),
                    "token {:?} assigned to column {:?} twice",
                    token,
                    column
                );
                bucket.push(token);
            }
            other => panic!("column {:?} is a {:?}, not a token column", column, other.kind()),
        }
    }

    /// Move a token between indent-bias buckets (the producer declared the line a
    /// continuation after some of its tokens had already arrived).
    pub fn move_token_bucket(&mut self, column: ColumnId, from: i32, to: i32, token: TokenId) {
        if from == to {
            return;
        }
        if let ColumnNode::Token(node) = &mut self.nodes[column.0] {
            if let Some(bucket) = node.buckets.get_mut(&from) {
                bucket.retain(|t| *t != token);
                if bucket.is_empty() {
                    node.buckets.remove(&from);
                }
            }
            node.buckets.entry(to).or_default().push(token);
        }
    }

    /// Drop tokens from every bucket except those the predicate keeps
    /// (tokens of a still-open, immutable line survive a batch clear).
    pub fn retain_tokens(&mut self, mut keep: impl FnMut(TokenId) -> bool) {
        for node in &mut self.nodes {
            if let ColumnNode::Token(column) = node {
                for bucket in column.buckets.values_mut() {
                    bucket.retain(|token| keep(*token));
                }
                column.buckets.retain(|_, bucket| !bucket.is_empty());
            }
        }
    }

    /// All column ids, for sizing parallel state arrays.
    pub fn ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        (0..self.nodes.len()).map(ColumnId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_or_insert_creates_then_reuses() {
        let mut arena = ColumnArena::new();
        let root = arena.root();
        let (type_col, cursor) = arena
            .find_or_insert_token(root, ColumnRole::TypeName, 0)
            .expect("token column");
        assert_eq!(cursor, 1);
        let (again, _) = arena
            .find_or_insert_token(root, ColumnRole::TypeName, 0)
            .expect("token column");
        assert_eq!(type_col, again);
        assert_eq!(arena.sequence(root).children.len(), 1);
    }

    #[test]
    fn test_insertion_preserves_order_between_existing_columns() {
        let mut arena = ColumnArena::new();
        let root = arena.root();
        // Line one: name ;  Line two: name = term ;
        let (_, c1) = arena
            .find_or_insert_token(root, ColumnRole::VariableName, 0)
            .unwrap();
        let (semi, _) = arena
            .find_or_insert_token(root, ColumnRole::Semicolon, c1)
            .unwrap();

        let (_, c1) = arena
            .find_or_insert_token(root, ColumnRole::VariableName, 0)
            .unwrap();
        let (assign, c2) = arena
            .find_or_insert_token(root, ColumnRole::AssignmentOperator, c1)
            .unwrap();
        let (term, c3) = arena.find_or_insert_token(root, ColumnRole::Term, c2).unwrap();
        let (semi_again, _) = arena
            .find_or_insert_token(root, ColumnRole::Semicolon, c3)
            .unwrap();

        assert_eq!(semi, semi_again);
        let order: Vec<ColumnId> = arena.sequence(root).children.clone();
        let pos = |id: ColumnId| order.iter().position(|c| *c == id).unwrap();
        assert!(pos(assign) < pos(term));
        assert!(pos(term) < pos(semi));
    }

    #[test]
    fn test_repeated_role_gets_successive_columns() {
        let mut arena = ColumnArena::new();
        let root = arena.root();
        let (first, cursor) = arena
            .find_or_insert_token(root, ColumnRole::Argument, 0)
            .unwrap();
        let (comma, cursor) = arena
            .find_or_insert_token(root, ColumnRole::Comma, cursor)
            .unwrap();
        let (second, _) = arena
            .find_or_insert_token(root, ColumnRole::Argument, cursor)
            .unwrap();
        assert_ne!(first, second);
        assert_ne!(second, comma);
    }

    #[test]
    fn test_choice_alternatives_share_one_node() {
        let mut arena = ColumnArena::new();
        let root = arena.root();
        let (assignment, _) = arena
            .find_or_insert_choice(root, ColumnRole::Term, SequenceRole::Assignment, 0)
            .unwrap();
        let (call, _) = arena
            .find_or_insert_choice(root, ColumnRole::Term, SequenceRole::MethodCall, 0)
            .unwrap();
        assert_ne!(assignment, call);
        // Exactly one choice child on the root, holding both alternatives.
        assert_eq!(arena.sequence(root).children.len(), 1);
        let choice = arena.sequence(root).children[0];
        assert_eq!(arena.choice(choice).alternatives.len(), 2);
    }

    #[test]
    fn test_role_kind_conflict_is_reported() {
        let mut arena = ColumnArena::new();
        let root = arena.root();
        arena
            .find_or_insert_choice(root, ColumnRole::Term, SequenceRole::Expression, 0)
            .unwrap();
        assert!(arena.find_or_insert_token(root, ColumnRole::Term, 0).is_none());
    }

    #[test]
    fn test_retain_tokens_clears_buckets() {
        let mut arena = ColumnArena::new();
        let root = arena.root();
        let (col, _) = arena
            .find_or_insert_token(root, ColumnRole::Term, 0)
            .unwrap();
        arena.assign_token(col, 0, TokenId(0));
        arena.assign_token(col, 0, TokenId(1));
        arena.retain_tokens(|token| token == TokenId(1));
        assert_eq!(arena.token_column(col).tokens(0), &[TokenId(1)]);
        arena.retain_tokens(|_| false);
        assert!(arena.token_column(col).tokens(0).is_empty());
    }
}
