//! The formatting session
//!
//!     `AlignmentSession` is the single owner of everything a formatting run needs: the
//!     token pool, the line pool, the column tree, the group manager, and the result
//!     collection. The token producer pushes tokens and structural events in source
//!     order; the session grows the column tree through a cursor, buffers lines into
//!     batches, and runs the alignment engine whenever a batch boundary is detected.
//!     There is no suspension point: alignment runs to completion inside the call that
//!     closed the batch, and the natural yield point for host-side cancellation is
//!     between batches.
//!
//! The cursor
//!
//!     Column lookup is positional. Each line walks the tree with a stack of cursor
//!     frames, one per open sequence; a frame remembers the child index after the
//!     previously matched column, so repeated roles resolve to successive columns and
//!     missing columns are inserted in token order. `begin_sequence`/`end_sequence`
//!     push and pop frames through choice alternatives.

use std::collections::HashSet;

use super::engine::AlignmentEngine;
use super::grouping::{AlignReason, LineGroupManager};
use super::line::{Line, LineId, LinePool};
use super::render::LineRenderer;
use super::role::{ColumnRole, SequenceRole, SimilarityInterner, StatementRole};
use super::scan;
use super::settings::AlignmentSettings;
use super::token::{Token, TokenHandle, TokenPool};
use super::tree::{ColumnArena, ColumnId, ColumnNode};

/// How a pushed token relates to the column tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleHint {
    /// The token belongs to the named column of the current sequence.
    Column(ColumnRole),
    /// The token has no recognized column and renders attached to its predecessor.
    Unaligned,
}

/// One rendered input line, with change tracking for the host integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedLine {
    pub original: String,
    pub rendered: String,
    pub changed: bool,
}

#[derive(Debug)]
struct CursorFrame {
    seq: ColumnId,
    index: usize,
}

/// A formatting session: producer-facing push API, consumer-facing results.
pub struct AlignmentSession {
    settings: AlignmentSettings,
    pool: TokenPool,
    lines: LinePool,
    arena: ColumnArena,
    interner: SimilarityInterner,
    manager: LineGroupManager,
    results: Vec<Option<AlignedLine>>,
    current: Option<LineId>,
    frames: Vec<CursorFrame>,
    pending_role: StatementRole,
    pending_bias: i32,
    pending_ws: u32,
    indent_level: u32,
    last_reason: Option<AlignReason>,
}

impl AlignmentSession {
    pub fn new(settings: AlignmentSettings) -> Self {
        let interner = SimilarityInterner::new(settings.method_call_similarity);
        Self {
            settings,
            pool: TokenPool::new(),
            lines: LinePool::new(),
            arena: ColumnArena::new(),
            interner,
            manager: LineGroupManager::new(),
            results: Vec::new(),
            current: None,
            frames: Vec::new(),
            pending_role: StatementRole::Unknown,
            pending_bias: 0,
            pending_ws: 0,
            indent_level: 0,
            last_reason: None,
        }
    }

    pub fn settings(&self) -> &AlignmentSettings {
        &self.settings
    }

    /// The column role for a method-call token, interned by leading-character
    /// similarity so near-identical calls share a column family.
    pub fn method_call_role(&mut self, name: &str) -> ColumnRole {
        ColumnRole::MethodCall(self.interner.intern(name))
    }

    /// Push one token of the current line.
    ///
    /// A whitespace token whose text contains a line break terminates the line.
    /// Unrecognized role usage degrades to unaligned placement; it never fails.
    pub fn push_token(&mut self, text: &str, role_hint: RoleHint, is_whitespace: bool) -> TokenHandle {
        let line_id = self.ensure_line();
        if is_whitespace {
            let breaks = text.contains('\n');
            if !breaks {
                self.pending_ws += visible_width(text, self.settings.tab_size);
            }
            let id = self.pool.insert(Token {
                text: text.to_string(),
                alternate: None,
                is_whitespace: true,
                right_justified: false,
                line: line_id,
                column: None,
                position: None,
                leading_spaces: 0,
            });
            let snapshot = self.pool[id].clone();
            self.lines[line_id].push(id, &snapshot);
            if breaks {
                self.end_line();
            }
            return id;
        }

        self.ensure_statement_frame(line_id);
        let column = match role_hint {
            RoleHint::Unaligned => None,
            RoleHint::Column(role) => self.resolve_column(role),
        };
        let right_justified = self.settings.right_justify_numbers
            && column.is_some()
            && scan::is_numeric_literal(text);
        let id = self.pool.insert(Token {
            text: text.to_string(),
            alternate: None,
            is_whitespace: false,
            right_justified,
            line: line_id,
            column,
            position: None,
            leading_spaces: self.pending_ws,
        });
        self.pending_ws = 0;
        if let Some(column) = column {
            let bias = self.lines[line_id].indent_bias;
            self.arena.assign_token(column, bias, id);
        }
        let snapshot = self.pool[id].clone();
        self.lines[line_id].push(id, &snapshot);
        id
    }

    /// Enter a brace-equivalent nesting level. Structural events always close the
    /// current batch.
    pub fn begin_nesting(&mut self) {
        self.structural_close();
        self.indent_level += 1;
    }

    pub fn end_nesting(&mut self) {
        self.structural_close();
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Enter a switch body, which indents two levels under the deeper-switch policy.
    pub fn begin_switch_nesting(&mut self) {
        self.structural_close();
        self.indent_level += self.switch_bump();
    }

    pub fn end_switch_nesting(&mut self) {
        self.structural_close();
        self.indent_level = self.indent_level.saturating_sub(self.switch_bump());
    }

    fn switch_bump(&self) -> u32 {
        if self.settings.deeper_switch {
            2
        } else {
            1
        }
    }

    /// Report the coarse statement role of the statement being produced. Should be
    /// called before the statement's first token; a role change may close the batch
    /// before the current line.
    pub fn set_statement_role(&mut self, role: StatementRole) {
        self.pending_role = role;
        if let Some(reason) = self.manager.note_statement_role(role, &self.settings) {
            self.close_batch(reason);
        }
    }

    /// Enter a region (single-statement body) whose statement roles must not close
    /// the batch.
    pub fn suspend_role_checking(&mut self) {
        self.manager.suspend_role_checking();
    }

    pub fn resume_role_checking(&mut self) {
        self.manager.resume_role_checking();
    }

    /// Tag the current line as a continuation at the given wrap depth. Tokens
    /// already pushed on the line follow it into the new bucket.
    pub fn set_indent_bias(&mut self, bias: i32) {
        self.pending_bias = bias;
        if let Some(id) = self.current {
            let old = self.lines[id].indent_bias;
            if old == bias {
                return;
            }
            for token in self.lines[id].tokens.clone() {
                if let Some(column) = self.pool[token].column {
                    self.arena.move_token_bucket(column, old, bias, token);
                }
            }
            self.lines[id].indent_bias = bias;
        }
    }

    /// Descend into a choice alternative: subsequent tokens resolve inside `alt`
    /// until the matching [`end_sequence`](Self::end_sequence).
    pub fn begin_sequence(&mut self, at: ColumnRole, alt: SequenceRole) {
        let line_id = self.ensure_line();
        self.ensure_statement_frame(line_id);
        let frame = self.frames.last_mut().expect("statement frame exists");
        match self.arena.find_or_insert_choice(frame.seq, at, alt, frame.index) {
            Some((alt_seq, next)) => {
                frame.index = next;
                self.frames.push(CursorFrame { seq: alt_seq, index: 0 });
            }
            None => {
                // Role already used as a token column here: degrade by staying in
                // the current sequence so the matching end_sequence still balances.
                let seq = frame.seq;
                let index = frame.index;
                self.frames.push(CursorFrame { seq, index });
            }
        }
    }

    pub fn end_sequence(&mut self) {
        if self.frames.len() > 1 {
            let popped = self.frames.pop();
            debug_assert!(popped.is_some());
        } else {
            debug_assert!(false, "end_sequence without matching begin_sequence");
        }
    }

    /// Explicitly close the current batch (unrecognized construct, host request).
    pub fn request_alignment(&mut self, reason: AlignReason) {
        self.close_batch(reason);
    }

    /// Close the session: finish the open line, align the open batch, and return the
    /// per-line results in input order.
    pub fn finish(mut self) -> Vec<AlignedLine> {
        if self.current.is_some() {
            self.end_line();
        }
        self.close_batch(AlignReason::EndOfInput);
        self.results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or(AlignedLine {
                    original: String::new(),
                    rendered: String::new(),
                    changed: false,
                })
            })
            .collect()
    }

    /// Rendered text of an input line, available once its batch has closed.
    pub fn rendered_text(&self, line_index: usize) -> Option<&str> {
        self.results
            .get(line_index)
            .and_then(|slot| slot.as_ref())
            .map(|line| line.rendered.as_str())
    }

    /// Whether rendering changed an input line, available once its batch has closed.
    pub fn changed(&self, line_index: usize) -> Option<bool> {
        self.results
            .get(line_index)
            .and_then(|slot| slot.as_ref())
            .map(|line| line.changed)
    }

    /// Why the most recent batch was closed.
    pub fn last_close_reason(&self) -> Option<AlignReason> {
        self.last_reason
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn ensure_line(&mut self) -> LineId {
        match self.current {
            Some(id) => id,
            None => {
                let id = self
                    .lines
                    .insert(Line::new(self.indent_level, self.pending_bias));
                self.results.push(None);
                self.current = Some(id);
                id
            }
        }
    }

    fn ensure_statement_frame(&mut self, line_id: LineId) {
        if !self.frames.is_empty() {
            return;
        }
        self.lines[line_id].statement = self.pending_role;
        let root = self.arena.root();
        let alt = self.pending_role.sequence_role();
        let (seq, _) = self
            .arena
            .find_or_insert_choice(root, ColumnRole::Statement, alt, 0)
            .expect("root statement choice");
        self.frames.push(CursorFrame { seq, index: 0 });
    }

    fn resolve_column(&mut self, role: ColumnRole) -> Option<ColumnId> {
        let frame = self.frames.last_mut().expect("statement frame exists");
        // Rearrangeable columns collect every repeat of the role on a line; the
        // rearranger collapses them into one canonical text.
        if self.settings.setting_for(&role).rearrange && frame.index > 0 {
            let children = &self.arena.sequence(frame.seq).children;
            if let Some(prev) = children.get(frame.index - 1) {
                if let ColumnNode::Token(node) = self.arena.node(*prev) {
                    if node.role == role {
                        return Some(*prev);
                    }
                }
            }
        }
        match self.arena.find_or_insert_token(frame.seq, role, frame.index) {
            Some((column, next)) => {
                frame.index = next;
                Some(column)
            }
            // The role names a choice here: malformed input, degrade to unaligned.
            None => None,
        }
    }

    fn end_line(&mut self) {
        let id = match self.current.take() {
            Some(id) => id,
            None => return,
        };
        self.frames.clear();
        self.pending_ws = 0;
        self.pending_bias = 0;
        let blank = self.lines[id].is_blank();
        let unaligned = self.lines[id].is_entirely_unaligned();
        if let Some(reason) = self
            .manager
            .note_line_complete(id, blank, unaligned, &self.settings)
        {
            self.close_batch(reason);
        }
    }

    fn structural_close(&mut self) {
        let reason = self.manager.note_structural();
        self.close_batch(reason);
    }

    fn close_batch(&mut self, reason: AlignReason) {
        let batch = self.manager.take_batch();
        if batch.is_empty() {
            return;
        }
        // A line still being produced is frozen for the duration of the pass so the
        // engine never measures a half-built line.
        if let Some(open) = self.current {
            self.lines[open].immutable = true;
        }

        AlignmentEngine::new(&self.settings, &self.arena).align_batch(
            &mut self.pool,
            &self.lines,
            &batch,
        );

        let renderer = LineRenderer::new(&self.settings, &self.arena);
        for id in &batch {
            let original = self.original_text(*id);
            let rendered = if self.lines[*id].participates() {
                renderer.render(&self.lines[*id], &self.pool)
            } else {
                original.clone()
            };
            let changed = rendered != original;
            self.results[id.0] = Some(AlignedLine {
                original,
                rendered,
                changed,
            });
        }

        let keep: HashSet<_> = self
            .current
            .map(|open| self.lines[open].tokens.iter().copied().collect())
            .unwrap_or_default();
        self.arena.retain_tokens(|token| keep.contains(&token));
        if let Some(open) = self.current {
            self.lines[open].immutable = false;
        }
        self.last_reason = Some(reason);
    }

    fn original_text(&self, id: LineId) -> String {
        let mut text = String::new();
        for token in &self.lines[id].tokens {
            text.push_str(&self.pool[*token].text);
        }
        text
    }
}

/// Width in character columns of a whitespace run.
fn visible_width(text: &str, tab_size: u32) -> u32 {
    text.chars()
        .map(|c| if c == '\t' { tab_size.max(1) } else { 1 })
        .sum()
}
