//! The alignment engine
//!
//!     Runs once per closed batch, once per distinct indent-bias bucket present in the
//!     batch. Each run recomputes everything from reset state; there is no incremental
//!     patching of stale tabstops, which rules out half-aligned batches by construction.
//!
//!     The passes, per bucket:
//!
//!         1. Reset per-token state (positions, alternate representations).
//!         2. Alternate representations: rearrange modifier columns, merge unaligned
//!            tokens into the nearest preceding aligned token, trim trailing spaces on
//!            columns that disable alignment or zero-pad.
//!         3. Tabstops top-down: a column starts at the maximum extent of its earlier
//!            siblings (plus minimum spacing), propagated through choices to every
//!            alternative.
//!         4. Placement and widths bottom-up: walk each line, placing tokens at their
//!            column tabstop (or locally for columns that do not align), right-justify
//!            flagged tokens, and accumulate column widths.
//!         5. Repeat 3–4 until no width changes: a widened column pushes later tabstops
//!            out, which can widen parents in turn, so this is a fixed point, bounded
//!            in practice by the number of columns on the longest line.

use std::collections::HashSet;

use super::line::{LineId, LinePool};
use super::rearranger::ModifierRearranger;
use super::settings::{AlignmentSettings, ColumnSetting};
use super::token::{TokenId, TokenPool};
use super::tree::{ColumnArena, ColumnId, ColumnNode};

/// Per-pass numeric state, indexed by [`ColumnId`] in parallel with the arena.
#[derive(Debug)]
struct PassState {
    tabstop: Vec<u32>,
    width: Vec<u32>,
    /// Widest right-justified token per column.
    rj_width: Vec<u32>,
    /// Whether every token of the column renders with a trailing space.
    trailing_space: Vec<bool>,
    /// Whether the column (or any descendant) holds a visible token this pass.
    occupied: Vec<bool>,
}

impl PassState {
    fn new(columns: usize) -> Self {
        Self {
            tabstop: vec![0; columns],
            width: vec![0; columns],
            rj_width: vec![0; columns],
            trailing_space: vec![false; columns],
            occupied: vec![false; columns],
        }
    }
}

/// Result of laying out one subtree: its rightmost extent, whether its last visible
/// column renders a trailing space, and whether it holds any visible token at all.
#[derive(Debug, Clone, Copy)]
struct LayoutResult {
    extent: u32,
    trailing_space: bool,
    any: bool,
}

/// Aligns the lines of one closed batch. Structure of the column tree is never
/// mutated here; only token state and the parallel numeric arrays change.
pub struct AlignmentEngine<'a> {
    settings: &'a AlignmentSettings,
    arena: &'a ColumnArena,
}

impl<'a> AlignmentEngine<'a> {
    pub fn new(settings: &'a AlignmentSettings, arena: &'a ColumnArena) -> Self {
        Self { settings, arena }
    }

    /// Align every participating line of the batch, assigning token positions and
    /// alternate representations. Blank, entirely-unaligned, and immutable lines are
    /// left untouched.
    pub fn align_batch(&self, pool: &mut TokenPool, lines: &LinePool, batch: &[LineId]) {
        let participating: Vec<LineId> = batch
            .iter()
            .copied()
            .filter(|id| lines[*id].participates())
            .collect();
        if participating.is_empty() {
            return;
        }
        let mut biases: Vec<i32> = participating
            .iter()
            .map(|id| lines[*id].indent_bias)
            .collect();
        biases.sort_unstable();
        biases.dedup();
        for bias in biases {
            let pass_lines: Vec<LineId> = participating
                .iter()
                .copied()
                .filter(|id| lines[*id].indent_bias == bias)
                .collect();
            self.run_pass(pool, lines, &pass_lines, bias);
        }
    }

    fn run_pass(&self, pool: &mut TokenPool, lines: &LinePool, pass_lines: &[LineId], bias: i32) {
        for line in pass_lines {
            for token in &lines[*line].tokens {
                pool[*token].alternate = None;
                pool[*token].position = None;
            }
        }

        let pass_set: HashSet<LineId> = pass_lines.iter().copied().collect();
        self.apply_rearrangers(pool, lines, pass_lines, bias);
        for line in pass_lines {
            self.merge_unaligned(pool, &lines[*line].tokens);
        }
        self.trim_column_alternates(pool, &pass_set, bias);

        let mut state = PassState::new(self.arena.len());
        self.seed_column_state(pool, &pass_set, bias, &mut state);

        let base = pass_lines
            .iter()
            .map(|id| self.indent_columns(&lines[*id]))
            .min()
            .unwrap_or(0);

        let cap = self.arena.len() + 8;
        let mut iterations = 0;
        loop {
            self.layout(self.arena.root(), base, false, false, &mut state);
            let changed = self.place_and_measure(pool, lines, pass_lines, &mut state);
            iterations += 1;
            if !changed {
                break;
            }
            if iterations >= cap {
                debug_assert!(false, "alignment fixed point did not stabilize");
                break;
            }
        }
    }

    fn indent_columns(&self, line: &super::line::Line) -> u32 {
        line.indent_columns(self.settings.indent_width)
    }

    fn setting_of(&self, column: ColumnId) -> ColumnSetting {
        match self.arena.node(column) {
            ColumnNode::Token(node) => self.settings.setting_for(&node.role),
            _ => ColumnSetting::default(),
        }
    }

    /// Regenerate the alternate text of rearrangeable columns (modifiers): one
    /// canonical string per line on the line's first modifier token, empty text on
    /// the rest.
    fn apply_rearrangers(
        &self,
        pool: &mut TokenPool,
        lines: &LinePool,
        pass_lines: &[LineId],
        bias: i32,
    ) {
        for column in self.arena.ids() {
            let node = match self.arena.node(column) {
                ColumnNode::Token(node) => node,
                _ => continue,
            };
            if !self.settings.setting_for(&node.role).rearrange {
                continue;
            }
            let members: HashSet<TokenId> = node.tokens(bias).iter().copied().collect();
            if members.is_empty() {
                continue;
            }

            let mut per_line: Vec<Vec<TokenId>> = Vec::new();
            for line in pass_lines {
                let in_line: Vec<TokenId> = lines[*line]
                    .tokens
                    .iter()
                    .copied()
                    .filter(|token| members.contains(token))
                    .collect();
                if !in_line.is_empty() {
                    per_line.push(in_line);
                }
            }
            if per_line.is_empty() {
                continue;
            }

            let mut rearranger = ModifierRearranger::new();
            for group in &per_line {
                rearranger.note_words(group.iter().map(|token| pool[*token].text.as_str()));
            }
            if rearranger.is_empty() {
                continue;
            }
            for group in &per_line {
                let words: Vec<String> =
                    group.iter().map(|token| pool[*token].text.clone()).collect();
                let text = rearranger.rearrange_line(words.iter().map(String::as_str));
                pool[group[0]].alternate = Some(text);
                for token in &group[1..] {
                    pool[*token].alternate = Some(String::new());
                }
            }
        }
    }

    /// Merge column-less tokens into the nearest preceding column-assigned token,
    /// separating with a single space only when both boundary characters are
    /// identifier-like. Tokens at the start of a line with nothing to merge into
    /// keep their own leading-spacing placement.
    fn merge_unaligned(&self, pool: &mut TokenPool, tokens: &[TokenId]) {
        let mut last_assigned: Option<TokenId> = None;
        for id in tokens {
            if pool[*id].is_whitespace {
                continue;
            }
            if pool[*id].column.is_some() {
                // Tokens the rearranger emptied cannot carry merged text.
                if !pool[*id].renders_empty() {
                    last_assigned = Some(*id);
                }
                continue;
            }
            let target = match last_assigned {
                Some(target) => target,
                None => continue,
            };
            let mut merged = pool[target].render_text().to_string();
            if super::scan::needs_boundary_space(&merged, &pool[*id].text) {
                merged.push(' ');
            }
            merged.push_str(&pool[*id].text);
            pool[target].alternate = Some(merged);
            pool[*id].alternate = Some(String::new());
        }
    }

    /// Trim trailing rendering spaces on columns that disable alignment or zero-pad,
    /// so stray spaces never leak into later column widths.
    fn trim_column_alternates(&self, pool: &mut TokenPool, pass_set: &HashSet<LineId>, bias: i32) {
        for column in self.arena.ids() {
            let node = match self.arena.node(column) {
                ColumnNode::Token(node) => node,
                _ => continue,
            };
            let setting = self.settings.setting_for(&node.role);
            if setting.aligned && setting.min_spacing > 0 {
                continue;
            }
            for token in node.tokens(bias) {
                if !pass_set.contains(&pool[*token].line) {
                    continue;
                }
                let text = pool[*token].render_text();
                if text.ends_with(' ') {
                    let trimmed = text.trim_end_matches(' ').to_string();
                    pool[*token].alternate = Some(trimmed);
                }
            }
        }
    }

    /// Compute the pass-static per-column facts: initial widths, right-justification
    /// maxima, trailing-space flags, and occupancy.
    fn seed_column_state(
        &self,
        pool: &TokenPool,
        pass_set: &HashSet<LineId>,
        bias: i32,
        state: &mut PassState,
    ) {
        for column in self.arena.ids() {
            let node = match self.arena.node(column) {
                ColumnNode::Token(node) => node,
                _ => continue,
            };
            let mut width = 0u32;
            let mut rj_width = 0u32;
            let mut any = false;
            let mut all_trailing = true;
            for token in node.tokens(bias) {
                let token = &pool[*token];
                if !pass_set.contains(&token.line) || token.renders_empty() {
                    continue;
                }
                any = true;
                let w = token.render_width();
                width = width.max(w);
                if token.right_justified {
                    rj_width = rj_width.max(w);
                }
                if !token.render_text().ends_with(' ') {
                    all_trailing = false;
                }
            }
            state.width[column.0] = width;
            state.rj_width[column.0] = rj_width;
            state.trailing_space[column.0] = any && all_trailing;
            state.occupied[column.0] = any;
        }
        // Propagate occupancy to composite nodes bottom-up; ids are created after
        // their parents, so a reverse scan sees children first.
        for index in (0..self.arena.len()).rev() {
            if !state.occupied[index] {
                continue;
            }
            match self.arena.node(ColumnId(index)) {
                ColumnNode::Token(node) => {
                    state.occupied[node.parent.0] = true;
                }
                ColumnNode::Choice(node) => {
                    state.occupied[node.parent.0] = true;
                }
                ColumnNode::Sequence(node) => {
                    if let Some(parent) = node.parent {
                        state.occupied[parent.0] = true;
                    }
                }
            }
        }
    }

    /// Top-down tabstop computation over the tree, folding sibling extents left to
    /// right. Returns the subtree's layout summary.
    fn layout(
        &self,
        id: ColumnId,
        at: u32,
        has_prev: bool,
        prev_trailing: bool,
        state: &mut PassState,
    ) -> LayoutResult {
        match self.arena.node(id) {
            ColumnNode::Token(_) => {
                if !state.occupied[id.0] {
                    return LayoutResult {
                        extent: at,
                        trailing_space: prev_trailing,
                        any: false,
                    };
                }
                let setting = self.setting_of(id);
                let mut tabstop = at;
                if setting.aligned && has_prev {
                    let mut pad = setting.min_spacing;
                    if prev_trailing && pad > 0 {
                        pad -= 1;
                    }
                    tabstop = at + pad;
                }
                state.tabstop[id.0] = tabstop;
                LayoutResult {
                    extent: tabstop + state.width[id.0],
                    trailing_space: state.trailing_space[id.0],
                    any: true,
                }
            }
            ColumnNode::Sequence(node) => {
                state.tabstop[id.0] = at;
                let children = node.children.clone();
                let mut extent = at;
                let mut trailing = prev_trailing;
                let mut has_prev_local = has_prev;
                let mut any = false;
                for child in children {
                    let result = self.layout(child, extent, has_prev_local, trailing, state);
                    if result.any {
                        extent = extent.max(result.extent);
                        trailing = result.trailing_space;
                        has_prev_local = true;
                        any = true;
                    }
                }
                state.width[id.0] = extent.saturating_sub(at);
                LayoutResult {
                    extent,
                    trailing_space: trailing,
                    any,
                }
            }
            ColumnNode::Choice(node) => {
                state.tabstop[id.0] = at;
                let alternatives: Vec<ColumnId> =
                    node.alternatives.iter().map(|(_, seq)| *seq).collect();
                let mut extent = at;
                let mut trailing = true;
                let mut any = false;
                for alternative in alternatives {
                    let result = self.layout(alternative, at, has_prev, prev_trailing, state);
                    if result.any {
                        extent = extent.max(result.extent);
                        trailing = trailing && result.trailing_space;
                        any = true;
                    }
                }
                state.width[id.0] = extent.saturating_sub(at);
                LayoutResult {
                    extent,
                    trailing_space: any && trailing,
                    any,
                }
            }
        }
    }

    /// Walk each line, assign token positions from the current tabstops, and
    /// accumulate column widths. Returns whether any width changed (another layout
    /// round is needed).
    fn place_and_measure(
        &self,
        pool: &mut TokenPool,
        lines: &LinePool,
        pass_lines: &[LineId],
        state: &mut PassState,
    ) -> bool {
        let mut new_width = vec![0u32; self.arena.len()];
        for line_id in pass_lines {
            let line = &lines[*line_id];
            let indent = self.indent_columns(line);
            let mut cursor = indent;
            let mut has_prev = false;
            let mut prev_trailing = false;
            for token_id in &line.tokens {
                let (is_ws, empty) = {
                    let token = &pool[*token_id];
                    (token.is_whitespace, token.renders_empty())
                };
                if is_ws || empty {
                    continue;
                }
                let token = &pool[*token_id];
                let w = token.render_width();
                let position = match token.column {
                    Some(column) => {
                        let setting = self.setting_of(column);
                        if setting.aligned {
                            let mut p = state.tabstop[column.0];
                            if token.right_justified && state.rj_width[column.0] > w {
                                p += state.rj_width[column.0] - w;
                            }
                            // A longer token earlier on this line can overrun the
                            // shared tabstop; place after it and let the width
                            // growth push the tabstop out next round.
                            p.max(cursor)
                        } else {
                            let mut gap = setting.min_spacing;
                            if prev_trailing && gap > 0 {
                                gap -= 1;
                            }
                            if has_prev {
                                cursor + gap
                            } else {
                                cursor
                            }
                        }
                    }
                    None => cursor + token.leading_spaces,
                };
                let trailing = token.render_text().ends_with(' ');
                let column = token.column;
                pool[*token_id].position = Some(position);
                if let Some(column) = column {
                    let contribution = (position + w).saturating_sub(state.tabstop[column.0]);
                    new_width[column.0] = new_width[column.0].max(contribution);
                }
                cursor = position + w;
                prev_trailing = trailing;
                has_prev = true;
            }
        }

        let mut changed = false;
        for column in self.arena.ids() {
            if !matches!(self.arena.node(column), ColumnNode::Token(_)) {
                continue;
            }
            if state.width[column.0] != new_width[column.0] && state.occupied[column.0] {
                state.width[column.0] = new_width[column.0];
                changed = true;
            }
        }
        changed
    }
}
