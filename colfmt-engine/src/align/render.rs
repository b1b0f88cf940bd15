//! Rendering aligned lines to text
//!
//! The renderer turns computed tabstops back into literal text. Tokens are emitted in
//! line order; the gap up to each token's position is padded with spaces, or with tab
//! characters up to the configured tab size when tab rendering is enabled for the
//! token's column. "Smart tabs" restricts tab substitution to the leading-indentation
//! run, keeping interior alignment spacing as literal spaces so the text survives a
//! different tab-size setting.
//!
//! Overshoot is handled by smart truncation: already-emitted trailing spaces are
//! dropped down to the target tabstop, but never non-space characters, so a token that
//! genuinely cannot reach its tabstop lands immediately after its predecessor.

use super::line::Line;
use super::settings::AlignmentSettings;
use super::token::TokenPool;
use super::tree::{ColumnArena, ColumnNode};

/// Renders one aligned line at a time.
pub struct LineRenderer<'a> {
    settings: &'a AlignmentSettings,
    arena: &'a ColumnArena,
}

impl<'a> LineRenderer<'a> {
    pub fn new(settings: &'a AlignmentSettings, arena: &'a ColumnArena) -> Self {
        Self { settings, arena }
    }

    /// Render a line whose tokens carry computed positions.
    pub fn render(&self, line: &Line, pool: &TokenPool) -> String {
        let mut out = String::new();
        let mut cursor: u32 = 0;
        let mut leading = true;
        for id in &line.tokens {
            let token = &pool[*id];
            if token.is_whitespace {
                if token.has_line_break() {
                    trim_trailing_spaces(&mut out);
                    for c in token.text.chars() {
                        if c == '\r' || c == '\n' {
                            out.push(c);
                        }
                    }
                    cursor = 0;
                    leading = true;
                }
                continue;
            }
            if token.renders_empty() {
                continue;
            }
            let target = token.position.unwrap_or(cursor);
            let allow_tabs = match token.column {
                Some(column) => match self.arena.node(column) {
                    ColumnNode::Token(node) => {
                        self.settings.setting_for(&node.role).allow_tabs
                    }
                    _ => true,
                },
                None => true,
            };
            self.pad_to(&mut out, &mut cursor, target, allow_tabs, leading);
            out.push_str(token.render_text());
            cursor += token.render_width();
            leading = false;
        }
        if !out.ends_with('\n') {
            trim_trailing_spaces(&mut out);
        }
        out
    }

    /// Pad from the current column to `target`, dropping overshooting trailing
    /// spaces first.
    fn pad_to(&self, out: &mut String, cursor: &mut u32, target: u32, allow_tabs: bool, leading: bool) {
        while *cursor > target && out.ends_with(' ') {
            out.pop();
            *cursor -= 1;
        }
        let tab_size = self.settings.tab_size;
        let tabs_ok = self.settings.use_tab_char
            && allow_tabs
            && tab_size > 0
            && (!self.settings.smart_tabs || leading);
        if tabs_ok {
            loop {
                let next = (*cursor / tab_size + 1) * tab_size;
                if next > target {
                    break;
                }
                out.push('\t');
                *cursor = next;
            }
        }
        while *cursor < target {
            out.push(' ');
            *cursor += 1;
        }
    }
}

fn trim_trailing_spaces(out: &mut String) {
    while out.ends_with(' ') || out.ends_with('\t') {
        out.pop();
    }
}

/// Expand tab characters to spaces at the given tab size. Mirror of the padding
/// logic, used by tests and token-dump tooling.
pub fn expand_tabs(text: &str, tab_size: u32) -> String {
    let mut out = String::new();
    let mut column = 0u32;
    for c in text.chars() {
        match c {
            '\t' => {
                let next = if tab_size > 0 {
                    (column / tab_size + 1) * tab_size
                } else {
                    column
                };
                while column < next {
                    out.push(' ');
                    column += 1;
                }
            }
            '\n' => {
                out.push('\n');
                column = 0;
            }
            other => {
                out.push(other);
                column += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::line::{Line, LineId};
    use crate::align::token::{Token, TokenPool};

    fn positioned(text: &str, position: u32) -> Token {
        Token {
            text: text.to_string(),
            alternate: None,
            is_whitespace: false,
            right_justified: false,
            line: LineId(0),
            column: None,
            position: Some(position),
            leading_spaces: 0,
        }
    }

    fn break_token() -> Token {
        Token {
            text: "\n".to_string(),
            alternate: None,
            is_whitespace: true,
            right_justified: false,
            line: LineId(0),
            column: None,
            position: None,
            leading_spaces: 0,
        }
    }

    fn render_line(settings: &AlignmentSettings, tokens: Vec<Token>) -> String {
        let arena = ColumnArena::new();
        let mut pool = TokenPool::new();
        let mut line = Line::new(0, 0);
        for token in tokens {
            let id = pool.insert(token);
            let snapshot = pool[id].clone();
            line.push(id, &snapshot);
        }
        LineRenderer::new(settings, &arena).render(&line, &pool)
    }

    #[test]
    fn test_space_padding_to_positions() {
        let settings = AlignmentSettings::default();
        let rendered = render_line(
            &settings,
            vec![positioned("int", 0), positioned("x", 7), positioned(";", 8)],
        );
        assert_eq!(rendered, "int    x;");
    }

    #[test]
    fn test_tab_padding_reaches_same_columns() {
        let mut settings = AlignmentSettings::default();
        settings.use_tab_char = true;
        settings.tab_size = 4;
        let rendered = render_line(&settings, vec![positioned("int", 0), positioned("x", 8)]);
        assert_eq!(rendered, "int\t\tx");
        assert_eq!(expand_tabs(&rendered, 4), "int     x");
    }

    #[test]
    fn test_smart_tabs_keep_interior_spaces() {
        let mut settings = AlignmentSettings::default();
        settings.use_tab_char = true;
        settings.smart_tabs = true;
        settings.tab_size = 4;
        let rendered = render_line(&settings, vec![positioned("int", 4), positioned("x", 12)]);
        // Leading run may tab, interior padding may not.
        assert_eq!(rendered, "\tint     x");
    }

    #[test]
    fn test_line_break_trims_trailing_spaces() {
        let settings = AlignmentSettings::default();
        let mut tokens = vec![positioned("x", 0)];
        tokens.push({
            let mut t = positioned(" ", 0);
            t.is_whitespace = true;
            t.text = "   ".to_string();
            t.position = None;
            t
        });
        tokens.push(break_token());
        let rendered = render_line(&settings, tokens);
        assert_eq!(rendered, "x\n");
    }

    #[test]
    fn test_overshoot_drops_trailing_spaces_only() {
        let settings = AlignmentSettings::default();
        // Second token's position is before the end of the padding emitted for it;
        // the renderer backs up over spaces but never over text.
        let rendered = render_line(&settings, vec![positioned("toolong", 0), positioned(";", 3)]);
        assert_eq!(rendered, "toolong;");
    }

    #[test]
    fn test_expand_tabs_counts_columns() {
        assert_eq!(expand_tabs("\tx", 4), "    x");
        assert_eq!(expand_tabs("ab\tx", 4), "ab  x");
        assert_eq!(expand_tabs("ab\n\tx", 4), "ab\n    x");
    }
}
