//! Token-stream documents
//!
//! The CLI consumes a JSON document describing classified tokens grouped into lines,
//! the same stream a language-specific tokenizer would push programmatically. Each
//! line carries its statement role, absolute indent level, and continuation bias;
//! each token carries its text, an optional column role, and a whitespace flag.
//!
//! ```json
//! { "lines": [
//!     { "statement": "declaration", "tokens": [
//!         { "text": "int",  "role": "type-name" },
//!         { "text": " ",    "ws": true },
//!         { "text": "x",    "role": "variable-name" },
//!         { "text": ";",    "role": "semicolon" } ] } ] }
//! ```

use serde::{Deserialize, Serialize};

use colfmt_engine::{
    AlignedLine, AlignmentSession, AlignmentSettings, ColumnRole, RoleHint, StatementRole,
};

/// Column roles as they appear in documents. Method-call tokens are interned into a
/// column family by the session, so the document names the role without an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleName {
    Modifiers,
    TypeName,
    VariableName,
    AssignmentOperator,
    Term,
    Operator,
    MethodName,
    MethodCall,
    OpenParen,
    Argument,
    Comma,
    CloseParen,
    Semicolon,
    Keyword,
    Condition,
    TrailingComment,
}

/// One classified token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRecord {
    pub text: String,
    #[serde(default)]
    pub role: Option<RoleName>,
    #[serde(default)]
    pub ws: bool,
}

/// One source line of the document.
#[derive(Debug, Clone, Deserialize)]
pub struct LineRecord {
    #[serde(default)]
    pub statement: Option<StatementRole>,
    /// Absolute brace-nesting level of the line.
    #[serde(default)]
    pub indent: u32,
    /// Continuation bucket for wrapped sub-lines.
    #[serde(default)]
    pub bias: i32,
    #[serde(default)]
    pub tokens: Vec<TokenRecord>,
}

/// A whole token-stream document.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub lines: Vec<LineRecord>,
}

/// One aligned line as emitted by `--format json`.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedLine {
    pub original: String,
    pub rendered: String,
    pub changed: bool,
}

impl Document {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Drive a fresh session over the document and collect the aligned lines.
    /// Indent-level differences between consecutive lines become nesting events.
    pub fn align(&self, settings: AlignmentSettings) -> Vec<AlignedLine> {
        let mut session = AlignmentSession::new(settings);
        let mut indent = 0u32;
        for line in &self.lines {
            while indent < line.indent {
                session.begin_nesting();
                indent += 1;
            }
            while indent > line.indent {
                session.end_nesting();
                indent -= 1;
            }
            if let Some(statement) = line.statement {
                session.set_statement_role(statement);
            }
            if line.bias != 0 {
                session.set_indent_bias(line.bias);
            }
            let mut ended = false;
            for token in &line.tokens {
                if token.ws {
                    session.push_token(&token.text, RoleHint::Unaligned, true);
                    ended = token.text.contains('\n');
                    continue;
                }
                let hint = match token.role {
                    None => RoleHint::Unaligned,
                    Some(RoleName::MethodCall) => {
                        RoleHint::Column(session.method_call_role(&token.text))
                    }
                    Some(name) => RoleHint::Column(column_role(name)),
                };
                session.push_token(&token.text, hint, false);
                ended = false;
            }
            if !ended {
                session.push_token("\n", RoleHint::Unaligned, true);
            }
        }
        session.finish()
    }
}

/// The engine role for a document role name. `MethodCall` is interned through the
/// session instead and never reaches this table.
fn column_role(name: RoleName) -> ColumnRole {
    match name {
        RoleName::Modifiers => ColumnRole::Modifiers,
        RoleName::TypeName => ColumnRole::TypeName,
        RoleName::VariableName => ColumnRole::VariableName,
        RoleName::AssignmentOperator => ColumnRole::AssignmentOperator,
        RoleName::Term => ColumnRole::Term,
        RoleName::Operator => ColumnRole::Operator,
        RoleName::MethodName => ColumnRole::MethodName,
        RoleName::MethodCall => ColumnRole::MethodName,
        RoleName::OpenParen => ColumnRole::OpenParen,
        RoleName::Argument => ColumnRole::Argument,
        RoleName::Comma => ColumnRole::Comma,
        RoleName::CloseParen => ColumnRole::CloseParen,
        RoleName::Semicolon => ColumnRole::Semicolon,
        RoleName::Keyword => ColumnRole::Keyword,
        RoleName::Condition => ColumnRole::Condition,
        RoleName::TrailingComment => ColumnRole::TrailingComment,
    }
}

/// Concatenated rendered text of the whole document.
pub fn to_text(results: &[AlignedLine]) -> String {
    results.iter().map(|line| line.rendered.as_str()).collect()
}

/// Per-line JSON output with change tracking.
pub fn to_json(results: &[AlignedLine]) -> Result<String, serde_json::Error> {
    let lines: Vec<RenderedLine> = results
        .iter()
        .map(|line| RenderedLine {
            original: line.original.clone(),
            rendered: line.rendered.clone(),
            changed: line.changed,
        })
        .collect();
    serde_json::to_string_pretty(&lines)
}
