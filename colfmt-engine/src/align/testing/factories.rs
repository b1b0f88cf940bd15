//! Factories for building token streams in tests

use crate::align::role::{ColumnRole, StatementRole};
use crate::align::session::{AlignedLine, AlignmentSession, RoleHint};
use crate::align::settings::AlignmentSettings;

/// One token of a test line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSpec {
    Column { text: String, role: ColumnRole },
    Unaligned { text: String },
    Ws { text: String },
}

/// A token assigned to a column.
pub fn col(text: &str, role: ColumnRole) -> TokenSpec {
    TokenSpec::Column {
        text: text.to_string(),
        role,
    }
}

/// A token with no recognized column.
pub fn unaligned(text: &str) -> TokenSpec {
    TokenSpec::Unaligned {
        text: text.to_string(),
    }
}

/// A whitespace token.
pub fn ws(text: &str) -> TokenSpec {
    TokenSpec::Ws {
        text: text.to_string(),
    }
}

/// One test line: a statement role, a continuation bucket, and its tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpec {
    pub statement: StatementRole,
    pub bias: i32,
    pub tokens: Vec<TokenSpec>,
}

/// A line with the given statement role and tokens.
pub fn line(statement: StatementRole, tokens: Vec<TokenSpec>) -> LineSpec {
    LineSpec {
        statement,
        bias: 0,
        tokens,
    }
}

/// A declaration line: `<ty> <name> [= <value>];`
pub fn declaration(ty: &str, name: &str, value: Option<&str>) -> LineSpec {
    let mut tokens = vec![
        col(ty, ColumnRole::TypeName),
        ws(" "),
        col(name, ColumnRole::VariableName),
    ];
    if let Some(value) = value {
        tokens.push(ws(" "));
        tokens.push(col("=", ColumnRole::AssignmentOperator));
        tokens.push(ws(" "));
        tokens.push(col(value, ColumnRole::Term));
    }
    tokens.push(col(";", ColumnRole::Semicolon));
    line(StatementRole::Declaration, tokens)
}

/// An assignment line: `<name> = <value>;`
pub fn assignment(name: &str, value: &str) -> LineSpec {
    line(
        StatementRole::Assignment,
        vec![
            col(name, ColumnRole::VariableName),
            ws(" "),
            col("=", ColumnRole::AssignmentOperator),
            ws(" "),
            col(value, ColumnRole::Term),
            col(";", ColumnRole::Semicolon),
        ],
    )
}

/// Push one line spec into a session, terminating it with a line break if the
/// spec does not end in one.
pub fn feed_line(session: &mut AlignmentSession, spec: &LineSpec) {
    session.set_statement_role(spec.statement);
    if spec.bias != 0 {
        session.set_indent_bias(spec.bias);
    }
    let mut ended = false;
    for token in &spec.tokens {
        match token {
            TokenSpec::Column { text, role } => {
                session.push_token(text, RoleHint::Column(*role), false);
            }
            TokenSpec::Unaligned { text } => {
                session.push_token(text, RoleHint::Unaligned, false);
            }
            TokenSpec::Ws { text } => {
                session.push_token(text, RoleHint::Unaligned, true);
                ended = text.contains('\n');
            }
        }
    }
    if !ended {
        session.push_token("\n", RoleHint::Unaligned, true);
    }
}

/// Run a whole input through a fresh session and collect the results.
pub fn run_lines(settings: AlignmentSettings, specs: &[LineSpec]) -> Vec<AlignedLine> {
    let mut session = AlignmentSession::new(settings);
    for spec in specs {
        feed_line(&mut session, spec);
    }
    session.finish()
}

/// Rebuild a line spec from rendered output, as a re-tokenizing producer would:
/// the same tokens in the same order, with the rendered gaps as whitespace.
///
/// Returns `None` when the rendered text does not contain the spec's tokens in
/// order (merged or rearranged tokens), in which case a round-trip comparison is
/// not meaningful.
pub fn respec_rendered(rendered: &str, spec: &LineSpec) -> Option<LineSpec> {
    let text = rendered.trim_end_matches('\n');
    let mut tokens = Vec::new();
    let mut rest = text;
    for token in &spec.tokens {
        let needle = match token {
            TokenSpec::Column { text, .. } => text.as_str(),
            TokenSpec::Unaligned { text } => text.as_str(),
            TokenSpec::Ws { .. } => continue,
        };
        let found = rest.find(needle)?;
        if !rest[..found].chars().all(|c| c == ' ' || c == '\t') {
            return None;
        }
        if found > 0 {
            tokens.push(ws(&rest[..found]));
        }
        match token {
            TokenSpec::Column { role, .. } => tokens.push(col(needle, *role)),
            TokenSpec::Unaligned { .. } => tokens.push(unaligned(needle)),
            TokenSpec::Ws { .. } => unreachable!(),
        }
        rest = &rest[found + needle.len()..];
    }
    if !rest.chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }
    Some(LineSpec {
        statement: spec.statement,
        bias: spec.bias,
        tokens,
    })
}
