//! Role tags for tokens, columns, and statements
//!
//!     Roles name the syntactic purpose of a thing: a token plays a column role ("variable
//!     name", "assignment operator"), a nested sub-sequence plays a sequence role ("argument
//!     list", "control flow clause"), and a whole line carries a statement role used for batch
//!     delimiting. All three families are closed enums compared by value.
//!
//!     The one role that genuinely needs runtime-created identity is the method-call family:
//!     calls whose leading characters match beyond a configurable threshold share a column
//!     family so that e.g. `log.debug(...)` and `log.trace(...)` align with each other but not
//!     with `assertEquals(...)`. The [`SimilarityInterner`] hands out stable small-integer ids
//!     for those families; the id is embedded in [`ColumnRole::MethodCall`].

use std::fmt;

/// Identity of a method-call column family, produced by [`SimilarityInterner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SimilarityId(pub u32);

/// The column a token belongs to inside its statement sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnRole {
    /// Discriminant of the root choice selecting the statement shape of a line.
    Statement,
    /// Modifier keywords (`public`, `static`, ...); the only rearrangeable column.
    Modifiers,
    /// Declared type of a variable, field, or method.
    TypeName,
    /// Variable or field name.
    VariableName,
    /// `=` and compound assignment operators.
    AssignmentOperator,
    /// Right-hand side expression term.
    Term,
    /// Infix operator between terms.
    Operator,
    /// Name part of a method or call target.
    MethodName,
    /// Method-call column family keyed by shared leading characters.
    MethodCall(SimilarityId),
    OpenParen,
    /// Argument expression inside a call or parameter list.
    Argument,
    Comma,
    CloseParen,
    Semicolon,
    /// Leading keyword of a control-flow statement (`if`, `while`, `return`).
    Keyword,
    /// Condition expression of a control-flow statement.
    Condition,
    /// End-of-line comment.
    TrailingComment,
}

impl ColumnRole {
    /// Stable key used by configuration tables. Method-call families share one key;
    /// their per-family identity only matters for column assignment, not for settings.
    pub fn config_key(&self) -> &'static str {
        match self {
            ColumnRole::Statement => "statement",
            ColumnRole::Modifiers => "modifiers",
            ColumnRole::TypeName => "type-name",
            ColumnRole::VariableName => "variable-name",
            ColumnRole::AssignmentOperator => "assignment-operator",
            ColumnRole::Term => "term",
            ColumnRole::Operator => "operator",
            ColumnRole::MethodName => "method-name",
            ColumnRole::MethodCall(_) => "method-call",
            ColumnRole::OpenParen => "open-paren",
            ColumnRole::Argument => "argument",
            ColumnRole::Comma => "comma",
            ColumnRole::CloseParen => "close-paren",
            ColumnRole::Semicolon => "semicolon",
            ColumnRole::Keyword => "keyword",
            ColumnRole::Condition => "condition",
            ColumnRole::TrailingComment => "trailing-comment",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::MethodCall(id) => write!(f, "method-call#{}", id.0),
            other => write!(f, "{}", other.config_key()),
        }
    }
}

/// The role of a nested sub-sequence: either a statement shape selected by the root
/// choice, or an alternative under a nested choice (e.g. the right-hand side of `=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequenceRole {
    Declaration,
    Assignment,
    MethodCall,
    ControlFlow,
    Expression,
    ArgumentList,
    Other,
}

impl fmt::Display for SequenceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SequenceRole::Declaration => "declaration",
            SequenceRole::Assignment => "assignment",
            SequenceRole::MethodCall => "method-call",
            SequenceRole::ControlFlow => "control-flow",
            SequenceRole::Expression => "expression",
            SequenceRole::ArgumentList => "argument-list",
            SequenceRole::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Coarse statement classification reported by the token producer, used by the
/// line group manager to decide batch boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatementRole {
    Declaration,
    Assignment,
    MethodCall,
    If,
    While,
    For,
    Return,
    /// `case`/`default` labels; always a structural batch boundary.
    SwitchLabel,
    Other,
    Unknown,
}

impl StatementRole {
    /// The root-choice alternative that lines of this statement role flow into.
    pub fn sequence_role(self) -> SequenceRole {
        match self {
            StatementRole::Declaration => SequenceRole::Declaration,
            StatementRole::Assignment => SequenceRole::Assignment,
            StatementRole::MethodCall => SequenceRole::MethodCall,
            StatementRole::If | StatementRole::While | StatementRole::For => {
                SequenceRole::ControlFlow
            }
            StatementRole::Return
            | StatementRole::SwitchLabel
            | StatementRole::Other
            | StatementRole::Unknown => SequenceRole::Other,
        }
    }

    /// Whether this role suppresses role-transition batch checks for statements
    /// nested inside it (condition and single-statement body of `if`/`while`).
    pub fn suppresses_role_checks(self) -> bool {
        matches!(self, StatementRole::If | StatementRole::While)
    }
}

impl fmt::Display for StatementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementRole::Declaration => "declaration",
            StatementRole::Assignment => "assignment",
            StatementRole::MethodCall => "method-call",
            StatementRole::If => "if",
            StatementRole::While => "while",
            StatementRole::For => "for",
            StatementRole::Return => "return",
            StatementRole::SwitchLabel => "switch-label",
            StatementRole::Other => "other",
            StatementRole::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Interner for method-call column families.
///
/// Two call names land in the same family when their common leading characters reach
/// the configured threshold. The stored family prefix shrinks to the common prefix as
/// members are added, so the family is keyed by what its members actually share.
#[derive(Debug, Clone)]
pub struct SimilarityInterner {
    threshold: usize,
    families: Vec<String>,
}

impl SimilarityInterner {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            families: Vec::new(),
        }
    }

    /// Find or create the family for a call name.
    pub fn intern(&mut self, name: &str) -> SimilarityId {
        for (index, family) in self.families.iter_mut().enumerate() {
            let common = common_prefix_len(family, name);
            if common >= self.threshold {
                if common < family.len() {
                    family.truncate(common);
                }
                return SimilarityId(index as u32);
            }
        }
        self.families.push(name.to_string());
        SimilarityId(self.families.len() as u32 - 1)
    }

    /// The shared prefix currently keying a family, if the id is known.
    pub fn family_prefix(&self, id: SimilarityId) -> Option<&str> {
        self.families.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// Length in characters of the common prefix of two strings.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count()
}
