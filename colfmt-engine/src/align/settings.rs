//! Alignment policy: per-column settings and session-wide knobs
//!
//! A [`ColumnSetting`] is immutable for the duration of one alignment pass and decides
//! whether a column aligns at all, how much padding separates it from the previous
//! column, whether that padding may be rendered as tab characters, and (for the
//! modifier column only) whether its tokens may be reordered.
//!
//! [`AlignmentSettings`] carries the session-wide surface: tab geometry, batch
//! delimiting policy, right-justification, and the role-to-setting table. Roles
//! without an explicit entry fall back to the built-in defaults table.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::role::ColumnRole;

/// Per-column alignment policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ColumnSetting {
    /// Whether tokens of this column share a cross-line tabstop at all.
    pub aligned: bool,
    /// Minimum character padding between this column and the previous one.
    pub min_spacing: u32,
    /// Whether padding before this column may use tab characters.
    pub allow_tabs: bool,
    /// Whether tokens of this column may be reordered (modifier columns only).
    pub rearrange: bool,
}

impl Default for ColumnSetting {
    fn default() -> Self {
        Self {
            aligned: true,
            min_spacing: 1,
            allow_tabs: true,
            rearrange: false,
        }
    }
}

impl ColumnSetting {
    /// A column excluded from cross-line alignment.
    pub fn unaligned() -> Self {
        Self {
            aligned: false,
            ..Self::default()
        }
    }

    /// A column rendered immediately after the previous token on its own line:
    /// not aligned, no padding. The default for trailing punctuation.
    pub fn attached() -> Self {
        Self {
            aligned: false,
            min_spacing: 0,
            ..Self::default()
        }
    }
}

/// Built-in per-role defaults, consulted when the settings table has no entry.
static DEFAULT_COLUMNS: Lazy<HashMap<&'static str, ColumnSetting>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert(
        "modifiers",
        ColumnSetting {
            rearrange: true,
            ..ColumnSetting::default()
        },
    );
    // Punctuation hugs the token it terminates.
    table.insert("semicolon", ColumnSetting::attached());
    table.insert("comma", ColumnSetting::attached());
    table.insert("open-paren", ColumnSetting::attached());
    table.insert("close-paren", ColumnSetting::attached());
    table
});

/// Session-wide alignment settings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AlignmentSettings {
    /// Rendered width of a tab character.
    pub tab_size: u32,
    /// Characters per brace-nesting level.
    pub indent_width: u32,
    /// Whether padding is rendered with tab characters at all.
    pub use_tab_char: bool,
    /// Restrict tab substitution to the leading-indentation run.
    pub smart_tabs: bool,
    /// Right-justify numeric literals within their column.
    pub right_justify_numbers: bool,
    /// A blank line closes the current batch.
    pub delimit_by_blank_lines: bool,
    /// A change of statement role closes the current batch.
    pub delimit_by_statement_type: bool,
    /// A line with zero aligned tokens closes the current batch.
    pub delimit_by_unaligned_lines: bool,
    /// Assignments directly following declarations stay in the declaration batch.
    pub group_assignments_with_declarations: bool,
    /// Switch bodies indent two levels instead of one.
    pub deeper_switch: bool,
    /// Leading characters two method calls must share to use one column family.
    pub method_call_similarity: usize,
    /// Per-role overrides of the built-in column defaults, keyed by
    /// [`ColumnRole::config_key`] so the table round-trips through config files.
    pub columns: HashMap<String, ColumnSetting>,
}

impl Default for AlignmentSettings {
    fn default() -> Self {
        Self {
            tab_size: 4,
            indent_width: 4,
            use_tab_char: false,
            smart_tabs: false,
            right_justify_numbers: true,
            delimit_by_blank_lines: true,
            delimit_by_statement_type: true,
            delimit_by_unaligned_lines: true,
            group_assignments_with_declarations: true,
            deeper_switch: false,
            method_call_similarity: 3,
            columns: HashMap::new(),
        }
    }
}

impl AlignmentSettings {
    /// Resolve the effective setting for a column role.
    pub fn setting_for(&self, role: &ColumnRole) -> ColumnSetting {
        if let Some(setting) = self.columns.get(role.config_key()) {
            return *setting;
        }
        DEFAULT_COLUMNS
            .get(role.config_key())
            .copied()
            .unwrap_or_default()
    }

    /// Override the setting for a single role.
    pub fn set_column(&mut self, role: ColumnRole, setting: ColumnSetting) -> &mut Self {
        self.columns.insert(role.config_key().to_string(), setting);
        self
    }
}
