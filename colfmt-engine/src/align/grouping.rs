//! Batch boundaries
//!
//!     Lines are aligned in batches: consecutive lines that should share columns. The
//!     group manager buffers completed lines and decides when the batch closes, applying
//!     the rules in order:
//!
//!         1. An `if`/`while` statement suppresses role-transition checks for everything
//!            nested inside it (its condition and single-statement body count as part of
//!            the same line for role purposes) until the construct closes.
//!         2. A statement-role change closes the batch before the current line, unless
//!            the pair is exempt (assignment directly following a declaration, when
//!            grouping them is enabled).
//!         3. A blank line, or a line with zero aligned tokens, closes the batch when the
//!            corresponding setting is enabled.
//!         4. Structural events (nesting changes, switch labels) always close the batch.

use super::line::LineId;
use super::role::StatementRole;
use super::settings::AlignmentSettings;

/// Why a batch was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignReason {
    /// The statement role changed between lines.
    StatementChange,
    BlankLine,
    /// A line with no aligned token arrived.
    UnalignedLine,
    /// Opening or closing brace.
    NestingChange,
    SwitchLabel,
    /// The producer hit a construct it cannot classify.
    UnrecognizedConstruct,
    EndOfInput,
    /// Host-requested alignment.
    Explicit,
}

/// Buffers completed lines and applies the batch-boundary rules.
#[derive(Debug, Default)]
pub struct LineGroupManager {
    open: Vec<LineId>,
    last_role: Option<StatementRole>,
    suppress_depth: u32,
}

impl LineGroupManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply rule 1, 2 and 4 to a newly reported statement role. Returns the close
    /// reason when the batch must close before the line carrying this role.
    pub fn note_statement_role(
        &mut self,
        role: StatementRole,
        settings: &AlignmentSettings,
    ) -> Option<AlignReason> {
        if role == StatementRole::SwitchLabel {
            self.suppress_depth = 0;
            self.last_role = Some(role);
            return Some(AlignReason::SwitchLabel);
        }
        if self.suppress_depth > 0 {
            // Nested inside an if/while: roles neither close nor update history.
            if role.suppresses_role_checks() {
                self.suppress_depth += 1;
            }
            return None;
        }
        let close = if settings.delimit_by_statement_type {
            match self.last_role {
                Some(previous) if previous != role && !exempt_pair(previous, role, settings) => {
                    Some(AlignReason::StatementChange)
                }
                _ => None,
            }
        } else {
            None
        };
        self.last_role = Some(role);
        if role.suppresses_role_checks() {
            self.suppress_depth += 1;
        }
        close
    }

    /// Rule 1: the producer entered a region (single-statement body) that must not
    /// trigger batch closes.
    pub fn suspend_role_checking(&mut self) {
        self.suppress_depth += 1;
    }

    pub fn resume_role_checking(&mut self) {
        self.suppress_depth = self.suppress_depth.saturating_sub(1);
    }

    /// Rule 4: a structural event always closes the batch and ends any suppression.
    pub fn note_structural(&mut self) -> AlignReason {
        self.suppress_depth = 0;
        AlignReason::NestingChange
    }

    /// Record a completed line and apply rule 3.
    pub fn note_line_complete(
        &mut self,
        id: LineId,
        blank: bool,
        entirely_unaligned: bool,
        settings: &AlignmentSettings,
    ) -> Option<AlignReason> {
        self.open.push(id);
        if blank && settings.delimit_by_blank_lines {
            return Some(AlignReason::BlankLine);
        }
        if entirely_unaligned && !blank && settings.delimit_by_unaligned_lines {
            return Some(AlignReason::UnalignedLine);
        }
        None
    }

    /// Take the buffered batch, leaving the manager ready for the next one.
    pub fn take_batch(&mut self) -> Vec<LineId> {
        std::mem::take(&mut self.open)
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn last_role(&self) -> Option<StatementRole> {
        self.last_role
    }
}

fn exempt_pair(
    previous: StatementRole,
    next: StatementRole,
    settings: &AlignmentSettings,
) -> bool {
    settings.group_assignments_with_declarations
        && previous == StatementRole::Declaration
        && next == StatementRole::Assignment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AlignmentSettings {
        AlignmentSettings::default()
    }

    #[test]
    fn test_same_role_keeps_batch_open() {
        let mut manager = LineGroupManager::new();
        let s = settings();
        assert_eq!(manager.note_statement_role(StatementRole::Declaration, &s), None);
        assert_eq!(manager.note_statement_role(StatementRole::Declaration, &s), None);
    }

    #[test]
    fn test_role_change_closes_batch() {
        let mut manager = LineGroupManager::new();
        let mut s = settings();
        s.group_assignments_with_declarations = false;
        assert_eq!(manager.note_statement_role(StatementRole::Declaration, &s), None);
        assert_eq!(
            manager.note_statement_role(StatementRole::Assignment, &s),
            Some(AlignReason::StatementChange)
        );
        assert_eq!(
            manager.note_statement_role(StatementRole::Declaration, &s),
            Some(AlignReason::StatementChange)
        );
    }

    #[test]
    fn test_assignment_after_declaration_exemption() {
        let mut manager = LineGroupManager::new();
        let s = settings();
        assert_eq!(manager.note_statement_role(StatementRole::Declaration, &s), None);
        assert_eq!(manager.note_statement_role(StatementRole::Assignment, &s), None);
        // The exemption is one-directional.
        assert_eq!(
            manager.note_statement_role(StatementRole::Declaration, &s),
            Some(AlignReason::StatementChange)
        );
    }

    #[test]
    fn test_delimit_disabled_never_closes_on_roles() {
        let mut manager = LineGroupManager::new();
        let mut s = settings();
        s.delimit_by_statement_type = false;
        assert_eq!(manager.note_statement_role(StatementRole::Declaration, &s), None);
        assert_eq!(manager.note_statement_role(StatementRole::MethodCall, &s), None);
    }

    #[test]
    fn test_if_suppresses_nested_roles() {
        let mut manager = LineGroupManager::new();
        let s = settings();
        assert_eq!(manager.note_statement_role(StatementRole::If, &s), None);
        // The single-statement body would otherwise close the batch.
        assert_eq!(manager.note_statement_role(StatementRole::MethodCall, &s), None);
        manager.resume_role_checking();
        assert_eq!(
            manager.note_statement_role(StatementRole::Declaration, &s),
            Some(AlignReason::StatementChange)
        );
    }

    #[test]
    fn test_nested_if_while_stack() {
        let mut manager = LineGroupManager::new();
        let s = settings();
        manager.note_statement_role(StatementRole::If, &s);
        manager.note_statement_role(StatementRole::While, &s);
        manager.resume_role_checking();
        // Still inside the outer if.
        assert_eq!(manager.note_statement_role(StatementRole::Assignment, &s), None);
        manager.resume_role_checking();
        assert_eq!(
            manager.note_statement_role(StatementRole::Assignment, &s),
            Some(AlignReason::StatementChange)
        );
    }

    #[test]
    fn test_structural_event_clears_suppression() {
        let mut manager = LineGroupManager::new();
        let s = settings();
        manager.note_statement_role(StatementRole::If, &s);
        assert_eq!(manager.note_structural(), AlignReason::NestingChange);
        assert_eq!(
            manager.note_statement_role(StatementRole::Declaration, &s),
            Some(AlignReason::StatementChange)
        );
    }

    #[test]
    fn test_switch_label_always_closes() {
        let mut manager = LineGroupManager::new();
        let mut s = settings();
        s.delimit_by_statement_type = false;
        manager.note_statement_role(StatementRole::Assignment, &s);
        assert_eq!(
            manager.note_statement_role(StatementRole::SwitchLabel, &s),
            Some(AlignReason::SwitchLabel)
        );
    }

    #[test]
    fn test_blank_line_closes_when_enabled() {
        let mut manager = LineGroupManager::new();
        let s = settings();
        assert_eq!(
            manager.note_line_complete(LineId(0), true, false, &s),
            Some(AlignReason::BlankLine)
        );
        let mut quiet = settings();
        quiet.delimit_by_blank_lines = false;
        let mut manager = LineGroupManager::new();
        assert_eq!(manager.note_line_complete(LineId(0), true, false, &quiet), None);
    }

    #[test]
    fn test_unaligned_line_closes_when_enabled() {
        let mut manager = LineGroupManager::new();
        let s = settings();
        assert_eq!(
            manager.note_line_complete(LineId(0), false, true, &s),
            Some(AlignReason::UnalignedLine)
        );
    }

    #[test]
    fn test_take_batch_drains_buffer() {
        let mut manager = LineGroupManager::new();
        let s = settings();
        manager.note_line_complete(LineId(0), false, false, &s);
        manager.note_line_complete(LineId(1), false, false, &s);
        assert_eq!(manager.take_batch(), vec![LineId(0), LineId(1)]);
        assert!(manager.is_empty());
    }
}
