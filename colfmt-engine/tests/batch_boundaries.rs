//! Batch boundary behavior observed through the session API
//!
//! Whether a batch has closed is observable through `rendered_text`: results exist
//! only for lines whose batch has been aligned. Column sharing between lines is the
//! other observable: lines in one batch share tabstops, lines in different batches
//! do not.

use rstest::rstest;

use colfmt_engine::align::testing::{
    assignment, col, column_of, declaration, feed_line, line, run_lines, unaligned, ws,
};
use colfmt_engine::{
    AlignmentSession, AlignmentSettings, ColumnRole, RoleHint, StatementRole,
};

#[test]
fn statement_role_changes_split_batches() {
    let mut settings = AlignmentSettings::default();
    settings.group_assignments_with_declarations = false;
    let results = run_lines(
        settings,
        &[
            declaration("int", "x", Some("1")),
            declaration("double", "y", Some("2")),
            assignment("z", "9"),
            declaration("char", "c", Some("3")),
        ],
    );
    let lines: Vec<&str> = results.iter().map(|r| r.rendered.as_str()).collect();
    // Three batches: {decl, decl}, {assign}, {decl}.
    assert_eq!(column_of(lines[0], "x"), Some(7));
    assert_eq!(column_of(lines[1], "y"), Some(7));
    assert_eq!(lines[2], "z = 9;\n");
    assert_eq!(column_of(lines[3], "c"), Some(5));
}

#[rstest]
#[case(true)]
#[case(false)]
fn grouping_keeps_assignments_in_declaration_batches(#[case] grouped: bool) {
    let mut settings = AlignmentSettings::default();
    settings.group_assignments_with_declarations = grouped;
    let mut session = AlignmentSession::new(settings);
    feed_line(&mut session, &declaration("int", "x", Some("1")));
    feed_line(&mut session, &assignment("x", "2"));
    // Without grouping the role change closes the declaration batch immediately.
    assert_eq!(session.rendered_text(0).is_some(), !grouped);
    session.finish();
}

#[rstest]
#[case(true, Some(4))]
#[case(false, Some(7))]
fn blank_lines_delimit_when_enabled(#[case] delimit: bool, #[case] x_column: Option<usize>) {
    let mut settings = AlignmentSettings::default();
    settings.delimit_by_blank_lines = delimit;
    let results = run_lines(
        settings,
        &[
            declaration("int", "x", Some("1")),
            line(StatementRole::Declaration, vec![ws("\n")]),
            declaration("String", "verylong", Some("2")),
        ],
    );
    let lines: Vec<&str> = results.iter().map(|r| r.rendered.as_str()).collect();
    assert_eq!(lines[1], "\n");
    assert_eq!(column_of(lines[0], "x"), x_column);
    // The wide declaration dictates shared columns only when the batch spans the blank.
    assert_eq!(column_of(lines[2], "verylong"), Some(7));
}

#[rstest]
#[case(true, Some(4))]
#[case(false, Some(7))]
fn unaligned_lines_delimit_when_enabled(#[case] delimit: bool, #[case] x_column: Option<usize>) {
    let mut settings = AlignmentSettings::default();
    settings.delimit_by_statement_type = false;
    settings.delimit_by_unaligned_lines = delimit;
    let results = run_lines(
        settings,
        &[
            declaration("int", "x", Some("1")),
            line(StatementRole::Other, vec![unaligned("???")]),
            declaration("String", "verylong", Some("2")),
        ],
    );
    let lines: Vec<&str> = results.iter().map(|r| r.rendered.as_str()).collect();
    // The unrecognized line always passes through untouched.
    assert_eq!(lines[1], "???\n");
    assert_eq!(column_of(lines[0], "x"), x_column);
}

#[test]
fn nesting_changes_always_close() {
    let mut session = AlignmentSession::new(AlignmentSettings::default());
    feed_line(&mut session, &declaration("int", "x", Some("1")));
    assert!(session.rendered_text(0).is_none());
    session.begin_nesting();
    assert_eq!(session.rendered_text(0), Some("int x = 1;\n"));
    feed_line(&mut session, &declaration("String", "verylong", Some("2")));
    let results = session.finish();
    // The nested line indents one level and aligns on its own.
    assert_eq!(results[1].rendered, "    String verylong = 2;\n");
}

#[test]
fn deeper_switch_indents_two_levels() {
    let mut settings = AlignmentSettings::default();
    settings.deeper_switch = true;
    let mut session = AlignmentSession::new(settings);
    session.begin_switch_nesting();
    feed_line(&mut session, &declaration("int", "x", Some("1")));
    let results = session.finish();
    assert_eq!(results[0].rendered, "        int x = 1;\n");
}

#[test]
fn switch_labels_close_even_without_role_delimiting() {
    let mut settings = AlignmentSettings::default();
    settings.delimit_by_statement_type = false;
    let mut session = AlignmentSession::new(settings);
    feed_line(&mut session, &declaration("int", "x", Some("1")));
    assert!(session.rendered_text(0).is_none());
    session.set_statement_role(StatementRole::SwitchLabel);
    assert!(session.rendered_text(0).is_some());
    session.finish();
}

#[test]
fn if_statements_suppress_nested_role_transitions() {
    let mut session = AlignmentSession::new(AlignmentSettings::default());
    feed_line(&mut session, &declaration("int", "x", Some("1")));
    feed_line(
        &mut session,
        &line(
            StatementRole::If,
            vec![
                col("if", ColumnRole::Keyword),
                ws(" "),
                col("ready", ColumnRole::Condition),
            ],
        ),
    );
    // The if opened a new batch (role change from the declaration).
    assert!(session.rendered_text(0).is_some());
    // A nested statement role must not close the if's batch.
    feed_line(
        &mut session,
        &line(
            StatementRole::MethodCall,
            vec![col("run", ColumnRole::MethodName)],
        ),
    );
    assert!(session.rendered_text(1).is_none());
    // The construct closes; role checking resumes.
    session.resume_role_checking();
    feed_line(&mut session, &declaration("long", "y", Some("2")));
    assert!(session.rendered_text(1).is_some());
    session.finish();
}

#[test]
fn explicit_suspension_mirrors_if_behavior() {
    let mut session = AlignmentSession::new(AlignmentSettings::default());
    feed_line(&mut session, &declaration("int", "x", Some("1")));
    session.suspend_role_checking();
    feed_line(&mut session, &assignment("y", "2"));
    feed_line(
        &mut session,
        &line(
            StatementRole::MethodCall,
            vec![col("run", ColumnRole::MethodName)],
        ),
    );
    // Nothing closed while suspended.
    assert!(session.rendered_text(0).is_none());
    session.resume_role_checking();
    session.finish();
}

#[test]
fn mid_line_boundary_freezes_the_open_line() {
    let mut session = AlignmentSession::new(AlignmentSettings::default());
    feed_line(&mut session, &declaration("int", "x", Some("1")));
    // The next line has started before the producer reports its role.
    session.push_token("y", RoleHint::Column(ColumnRole::VariableName), false);
    session.set_statement_role(StatementRole::Other);
    // Boundary detected mid-line: earlier lines aligned, the open line carried over.
    assert_eq!(session.rendered_text(0), Some("int x = 1;\n"));
    assert!(session.rendered_text(1).is_none());
    session.push_token(" ", RoleHint::Unaligned, true);
    session.push_token("=", RoleHint::Column(ColumnRole::AssignmentOperator), false);
    session.push_token(" ", RoleHint::Unaligned, true);
    session.push_token("2", RoleHint::Column(ColumnRole::Term), false);
    session.push_token(";", RoleHint::Column(ColumnRole::Semicolon), false);
    session.push_token("\n", RoleHint::Unaligned, true);
    let results = session.finish();
    assert_eq!(results[1].rendered, "y = 2;\n");
}

#[test]
fn explicit_alignment_request_closes_the_batch() {
    let mut session = AlignmentSession::new(AlignmentSettings::default());
    feed_line(&mut session, &declaration("int", "x", Some("1")));
    assert!(session.rendered_text(0).is_none());
    session.request_alignment(colfmt_engine::AlignReason::UnrecognizedConstruct);
    assert_eq!(session.rendered_text(0), Some("int x = 1;\n"));
    assert_eq!(
        session.last_close_reason(),
        Some(colfmt_engine::AlignReason::UnrecognizedConstruct)
    );
    session.finish();
}
