//! Test support: factories and assertions
//!
//! Shared helpers for exercising the engine from unit and integration tests. The
//! factories build token streams declaratively so tests read as line shapes rather
//! than push-call sequences; the assertions check rendered output by column.

pub mod assertions;
pub mod factories;

pub use assertions::{assert_same_column, column_of};
pub use factories::{
    assignment, col, declaration, feed_line, line, respec_rendered, run_lines, unaligned, ws,
    LineSpec, TokenSpec,
};
