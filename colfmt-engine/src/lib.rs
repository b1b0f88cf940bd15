//! # colfmt-engine
//!
//! A tabular alignment engine: given a stream of classified tokens grouped into source
//! lines, it computes a horizontal position for every token so that tokens playing the
//! same syntactic role on different lines line up vertically, and renders the result as
//! text (optionally using tab characters).
//!
//! The engine is language-agnostic. A language-specific token producer classifies each
//! lexical unit and pushes it through the [`align::AlignmentSession`] API; the host
//! integration consumes the rendered lines afterwards. See the [align] module for the
//! component walkthrough.

pub mod align;

pub use align::{
    AlignReason, AlignedLine, AlignmentSession, AlignmentSettings, ColumnRole, ColumnSetting,
    RoleHint, SequenceRole, StatementRole, TokenHandle,
};
