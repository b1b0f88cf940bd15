//! Tabular alignment
//!
//!     This module is the whole engine: classified tokens arrive one at a time, grouped
//!     into source lines, and come back out as text in which tokens playing the same
//!     syntactic role line up vertically.
//!
//!     The pipeline, in the order data flows through it:
//!
//!         1. The token producer pushes tokens with role hints into an
//!            [`AlignmentSession`](session::AlignmentSession). See [session].
//!         2. The session grows the column tree (sequences, choices, token columns)
//!            lazily and reuses columns across lines, so ten field declarations in a
//!            row accumulate into the same columns. See [tree].
//!         3. The line group manager buffers completed lines and watches for batch
//!            boundaries: statement-role changes, blank lines, unaligned lines, and
//!            structural events. See [grouping].
//!         4. When a batch closes, the alignment engine computes tabstops and widths to
//!            a fixed point, merges unaligned tokens, right-justifies numeric literals,
//!            and rearranges modifier keywords. See [engine] and [rearranger].
//!         5. The renderer turns positions back into text, substituting tabs under the
//!            configured policy. See [render].
//!
//!     The tree is built once per session and reused; token lists inside the leaf
//!     columns are cleared after every rendered batch. All cross-references are arena
//!     indices: no node owns its parent, and alignment never mutates structure, only
//!     per-pass numeric state.

pub mod engine;
pub mod grouping;
pub mod line;
pub mod rearranger;
pub mod render;
pub mod role;
pub mod scan;
pub mod session;
pub mod settings;
pub mod testing;
pub mod token;
pub mod tree;

pub use grouping::AlignReason;
pub use line::{Line, LineId};
pub use role::{ColumnRole, SequenceRole, SimilarityId, SimilarityInterner, StatementRole};
pub use session::{AlignedLine, AlignmentSession, RoleHint};
pub use settings::{AlignmentSettings, ColumnSetting};
pub use token::{Token, TokenHandle, TokenId};
pub use tree::{ColumnArena, ColumnId};
