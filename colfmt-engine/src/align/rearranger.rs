//! Modifier rearranging
//!
//! The modifier column is the one column whose tokens may be reordered. Across a batch
//! the rearranger tracks the combined set of modifier keywords seen on any line, lays
//! the set out as canonical-order sub-columns, and regenerates each line's modifier
//! text against that layout: keywords present on other lines but absent here become
//! blank padding, so every keyword starts at the same column on every line.
//!
//! Syntactically mutually-exclusive keywords share one sub-column sized to the longest
//! member, since at most one of them can appear on a line: the three access keywords
//! always, and `final`/`volatile` unless `transient` also appears in the batch.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Canonical modifier order.
pub const MODIFIER_ORDER: &[&str] = &[
    "public",
    "protected",
    "private",
    "abstract",
    "static",
    "final",
    "transient",
    "volatile",
    "synchronized",
    "native",
    "strictfp",
];

static MODIFIER_BITS: Lazy<HashMap<&'static str, u16>> = Lazy::new(|| {
    MODIFIER_ORDER
        .iter()
        .enumerate()
        .map(|(index, word)| (*word, 1u16 << index))
        .collect()
});

const ACCESS_MASK: u16 = 0b111; // public | protected | private
const FINAL_BIT: u16 = 1 << 5;
const TRANSIENT_BIT: u16 = 1 << 6;
const VOLATILE_BIT: u16 = 1 << 7;

/// The bit of a known modifier keyword.
pub fn modifier_bit(word: &str) -> Option<u16> {
    MODIFIER_BITS.get(word).copied()
}

/// One rendered sub-column of the modifier layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    mask: u16,
    width: usize,
}

/// Batch-wide modifier layout.
#[derive(Debug, Clone, Default)]
pub struct ModifierRearranger {
    batch_mask: u16,
}

impl ModifierRearranger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one line's modifier keywords; unknown words are ignored here and
    /// passed through verbatim by [`rearrange_line`](Self::rearrange_line).
    pub fn note_words<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        for word in words {
            if let Some(bit) = modifier_bit(word) {
                self.batch_mask |= bit;
            }
        }
    }

    /// Whether any known modifier was seen in the batch.
    pub fn is_empty(&self) -> bool {
        self.batch_mask == 0
    }

    fn segments(&self) -> Vec<Segment> {
        let transient_present = self.batch_mask & TRANSIENT_BIT != 0;
        let mut segments = Vec::new();
        let mut covered: u16 = 0;
        for (index, _) in MODIFIER_ORDER.iter().enumerate() {
            let bit = 1u16 << index;
            if self.batch_mask & bit == 0 || covered & bit != 0 {
                continue;
            }
            let mask = if ACCESS_MASK & bit != 0 {
                self.batch_mask & ACCESS_MASK
            } else if (bit == FINAL_BIT || bit == VOLATILE_BIT) && !transient_present {
                self.batch_mask & (FINAL_BIT | VOLATILE_BIT)
            } else {
                bit
            };
            covered |= mask;
            let width = MODIFIER_ORDER
                .iter()
                .enumerate()
                .filter(|(j, _)| mask & (1u16 << j) != 0)
                .map(|(_, word)| word.len())
                .max()
                .unwrap_or(0);
            segments.push(Segment { mask, width });
        }
        segments
    }

    /// Regenerate one line's modifier text against the batch layout.
    ///
    /// Unknown words survive at the end in their original order; trailing padding is
    /// trimmed so the column width reflects actual text.
    pub fn rearrange_line<'a>(&self, words: impl IntoIterator<Item = &'a str>) -> String {
        let mut line_mask: u16 = 0;
        let mut unknown = Vec::new();
        for word in words {
            match modifier_bit(word) {
                Some(bit) => line_mask |= bit,
                None => unknown.push(word),
            }
        }
        let mut parts: Vec<String> = Vec::new();
        for segment in self.segments() {
            let present = MODIFIER_ORDER
                .iter()
                .enumerate()
                .find(|(j, _)| segment.mask & line_mask & (1u16 << j) != 0);
            match present {
                Some((_, word)) => parts.push(format!("{:<1$}", word, segment.width)),
                None => parts.push(" ".repeat(segment.width)),
            }
        }
        for word in unknown {
            parts.push(word.to_string());
        }
        let joined = parts.join(" ");
        joined.trim_end().to_string()
    }
}
