//! Two-cursor walk over the input stream
//!
//! One cursor is the ordinal of the next data row; the other indexes the
//! next unconsumed entry of the sorted sample positions. Both only move
//! forward, so the input is read in a single pass.

/// What to do with the row at the current ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Not sampled; read past it
    Skip,
    /// Sampled; the payload is its 1-based ordinal
    Sample(usize),
}

#[derive(Debug, Clone)]
pub struct SampleCursor {
    positions: Vec<usize>,
    ordinal: usize,
    next: usize,
}

impl SampleCursor {
    /// `positions` must be strictly increasing and 1-based (row 1 = first data row).
    pub fn new(positions: Vec<usize>) -> Self {
        debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        Self {
            positions,
            ordinal: 1,
            next: 0,
        }
    }

    /// Classify the data row at the current ordinal and move past it.
    pub fn advance(&mut self) -> Step {
        let ordinal = self.ordinal;
        self.ordinal += 1;
        if self.positions.get(self.next) == Some(&ordinal) {
            self.next += 1;
            Step::Sample(ordinal)
        } else {
            Step::Skip
        }
    }

    /// All sample positions consumed; no further rows need reading.
    pub fn is_done(&self) -> bool {
        self.next == self.positions.len()
    }

    /// Sampled rows consumed so far.
    pub fn consumed(&self) -> usize {
        self.next
    }

    /// Sample size K.
    pub fn target(&self) -> usize {
        self.positions.len()
    }
}
