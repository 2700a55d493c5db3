//! Character selection model shared between the editor and the preview

use std::ops::Range;

/// Half-open editor selection `[start, end)` in source offsets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextSelection {
    start: usize,
    end: usize,
}

impl TextSelection {
    /// Create a selection, normalizing a backwards range
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Collapsed selection (a caret) at `offset`
    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for TextSelection {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}
