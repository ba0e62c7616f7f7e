//! Cursors addressing a position inside a chunk.

/// Direction a [`ChunkIterator`] measures its position from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Position counts from the start of the chunk.
    Forward,
    /// Position counts from the end of the chunk.
    Backward,
}

/// Position within a chunk plus an optional sequence element index.
///
/// The index is a shortcut: when known, it names the sequence element that
/// starts at the position (counted from the back for backward iterators), so
/// locating the element takes O(1). It is forgotten whenever a move does not
/// land on an element boundary that can be derived without scanning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkIterator {
    direction: Direction,
    position: usize,
    index: Option<usize>,
}

impl ChunkIterator {
    /// Iterator at `position` bytes from the front.
    #[must_use]
    pub const fn forward(position: usize) -> Self {
        Self {
            direction: Direction::Forward,
            position,
            index: if position == 0 { Some(0) } else { None },
        }
    }

    /// Iterator at `position` bytes from the back.
    #[must_use]
    pub const fn backward(position: usize) -> Self {
        Self {
            direction: Direction::Backward,
            position,
            index: if position == 0 { Some(0) } else { None },
        }
    }

    /// Direction of measurement.
    #[must_use]
    pub const fn direction(&self) -> Direction { self.direction }

    /// Whether the position counts from the front.
    #[must_use]
    pub const fn is_forward(&self) -> bool { matches!(self.direction, Direction::Forward) }

    /// Distance from the reference end in bytes.
    #[must_use]
    pub const fn position(&self) -> usize { self.position }

    /// Sequence element index at the position, if known.
    #[must_use]
    pub const fn index(&self) -> Option<usize> { self.index }

    pub(crate) fn set(&mut self, position: usize, index: Option<usize>) {
        self.position = position;
        self.index = index;
    }

    /// Translate to a start offset from the front of a chunk of
    /// `total` bytes, for a range of `length` bytes (or the remainder).
    #[must_use]
    pub fn forward_offset(&self, total: usize, length: Option<usize>) -> usize {
        match self.direction {
            Direction::Forward => self.position,
            Direction::Backward => {
                let remaining = total.saturating_sub(self.position);
                remaining - length.unwrap_or(remaining).min(remaining)
            }
        }
    }
}
