use std::num::NonZeroUsize;

/// A fixed-size circular tape of byte cells with a single cursor.
///
/// Every cell starts at zero. Cell arithmetic wraps modulo 256 and the
/// cursor wraps modulo the tape length, so no operation on a `Tape` can
/// fail or leave the cursor out of range.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<u8>,
    cursor: usize,
}

impl Tape {
    /// Allocate `size` zeroed cells with the cursor on cell 0.
    pub fn new(size: NonZeroUsize) -> Self {
        Self {
            cells: vec![0; size.get()],
            cursor: 0,
        }
    }

    /// Number of cells; never zero.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Value of the cell under the cursor.
    pub fn get(&self) -> u8 {
        self.cells[self.cursor]
    }

    /// Overwrite the cell under the cursor.
    pub fn set(&mut self, value: u8) {
        self.cells[self.cursor] = value;
    }

    pub fn increment(&mut self) {
        self.cells[self.cursor] = self.cells[self.cursor].wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        self.cells[self.cursor] = self.cells[self.cursor].wrapping_sub(1);
    }

    /// Move one cell right, wrapping from the last cell to cell 0.
    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1) % self.cells.len();
    }

    /// Move one cell left, wrapping from cell 0 to the last cell.
    pub fn move_left(&mut self) {
        let len = self.cells.len();
        self.cursor = (self.cursor + len - 1) % len;
    }

    /// Zero every cell and put the cursor back on cell 0.
    pub fn reset(&mut self) {
        self.cells.fill(0);
        self.cursor = 0;
    }

    /// Read-only view of every cell, in tape order.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn full_lap_right_returns_to_start(size in 1usize..2048, start in 0usize..2048) {
            let mut t = Tape::new(NonZeroUsize::new(size).unwrap());
            for _ in 0..(start % size) {
                t.move_right();
            }
            let origin = t.cursor();
            for _ in 0..size {
                t.move_right();
            }
            prop_assert_eq!(t.cursor(), origin);
        }

        #[test]
        fn full_lap_left_returns_to_start(size in 1usize..2048, start in 0usize..2048) {
            let mut t = Tape::new(NonZeroUsize::new(size).unwrap());
            for _ in 0..(start % size) {
                t.move_right();
            }
            let origin = t.cursor();
            for _ in 0..size {
                t.move_left();
            }
            prop_assert_eq!(t.cursor(), origin);
        }

        #[test]
        fn cursor_stays_in_range(size in 1usize..64, moves in prop::collection::vec(any::<bool>(), 0..512)) {
            let mut t = Tape::new(NonZeroUsize::new(size).unwrap());
            for right in moves {
                if right { t.move_right() } else { t.move_left() }
                prop_assert!(t.cursor() < size);
            }
        }
    }
}
