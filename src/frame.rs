// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

/// Off-screen cell grid the scene draws into each frame. The terminal
/// diffs it against what is already on screen when presenting.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    blank: Cell,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            blank,
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(self.blank);
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells[i]
    }

    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut f = Frame::new(3, 2, None);
        let cell = Cell {
            ch: 'x',
            comb: None,
            fg: None,
            bg: None,
        };
        f.set(2, 1, cell);
        assert_eq!(f.get(2, 1), Some(&cell));
    }

    #[test]
    fn out_of_bounds_set_is_ignored() {
        let mut f = Frame::new(3, 2, None);
        f.set(3, 0, Cell::blank_with_bg(None));
        f.set(0, 2, Cell::blank_with_bg(None));
        assert_eq!(f.index(3, 0), None);
        assert_eq!(f.index(0, 2), None);
    }

    #[test]
    fn clear_restores_blanks() {
        let mut f = Frame::new(2, 2, None);
        f.set(
            0,
            0,
            Cell {
                ch: 'q',
                comb: None,
                fg: None,
                bg: None,
            },
        );
        f.clear();
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }
}
