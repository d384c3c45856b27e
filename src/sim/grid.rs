//! Row-major 2D board for tile and cell games

use serde::{Deserialize, Serialize};

/// Cell coordinate (column, row)
pub type Cell = (i32, i32);

const OFFSETS_4: [Cell; 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const OFFSETS_8: [Cell; 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Orthogonal direction on a grid (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    pub fn delta(&self) -> Cell {
        match self {
            Dir::Up => (0, -1),
            Dir::Right => (1, 0),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
        }
    }

    pub fn opposite(&self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
        }
    }

    /// Neighbouring cell in this direction (may be out of bounds)
    pub fn step(&self, (x, y): Cell) -> Cell {
        let (dx, dy) = self.delta();
        (x + dx, y + dy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![fill; len],
        }
    }

    /// Reset every cell to `value`
    pub fn fill(&mut self, value: T) {
        self.cells.iter_mut().for_each(|c| *c = value.clone());
    }
}

impl<T> Grid<T> {
    /// Build from rows (all rows must have equal length)
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as i32;
        debug_assert!(rows.iter().all(|r| r.len() as i32 == width));
        Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, (x, y): Cell) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, (x, y): Cell) -> Option<usize> {
        self.in_bounds((x, y))
            .then(|| (y * self.width + x) as usize)
    }

    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.index(cell).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
        self.index(cell).map(move |i| &mut self.cells[i])
    }

    /// Returns false (and does nothing) when out of bounds
    pub fn set(&mut self, cell: Cell, value: T) -> bool {
        match self.get_mut(cell) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Orthogonal neighbours inside the board
    pub fn neighbors4(&self, (x, y): Cell) -> impl Iterator<Item = Cell> + '_ {
        OFFSETS_4
            .iter()
            .map(move |(dx, dy)| (x + dx, y + dy))
            .filter(|c| self.in_bounds(*c))
    }

    /// All eight surrounding cells inside the board
    pub fn neighbors8(&self, (x, y): Cell) -> impl Iterator<Item = Cell> + '_ {
        OFFSETS_8
            .iter()
            .map(move |(dx, dy)| (x + dx, y + dy))
            .filter(|c| self.in_bounds(*c))
    }

    /// Iterate `(cell, value)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &T)> {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| ((i as i32 % w, i as i32 / w), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut()
    }

    /// Rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    pub fn row(&self, y: i32) -> &[T] {
        let start = (y * self.width) as usize;
        &self.cells[start..start + self.width as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn corner_has_three_neighbors() {
        let grid = Grid::new(5, 4, 0u8);
        assert_eq!(grid.neighbors8((0, 0)).count(), 3);
        assert_eq!(grid.neighbors4((0, 0)).count(), 2);
        assert_eq!(grid.neighbors8((2, 2)).count(), 8);
    }

    #[test]
    fn set_out_of_bounds_is_ignored() {
        let mut grid = Grid::new(3, 3, 0u8);
        assert!(!grid.set((3, 0), 1));
        assert!(grid.set((2, 2), 7));
        assert_eq!(grid.get((2, 2)), Some(&7));
        assert_eq!(grid.row(2), &[0, 0, 7]);
    }

    #[test]
    fn iter_yields_row_major_coordinates() {
        let grid = Grid::from_rows(vec![vec!['a', 'b'], vec!['c', 'd']]);
        let cells: Vec<_> = grid.iter().map(|(c, v)| (c, *v)).collect();
        assert_eq!(cells, vec![((0, 0), 'a'), ((1, 0), 'b'), ((0, 1), 'c'), ((1, 1), 'd')]);
    }

    #[test]
    fn dir_step_and_opposite() {
        for d in Dir::ALL {
            assert_eq!(d.opposite().step(d.step((4, 4))), (4, 4));
        }
        let grid = Grid::from_rows(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(grid.rows().nth(1), Some(&[3, 4][..]));
    }

    proptest! {
        #[test]
        fn neighbors_stay_in_bounds(w in 1i32..20, h in 1i32..20, x in -2i32..22, y in -2i32..22) {
            let grid = Grid::new(w, h, ());
            for n in grid.neighbors8((x, y)) {
                prop_assert!(grid.in_bounds(n));
            }
        }
    }
}
