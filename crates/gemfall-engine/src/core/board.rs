use arrayvec::ArrayVec;

use super::color::GemColor;

/// A position on the board grid. Row 0 is the topmost (hidden) row; rows grow
/// downward, columns grow to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance between two positions; 1 means 4-adjacent.
    #[must_use]
    pub const fn distance(self, other: Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// The gem grid: a dense arena of optional colors indexed `row * cols + col`.
///
/// Rows `0..hidden_rows` form the spawn staging area above the visible play
/// field. Staged cells fall into view through the cascade and never
/// participate in matching.
///
/// All accessors tolerate out-of-bounds positions: [`Board::get`] answers
/// `None` and [`Board::set`] drops the write, so callers may probe freely
/// near the edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cols: usize,
    visible_rows: usize,
    hidden_rows: usize,
    cells: Vec<Option<GemColor>>,
}

impl Board {
    #[must_use]
    pub fn new(cols: usize, visible_rows: usize, hidden_rows: usize) -> Self {
        Self {
            cols,
            visible_rows,
            hidden_rows,
            cells: vec![None; cols * (visible_rows + hidden_rows)],
        }
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total row count, hidden staging rows included.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.visible_rows + self.hidden_rows
    }

    #[must_use]
    pub const fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    #[must_use]
    pub const fn hidden_rows(&self) -> usize {
        self.hidden_rows
    }

    #[must_use]
    pub const fn in_bounds(&self, pos: GridPos) -> bool {
        pos.row < self.rows() && pos.col < self.cols
    }

    /// True when `pos` lies inside the visible play field.
    #[must_use]
    pub const fn is_visible(&self, pos: GridPos) -> bool {
        self.in_bounds(pos) && pos.row >= self.hidden_rows
    }

    const fn index(&self, pos: GridPos) -> usize {
        pos.row * self.cols + pos.col
    }

    /// Returns the cell at `pos`, or `None` when the cell is empty or the
    /// position is out of bounds.
    #[must_use]
    pub fn get(&self, pos: GridPos) -> Option<GemColor> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.index(pos)]
    }

    /// Writes `cell` at `pos`. Out-of-bounds writes are dropped.
    pub fn set(&mut self, pos: GridPos, cell: Option<GemColor>) {
        if self.in_bounds(pos) {
            let index = self.index(pos);
            self.cells[index] = cell;
        }
    }

    /// Exchanges the cells at `a` and `b`. A no-op unless both are in bounds.
    pub fn swap(&mut self, a: GridPos, b: GridPos) {
        if self.in_bounds(a) && self.in_bounds(b) {
            let (ia, ib) = (self.index(a), self.index(b));
            self.cells.swap(ia, ib);
        }
    }

    /// The up-to-four 4-adjacent in-bounds neighbors of `pos`.
    #[must_use]
    pub fn neighbors(&self, pos: GridPos) -> ArrayVec<GridPos, 4> {
        let mut out = ArrayVec::new();
        if pos.row > 0 {
            out.push(GridPos::new(pos.row - 1, pos.col));
        }
        if pos.col > 0 {
            out.push(GridPos::new(pos.row, pos.col - 1));
        }
        if pos.row + 1 < self.rows() {
            out.push(GridPos::new(pos.row + 1, pos.col));
        }
        if pos.col + 1 < self.cols {
            out.push(GridPos::new(pos.row, pos.col + 1));
        }
        out
    }

    /// Iterates the visible positions in row-major order.
    pub fn visible_positions(&self) -> impl Iterator<Item = GridPos> + use<> {
        let (cols, hidden, rows) = (self.cols, self.hidden_rows, self.rows());
        (hidden..rows).flat_map(move |row| (0..cols).map(move |col| GridPos::new(row, col)))
    }

    /// True when gravity is fully resolved: in every column, no occupied cell
    /// has an empty cell anywhere below it.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        for col in 0..self.cols {
            let mut seen_gem = false;
            for row in 0..self.rows() {
                match self.get(GridPos::new(row, col)) {
                    Some(_) => seen_gem = true,
                    None if seen_gem => return false,
                    None => {}
                }
            }
        }
        true
    }

    /// Builds a board from one glyph row per visible row: `.` is empty, the
    /// first letter of each color names a gem (`M` for Amethyst).
    #[cfg(test)]
    pub(crate) fn from_glyphs(hidden_rows: usize, rows: &[&str]) -> Self {
        let cols = rows.first().map_or(0, |row| row.len());
        let mut board = Self::new(cols, rows.len(), hidden_rows);
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), cols, "ragged glyph rows");
            for (c, glyph) in row.chars().enumerate() {
                let cell = match glyph {
                    '.' => None,
                    'R' => Some(GemColor::Ruby),
                    'A' => Some(GemColor::Amber),
                    'T' => Some(GemColor::Topaz),
                    'E' => Some(GemColor::Emerald),
                    'S' => Some(GemColor::Sapphire),
                    'M' => Some(GemColor::Amethyst),
                    other => panic!("unknown glyph {other:?}"),
                };
                board.set(GridPos::new(r + hidden_rows, c), cell);
            }
        }
        board
    }
}
