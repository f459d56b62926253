use arrayvec::ArrayVec;
use rand::Rng;

use crate::core::{Board, GemColor, GridPos};

/// Orientation of the satellite gem relative to the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOrientation {
    Up,
    Right,
    Down,
    Left,
}

impl PairOrientation {
    #[must_use]
    pub const fn rotated_cw(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    #[must_use]
    pub const fn rotated_ccw(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
            Self::Right => Self::Up,
        }
    }

    /// Satellite offset from the pivot as `(row, col)` deltas.
    const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Right => (0, 1),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
        }
    }
}

/// A player-controlled pair of gems falling into the board.
///
/// Movement operations return candidates that the caller validates with
/// [`FallingPair::fits`] before committing; the pair never touches the board
/// until [`FallingPair::lock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingPair {
    row: i32,
    col: i32,
    orientation: PairOrientation,
    colors: [GemColor; 2],
}

impl FallingPair {
    /// Spawns at the column center inside the hidden staging rows, satellite
    /// pointing up.
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub fn spawn(board: &Board, colors: [GemColor; 2]) -> Self {
        Self {
            row: board.hidden_rows().max(1) as i32 - 1,
            col: (board.cols() / 2) as i32,
            orientation: PairOrientation::Up,
            colors,
        }
    }

    /// Pivot and satellite colors, in that order.
    #[must_use]
    pub const fn colors(&self) -> [GemColor; 2] {
        self.colors
    }

    #[must_use]
    pub const fn orientation(&self) -> PairOrientation {
        self.orientation
    }

    fn raw_cells(&self) -> [(i32, i32, GemColor); 2] {
        let (dr, dc) = self.orientation.offset();
        [
            (self.row, self.col, self.colors[0]),
            (self.row + dr, self.col + dc, self.colors[1]),
        ]
    }

    /// Grid cells occupied by the pair. Valid only for a pair that fits the
    /// board.
    #[must_use]
    #[expect(clippy::cast_sign_loss)]
    pub fn cells(&self) -> ArrayVec<(GridPos, GemColor), 2> {
        self.raw_cells()
            .into_iter()
            .map(|(row, col, color)| (GridPos::new(row as usize, col as usize), color))
            .collect()
    }

    /// True when both gems are inside the grid and over empty cells.
    #[must_use]
    #[expect(clippy::cast_sign_loss)]
    pub fn fits(&self, board: &Board) -> bool {
        self.raw_cells().into_iter().all(|(row, col, _)| {
            row >= 0
                && col >= 0
                && board.in_bounds(GridPos::new(row as usize, col as usize))
                && board.get(GridPos::new(row as usize, col as usize)).is_none()
        })
    }

    #[must_use]
    pub const fn shifted(&self, dcol: i32) -> Self {
        Self {
            col: self.col + dcol,
            ..*self
        }
    }

    #[must_use]
    pub const fn dropped(&self) -> Self {
        Self {
            row: self.row + 1,
            ..*self
        }
    }

    /// Clockwise rotation with a one-cell wall kick to either side.
    #[must_use]
    pub fn rotated_cw(&self, board: &Board) -> Option<Self> {
        self.rotated(board, self.orientation.rotated_cw())
    }

    /// Counter-clockwise rotation with a one-cell wall kick to either side.
    #[must_use]
    pub fn rotated_ccw(&self, board: &Board) -> Option<Self> {
        self.rotated(board, self.orientation.rotated_ccw())
    }

    fn rotated(&self, board: &Board, orientation: PairOrientation) -> Option<Self> {
        let turned = Self {
            orientation,
            ..*self
        };
        [turned, turned.shifted(-1), turned.shifted(1)]
            .into_iter()
            .find(|candidate| candidate.fits(board))
    }

    /// Writes both gems into the board.
    pub fn lock(self, board: &mut Board) {
        for (pos, color) in self.cells() {
            board.set(pos, Some(color));
        }
    }
}

/// Upcoming pair colors with a fixed-length preview.
#[derive(Debug, Clone)]
pub struct PairQueue {
    queue: Vec<[GemColor; 2]>,
}

impl PairQueue {
    pub const PREVIEW: usize = 3;

    pub fn new<R: Rng + ?Sized>(rng: &mut R, palette: &[GemColor]) -> Self {
        let queue = (0..Self::PREVIEW).map(|_| sample_pair(rng, palette)).collect();
        Self { queue }
    }

    /// Pops the next pair and tops the preview back up.
    pub fn pop_next<R: Rng + ?Sized>(&mut self, rng: &mut R, palette: &[GemColor]) -> [GemColor; 2] {
        self.queue.push(sample_pair(rng, palette));
        self.queue.remove(0)
    }

    /// The queued pairs, soonest first.
    #[must_use]
    pub fn upcoming(&self) -> &[[GemColor; 2]] {
        &self.queue
    }
}

fn sample_pair<R: Rng + ?Sized>(rng: &mut R, palette: &[GemColor]) -> [GemColor; 2] {
    [
        GemColor::sample(rng, palette),
        GemColor::sample(rng, palette),
    ]
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    const COLORS: [GemColor; 2] = [GemColor::Ruby, GemColor::Emerald];

    #[test]
    fn spawns_in_the_staging_rows() {
        let board = Board::new(6, 12, 2);
        let pair = FallingPair::spawn(&board, COLORS);
        assert!(pair.fits(&board));
        let cells = pair.cells();
        assert_eq!(cells[0].0, GridPos::new(1, 3));
        assert_eq!(cells[1].0, GridPos::new(0, 3));
    }

    #[test]
    fn walls_block_shifts() {
        let board = Board::new(3, 6, 2);
        let mut pair = FallingPair::spawn(&board, COLORS);
        while pair.shifted(-1).fits(&board) {
            pair = pair.shifted(-1);
        }
        assert!(!pair.shifted(-1).fits(&board));
        assert!(pair.shifted(1).fits(&board));
    }

    #[test]
    fn occupied_cells_block_the_drop() {
        let mut board = Board::new(3, 4, 2);
        let floor = board.rows() - 1;
        board.set(GridPos::new(floor, 1), Some(GemColor::Topaz));
        let mut pair = FallingPair::spawn(&board, COLORS);
        while pair.dropped().fits(&board) {
            pair = pair.dropped();
        }
        // Pivot rests directly above the occupied cell.
        assert_eq!(pair.cells()[0].0, GridPos::new(floor - 1, 1));
    }

    #[test]
    fn rotation_cycles_back_after_four_turns() {
        let board = Board::new(6, 12, 2);
        let mut pair = FallingPair::spawn(&board, COLORS).dropped().dropped();
        let start = pair;
        for _ in 0..4 {
            pair = pair.rotated_cw(&board).expect("open space");
        }
        assert_eq!(pair, start);
    }

    #[test]
    fn rotation_kicks_off_the_wall() {
        let board = Board::new(6, 12, 2);
        // Pivot against the left wall, satellite up; CCW wants the satellite
        // at col -1, so the pair must kick one column right.
        let mut pair = FallingPair::spawn(&board, COLORS).dropped().dropped();
        while pair.shifted(-1).fits(&board) {
            pair = pair.shifted(-1);
        }
        let kicked = pair.rotated_ccw(&board).expect("kick must succeed");
        assert_eq!(kicked.orientation(), PairOrientation::Left);
        assert!(kicked.fits(&board));
    }

    #[test]
    fn lock_writes_both_gems() {
        let mut board = Board::new(6, 12, 2);
        let mut pair = FallingPair::spawn(&board, COLORS);
        while pair.dropped().fits(&board) {
            pair = pair.dropped();
        }
        pair.lock(&mut board);
        let bottom = board.rows() - 1;
        assert_eq!(board.get(GridPos::new(bottom, 3)), Some(GemColor::Ruby));
        assert_eq!(board.get(GridPos::new(bottom - 1, 3)), Some(GemColor::Emerald));
    }

    #[test]
    fn queue_keeps_its_preview_length() {
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        let palette = GemColor::palette(4);
        let mut queue = PairQueue::new(&mut rng, palette);
        assert_eq!(queue.upcoming().len(), PairQueue::PREVIEW);
        let first = queue.upcoming()[0];
        assert_eq!(queue.pop_next(&mut rng, palette), first);
        assert_eq!(queue.upcoming().len(), PairQueue::PREVIEW);
    }
}
