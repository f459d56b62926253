use serde::{Deserialize, Serialize};

use crate::{
    core::{Board, GemColor, GridPos},
    engine::session_stats::ScorePopup,
};

/// Score tiers for line-match groups: 3 cells, 4 cells, 5 or more.
const LINE_SCORE_TIERS: [usize; 3] = [50, 150, 400];

/// Each chain step past the first doubles a line group's value.
const LINE_CHAIN_BASE: usize = 2;

/// Points per popped cell for flood-fill matches.
const BLOB_CELL_SCORE: usize = 10;

/// Chain tier table for flood-fill matches, indexed by chain count (entry 0
/// is unused). A fixed lookup rather than an exponential: early chains
/// escalate steeply, late chains flatten out and cap at the last entry.
const BLOB_CHAIN_TIERS: [usize; 9] = [1, 1, 8, 16, 32, 64, 96, 128, 192];

/// Matching rules for a game variant.
///
/// Both rules operate on the visible play field only; hidden staging rows
/// never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchRules {
    /// Straight runs of at least `min_run` equal colors in a row or column.
    Lines { min_run: usize },
    /// 4-connected same-color components of at least `min_size` cells.
    Blobs { min_size: usize },
}

/// A set of same-colored cells that matched together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub color: GemColor,
    /// Member cells, sorted row-major. Each cell appears in exactly one group
    /// even when row and column runs intersect.
    pub cells: Vec<GridPos>,
}

impl MatchGroup {
    /// The cell a floating score popup anchors to.
    #[must_use]
    pub fn anchor(&self) -> GridPos {
        self.cells[self.cells.len() / 2]
    }
}

/// Result of a scoring scan over the board.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScan {
    pub groups: Vec<MatchGroup>,
    pub score: usize,
    pub popups: Vec<ScorePopup>,
}

impl MatchRules {
    pub const JEWEL: Self = Self::Lines { min_run: 3 };
    pub const PUYO: Self = Self::Blobs { min_size: 4 };

    /// The quiet scan: every match group on the board, nothing else.
    ///
    /// Pure over the board snapshot; calling it twice on an unmodified board
    /// returns identical groups.
    #[must_use]
    pub fn find_groups(&self, board: &Board) -> Vec<MatchGroup> {
        let mut groups = match *self {
            Self::Lines { min_run } => line_groups(board, min_run),
            Self::Blobs { min_size } => blob_groups(board, min_size),
        };
        for group in &mut groups {
            group.cells.sort_unstable();
        }
        groups.sort_unstable_by_key(|group| group.cells[0]);
        groups
    }

    /// The scoring scan: groups plus their score contribution and the
    /// floating-text annotations for the UI.
    ///
    /// `chain` is the chain count this scan belongs to (1 for the first match
    /// of an action); the caller tracks it, not the detector.
    #[must_use]
    pub fn scan(&self, board: &Board, chain: u32) -> MatchScan {
        let groups = self.find_groups(board);
        let mut score = 0;
        let mut popups = Vec::with_capacity(groups.len());
        for group in &groups {
            let amount = self.group_score(group, chain);
            score += amount;
            popups.push(ScorePopup::new(group.anchor(), amount, chain));
        }
        MatchScan {
            groups,
            score,
            popups,
        }
    }

    /// Score of one group at the given chain count.
    #[must_use]
    pub fn group_score(&self, group: &MatchGroup, chain: u32) -> usize {
        let chain = chain.max(1);
        match *self {
            Self::Lines { min_run } => {
                let tier = (group.cells.len() - min_run).min(LINE_SCORE_TIERS.len() - 1);
                LINE_SCORE_TIERS[tier] * LINE_CHAIN_BASE.pow(chain - 1)
            }
            Self::Blobs { .. } => {
                let tier = BLOB_CHAIN_TIERS[(chain as usize).min(BLOB_CHAIN_TIERS.len() - 1)];
                group.cells.len() * BLOB_CELL_SCORE * tier
            }
        }
    }

    /// True when some adjacent swap would produce at least one group.
    ///
    /// Used to detect deadlocked boards that must be regenerated. Only
    /// meaningful for swap-driven variants.
    #[must_use]
    pub fn any_swap_match(&self, board: &Board) -> bool {
        let mut scratch = board.clone();
        for pos in board.visible_positions() {
            for other in [
                GridPos::new(pos.row, pos.col + 1),
                GridPos::new(pos.row + 1, pos.col),
            ] {
                if !board.is_visible(other) {
                    continue;
                }
                let (a, b) = (board.get(pos), board.get(other));
                if a.is_none() || b.is_none() || a == b {
                    continue;
                }
                scratch.swap(pos, other);
                let found = !self.find_groups(&scratch).is_empty();
                scratch.swap(pos, other);
                if found {
                    return true;
                }
            }
        }
        false
    }
}

/// Row and column run scan. Cells marked by both a row run and a column run
/// are counted once; marked cells are then grouped into 4-connected
/// same-color components.
fn line_groups(board: &Board, min_run: usize) -> Vec<MatchGroup> {
    let mut marked = vec![false; board.rows() * board.cols()];
    let index = |pos: GridPos| pos.row * board.cols() + pos.col;

    for row in board.hidden_rows()..board.rows() {
        let positions = (0..board.cols()).map(|col| GridPos::new(row, col));
        mark_runs(board, positions, min_run, &mut marked, index);
    }
    for col in 0..board.cols() {
        let positions = (board.hidden_rows()..board.rows()).map(|row| GridPos::new(row, col));
        mark_runs(board, positions, min_run, &mut marked, index);
    }

    collect_components(board, |pos| marked[index(pos)])
}

/// Marks every cell belonging to a run of `min_run` or more equal colors
/// along `positions`.
fn mark_runs(
    board: &Board,
    positions: impl Iterator<Item = GridPos>,
    min_run: usize,
    marked: &mut [bool],
    index: impl Fn(GridPos) -> usize,
) {
    let mut run: Vec<GridPos> = Vec::new();
    let mut run_color: Option<GemColor> = None;

    let mut flush = |run: &mut Vec<GridPos>, marked: &mut [bool]| {
        if run.len() >= min_run {
            for &pos in run.iter() {
                marked[index(pos)] = true;
            }
        }
        run.clear();
    };

    for pos in positions {
        let color = board.get(pos);
        if color.is_some() && color == run_color {
            run.push(pos);
            continue;
        }
        flush(&mut run, marked);
        run_color = color;
        if color.is_some() {
            run.push(pos);
        }
    }
    flush(&mut run, marked);
}

/// Flood-fill component scan over the visible play field.
fn blob_groups(board: &Board, min_size: usize) -> Vec<MatchGroup> {
    let mut groups = collect_components(board, |_| true);
    groups.retain(|group| group.cells.len() >= min_size);
    groups
}

/// Gathers 4-connected same-color components of the visible cells accepted by
/// `eligible`.
fn collect_components(board: &Board, eligible: impl Fn(GridPos) -> bool) -> Vec<MatchGroup> {
    let mut visited = vec![false; board.rows() * board.cols()];
    let index = |pos: GridPos| pos.row * board.cols() + pos.col;
    let mut groups = Vec::new();

    for start in board.visible_positions() {
        if visited[index(start)] || !eligible(start) {
            continue;
        }
        let Some(color) = board.get(start) else {
            continue;
        };

        let mut cells = Vec::new();
        let mut stack = vec![start];
        visited[index(start)] = true;
        while let Some(pos) = stack.pop() {
            cells.push(pos);
            for next in board.neighbors(pos) {
                if visited[index(next)] || !board.is_visible(next) || !eligible(next) {
                    continue;
                }
                if board.get(next) == Some(color) {
                    visited[index(next)] = true;
                    stack.push(next);
                }
            }
        }
        groups.push(MatchGroup { color, cells });
    }
    groups
}
