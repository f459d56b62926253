use log::warn;
use rand::Rng;

use crate::{
    core::{Board, GemColor, GridPos},
    engine::matcher::MatchRules,
};

/// Fill attempts before accepting the last board as-is.
const MAX_ATTEMPTS: usize = 64;

/// Resamples per cell before letting a run stand and retrying at board level.
const MAX_RESAMPLES: usize = 16;

/// Builds a board that starts match-free and, under swap rules, leaves the
/// player at least one valid move.
///
/// The fill avoids completing runs cell by cell, then the whole board is
/// verified and resampled if it still fails either property. With any
/// reasonable palette this converges on the first attempt; the attempt cap
/// only guards against degenerate configurations.
pub fn generate<R: Rng + ?Sized>(
    cols: usize,
    visible_rows: usize,
    hidden_rows: usize,
    palette: &[GemColor],
    rules: MatchRules,
    rng: &mut R,
) -> Board {
    let mut board = fill(cols, visible_rows, hidden_rows, palette, rng);
    for _ in 0..MAX_ATTEMPTS {
        if is_valid(&board, rules) {
            return board;
        }
        board = fill(cols, visible_rows, hidden_rows, palette, rng);
    }
    warn!("board generation exhausted {MAX_ATTEMPTS} attempts; keeping the last fill");
    board
}

fn is_valid(board: &Board, rules: MatchRules) -> bool {
    if !rules.find_groups(board).is_empty() {
        return false;
    }
    match rules {
        MatchRules::Lines { .. } => rules.any_swap_match(board),
        MatchRules::Blobs { .. } => true,
    }
}

/// Random fill of the visible area that rejects any color completing a run of
/// three with the two cells to its left or above.
fn fill<R: Rng + ?Sized>(
    cols: usize,
    visible_rows: usize,
    hidden_rows: usize,
    palette: &[GemColor],
    rng: &mut R,
) -> Board {
    let mut board = Board::new(cols, visible_rows, hidden_rows);
    for pos in board.visible_positions() {
        let mut color = GemColor::sample(rng, palette);
        for _ in 0..MAX_RESAMPLES {
            if !completes_run(&board, pos, color) {
                break;
            }
            color = GemColor::sample(rng, palette);
        }
        board.set(pos, Some(color));
    }
    board
}

fn completes_run(board: &Board, pos: GridPos, color: GemColor) -> bool {
    let cell = Some(color);
    let left_pair = pos.col >= 2
        && board.get(GridPos::new(pos.row, pos.col - 1)) == cell
        && board.get(GridPos::new(pos.row, pos.col - 2)) == cell;
    let up_pair = pos.row >= 2
        && board.get(GridPos::new(pos.row - 1, pos.col)) == cell
        && board.get(GridPos::new(pos.row - 2, pos.col)) == cell;
    left_pair || up_pair
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn generated_boards_start_match_free_with_a_move_available() {
        let palette = GemColor::palette(6);
        for seed in 0..20 {
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            let board = generate(8, 8, 0, palette, MatchRules::JEWEL, &mut rng);
            assert!(MatchRules::JEWEL.find_groups(&board).is_empty());
            assert!(MatchRules::JEWEL.any_swap_match(&board));
        }
    }

    #[test]
    fn generated_boards_are_fully_filled_and_settled() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let board = generate(8, 8, 0, GemColor::palette(6), MatchRules::JEWEL, &mut rng);
        assert!(board.visible_positions().all(|pos| board.get(pos).is_some()));
        assert!(board.is_settled());
    }

    #[test]
    fn hidden_rows_stay_empty() {
        let mut rng = Pcg64Mcg::seed_from_u64(9);
        let board = generate(6, 6, 2, GemColor::palette(4), MatchRules::JEWEL, &mut rng);
        for col in 0..6 {
            assert_eq!(board.get(GridPos::new(0, col)), None);
            assert_eq!(board.get(GridPos::new(1, col)), None);
        }
    }

    #[test]
    fn same_seed_generates_the_same_board() {
        let palette = GemColor::palette(5);
        let mut a = Pcg64Mcg::seed_from_u64(123);
        let mut b = Pcg64Mcg::seed_from_u64(123);
        let first = generate(8, 8, 0, palette, MatchRules::JEWEL, &mut a);
        let second = generate(8, 8, 0, palette, MatchRules::JEWEL, &mut b);
        assert_eq!(first, second);
    }
}
