use crate::{core::GridPos, engine::matcher::MatchScan};

/// Floating score text anchored to a board cell.
///
/// Popups are spawned when a match scores and age out on their own; the
/// renderer decides how they drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePopup {
    pub pos: GridPos,
    pub amount: usize,
    pub chain: u32,
    /// Seconds since the popup spawned.
    pub age: f32,
}

impl ScorePopup {
    pub const LIFETIME: f32 = 1.2;

    #[must_use]
    pub const fn new(pos: GridPos, amount: usize, chain: u32) -> Self {
        Self {
            pos,
            amount,
            chain,
            age: 0.0,
        }
    }

    #[must_use]
    pub fn expired(&self) -> bool {
        self.age >= Self::LIFETIME
    }
}

/// Session statistics.
///
/// The score only ever grows; no session operation subtracts from it.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    score: usize,
    longest_chain: u32,
    /// Groups cleared by size: 3, 4, 5, and 6-or-more cells.
    group_size_counter: [usize; 4],
    gems_cleared: usize,
    play_time: f32,
    popups: Vec<ScorePopup>,
}

impl SessionStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn longest_chain(&self) -> u32 {
        self.longest_chain
    }

    /// Histogram of cleared group sizes: `[0]` holds groups of 3 cells up to
    /// `[3]` for 6 or more.
    #[must_use]
    pub const fn group_size_counter(&self) -> &[usize; 4] {
        &self.group_size_counter
    }

    #[must_use]
    pub const fn gems_cleared(&self) -> usize {
        self.gems_cleared
    }

    /// Accumulated active play time in seconds, built from injected deltas.
    #[must_use]
    pub const fn play_time(&self) -> f32 {
        self.play_time
    }

    #[must_use]
    pub fn popups(&self) -> &[ScorePopup] {
        &self.popups
    }

    /// Applies a scoring scan at the given chain count.
    pub fn apply_scan(&mut self, scan: &MatchScan, chain: u32) {
        self.score += scan.score;
        self.longest_chain = self.longest_chain.max(chain);
        for group in &scan.groups {
            self.group_size_counter[group.cells.len().clamp(3, 6) - 3] += 1;
            self.gems_cleared += group.cells.len();
        }
        self.popups.extend_from_slice(&scan.popups);
    }

    /// Advances play time and ages the popups out.
    pub fn tick(&mut self, dt: f32) {
        self.play_time += dt;
        self.popups.retain_mut(|popup| {
            popup.age += dt;
            !popup.expired()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::Board, engine::matcher::MatchRules};

    fn sample_scan() -> MatchScan {
        let board = Board::from_glyphs(0, &[
            "RRR..", //
            ".....", //
            "EEEE.", //
            ".....", //
            ".....", //
        ]);
        MatchRules::JEWEL.scan(&board, 1)
    }

    #[test]
    fn apply_scan_accumulates() {
        let mut stats = SessionStats::new();
        let scan = sample_scan();
        stats.apply_scan(&scan, 1);
        assert_eq!(stats.score(), 50 + 150);
        assert_eq!(stats.gems_cleared(), 7);
        assert_eq!(stats.group_size_counter(), &[1, 1, 0, 0]);
        assert_eq!(stats.popups().len(), 2);

        stats.apply_scan(&scan, 2);
        assert_eq!(stats.longest_chain(), 2);
        assert!(stats.score() > 200);
    }

    #[test]
    fn score_never_decreases() {
        let mut stats = SessionStats::new();
        let scan = sample_scan();
        let mut last = 0;
        for chain in 1..6 {
            stats.apply_scan(&scan, chain);
            assert!(stats.score() >= last);
            last = stats.score();
        }
    }

    #[test]
    fn popups_age_out() {
        let mut stats = SessionStats::new();
        stats.apply_scan(&sample_scan(), 1);
        assert!(!stats.popups().is_empty());
        stats.tick(ScorePopup::LIFETIME / 2.0);
        assert!(!stats.popups().is_empty());
        stats.tick(ScorePopup::LIFETIME);
        assert!(stats.popups().is_empty());
        assert!(stats.play_time() > ScorePopup::LIFETIME);
    }

    #[test]
    fn oversized_groups_land_in_the_last_bucket() {
        let board = Board::from_glyphs(0, &[
            "SSS...", //
            "SSS...", //
            "......", //
            "......", //
        ]);
        let scan = MatchRules::PUYO.scan(&board, 1);
        let mut stats = SessionStats::new();
        stats.apply_scan(&scan, 1);
        assert_eq!(stats.group_size_counter(), &[0, 0, 0, 1]);
        assert_eq!(stats.gems_cleared(), 6);
    }
}
