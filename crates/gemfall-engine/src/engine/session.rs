use std::fmt;

use log::{info, warn};
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::{
    HookError, InvalidSwapError, PairCollisionError,
    core::{Board, GemColor, GridPos, Layout},
    engine::{
        cascade::{Cascade, GravityProfile},
        generator,
        matcher::{MatchRules, MatchScan},
        pair::{FallingPair, PairQueue},
        session_stats::SessionStats,
    },
};

/// Duration of one swap half (forward or revert), seconds.
const SWAP_DURATION: f32 = 0.15;

/// How long matched cells shrink before removal, seconds.
const POP_DURATION: f32 = 0.3;

/// Lifecycle phase of a session.
///
/// Player input is accepted only while [`Phase::Playing`]; the animation
/// phases reject input outright rather than queueing it, so stale input can
/// never apply to a later board state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Phase {
    /// Pre-game; waiting for an explicit start command.
    Start,
    /// Waiting on the host's game-start hook; the board is untouched here.
    Loading,
    Playing,
    /// A swap (or its revert) is animating.
    Swapping,
    /// Matched cells are shrinking away. Their score already landed.
    Popping,
    /// The cascade is settling fallen and refilled cells.
    Dropping,
    Paused,
    GameOver,
}

/// Callbacks into the hosting shell.
///
/// Both hooks are best-effort: a failure is logged and play continues. The
/// scoring backend must never be able to block the game.
pub trait SessionHooks: fmt::Debug {
    /// Called once while the session is loading, before play begins.
    fn on_game_start(&mut self) -> Result<(), HookError> {
        Ok(())
    }

    /// Called once with the final score when the session ends.
    ///
    /// The returned flag reports whether the score was stored; it only drives
    /// the saved/unsaved indicator in the HUD.
    fn on_score_save(&mut self, _score: usize) -> Result<bool, HookError> {
        Ok(true)
    }
}

/// Hooks that accept everything and store nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl SessionHooks for NoopHooks {}

/// Configuration for the swap (line-match) variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JewelConfig {
    pub cols: usize,
    pub rows: usize,
    /// Colors in play, counted from the front of the palette.
    pub palette: usize,
    /// Countdown in seconds; `None` plays until quit.
    pub time_limit: Option<f32>,
    pub gravity: GravityProfile,
    pub seed: Option<u64>,
}

impl Default for JewelConfig {
    fn default() -> Self {
        Self {
            cols: 8,
            rows: 8,
            palette: 6,
            time_limit: Some(120.0),
            gravity: GravityProfile::JEWEL,
            seed: None,
        }
    }
}

/// Configuration for the falling-pair (flood-fill) variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuyoConfig {
    pub cols: usize,
    pub rows: usize,
    /// Staging rows above the visible field where pairs spawn.
    pub hidden_rows: usize,
    pub palette: usize,
    /// Seconds between automatic descent steps of the active pair.
    pub fall_interval: f32,
    pub gravity: GravityProfile,
    pub seed: Option<u64>,
}

impl Default for PuyoConfig {
    fn default() -> Self {
        Self {
            cols: 6,
            rows: 12,
            hidden_rows: 2,
            palette: 4,
            fall_interval: 0.55,
            gravity: GravityProfile::PUYO,
            seed: None,
        }
    }
}

/// Variant selection plus everything needed to rebuild the session on reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionConfig {
    Jewel(JewelConfig),
    Puyo(PuyoConfig),
}

/// An in-flight swap: endpoints, animation progress, direction.
#[derive(Debug, Clone, Copy)]
struct PendingSwap {
    a: GridPos,
    b: GridPos,
    progress: f32,
    reverting: bool,
}

/// Variant-specific input state.
#[derive(Debug)]
enum Control {
    Swap {
        pending: Option<PendingSwap>,
    },
    Pair {
        active: Option<FallingPair>,
        queue: PairQueue,
        fall_timer: f32,
        fall_interval: f32,
    },
}

/// The root controller: owns the board and sequences
/// input → swap/lock → match → pop → cascade → re-check.
///
/// Everything advances inside [`GameSession::update`]; the host calls it once
/// per frame with a clamped delta and renders from the accessors afterwards.
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    board: Board,
    layout: Layout,
    rules: MatchRules,
    gravity: GravityProfile,
    palette: &'static [GemColor],
    control: Control,
    phase: Phase,
    stats: SessionStats,
    /// Match rounds resolved within the current player action.
    chain: u32,
    cascade: Option<Cascade>,
    pop_cells: Vec<GridPos>,
    pop_elapsed: f32,
    /// Remaining play time in seconds, when the variant is timed.
    clock: Option<f32>,
    rng: Pcg64Mcg,
    hooks: Box<dyn SessionHooks>,
    /// `None` until the save hook ran; then whether the score was stored.
    score_saved: Option<bool>,
}

impl GameSession {
    #[must_use]
    pub fn jewel(config: JewelConfig) -> Self {
        Self::jewel_with_hooks(config, Box::new(NoopHooks))
    }

    #[must_use]
    pub fn jewel_with_hooks(config: JewelConfig, hooks: Box<dyn SessionHooks>) -> Self {
        let rng = seed_rng(config.seed);
        Self {
            board: Board::new(config.cols, config.rows, 0),
            layout: Layout::new(config.cols, config.rows, 0),
            rules: MatchRules::JEWEL,
            gravity: config.gravity,
            palette: GemColor::palette(config.palette),
            control: Control::Swap { pending: None },
            phase: Phase::Start,
            stats: SessionStats::new(),
            chain: 0,
            cascade: None,
            pop_cells: Vec::new(),
            pop_elapsed: 0.0,
            clock: config.time_limit,
            rng,
            hooks,
            score_saved: None,
            config: SessionConfig::Jewel(config),
        }
    }

    #[must_use]
    pub fn puyo(config: PuyoConfig) -> Self {
        Self::puyo_with_hooks(config, Box::new(NoopHooks))
    }

    #[must_use]
    pub fn puyo_with_hooks(config: PuyoConfig, hooks: Box<dyn SessionHooks>) -> Self {
        let mut rng = seed_rng(config.seed);
        let palette = GemColor::palette(config.palette);
        let queue = PairQueue::new(&mut rng, palette);
        Self {
            board: Board::new(config.cols, config.rows, config.hidden_rows),
            layout: Layout::new(config.cols, config.rows, config.hidden_rows),
            rules: MatchRules::PUYO,
            gravity: config.gravity,
            palette,
            control: Control::Pair {
                active: None,
                queue,
                fall_timer: 0.0,
                fall_interval: config.fall_interval,
            },
            phase: Phase::Start,
            stats: SessionStats::new(),
            chain: 0,
            cascade: None,
            pop_cells: Vec::new(),
            pop_elapsed: 0.0,
            clock: None,
            rng,
            hooks,
            score_saved: None,
            config: SessionConfig::Puyo(config),
        }
    }

    /// Begins loading; only meaningful on the start screen.
    pub fn start(&mut self) {
        if self.phase.is_start() {
            self.phase = Phase::Loading;
        }
    }

    /// Rebuilds the session from its configuration, back to the start screen.
    pub fn reset(&mut self) {
        let config = self.config.clone();
        let hooks = std::mem::replace(&mut self.hooks, Box::new(NoopHooks));
        *self = match config {
            SessionConfig::Jewel(cfg) => Self::jewel_with_hooks(cfg, hooks),
            SessionConfig::Puyo(cfg) => Self::puyo_with_hooks(cfg, hooks),
        };
    }

    /// Pauses from play and resumes from pause; other phases are unaffected.
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            other => other,
        };
    }

    /// Advances the session by `dt` seconds of simulated time.
    pub fn update(&mut self, dt: f32) {
        if matches!(
            self.phase,
            Phase::Playing | Phase::Swapping | Phase::Popping | Phase::Dropping
        ) {
            self.stats.tick(dt);
            if let Some(clock) = &mut self.clock {
                *clock = (*clock - dt).max(0.0);
                if *clock == 0.0 {
                    self.finish();
                    return;
                }
            }
        }

        match self.phase {
            Phase::Start | Phase::Paused | Phase::GameOver => {}
            Phase::Loading => self.finish_loading(),
            Phase::Playing => self.update_playing(dt),
            Phase::Swapping => self.update_swapping(dt),
            Phase::Popping => self.update_popping(dt),
            Phase::Dropping => self.update_dropping(dt),
        }
    }

    /// Requests a swap between two adjacent occupied cells.
    ///
    /// Rejected requests leave the session untouched; the caller is free to
    /// discard the error.
    pub fn try_swap(&mut self, a: GridPos, b: GridPos) -> Result<(), InvalidSwapError> {
        if !self.phase.is_playing() || !matches!(self.control, Control::Swap { .. }) {
            return Err(InvalidSwapError);
        }
        if a.distance(b) != 1 || !self.board.is_visible(a) || !self.board.is_visible(b) {
            return Err(InvalidSwapError);
        }
        if self.board.get(a).is_none() || self.board.get(b).is_none() {
            return Err(InvalidSwapError);
        }
        self.board.swap(a, b);
        self.control = Control::Swap {
            pending: Some(PendingSwap {
                a,
                b,
                progress: 0.0,
                reverting: false,
            }),
        };
        self.phase = Phase::Swapping;
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), PairCollisionError> {
        self.with_active_pair(|pair, board| {
            let moved = pair.shifted(-1);
            moved.fits(board).then_some(moved)
        })
    }

    pub fn try_move_right(&mut self) -> Result<(), PairCollisionError> {
        self.with_active_pair(|pair, board| {
            let moved = pair.shifted(1);
            moved.fits(board).then_some(moved)
        })
    }

    pub fn try_rotate_cw(&mut self) -> Result<(), PairCollisionError> {
        self.with_active_pair(FallingPair::rotated_cw)
    }

    pub fn try_rotate_ccw(&mut self) -> Result<(), PairCollisionError> {
        self.with_active_pair(FallingPair::rotated_ccw)
    }

    /// One manual descent step. Locking stays on the gravity path.
    pub fn try_soft_drop(&mut self) -> Result<(), PairCollisionError> {
        self.with_active_pair(|pair, board| {
            let moved = pair.dropped();
            moved.fits(board).then_some(moved)
        })
    }

    /// Drops the pair to its resting place and locks it immediately.
    pub fn hard_drop_and_lock(&mut self) {
        if !self.phase.is_playing() {
            return;
        }
        while self.try_soft_drop().is_ok() {}
        if matches!(self.control, Control::Pair { active: Some(_), .. }) {
            self.lock_pair();
        }
    }

    fn with_active_pair(
        &mut self,
        advance: impl FnOnce(&FallingPair, &Board) -> Option<FallingPair>,
    ) -> Result<(), PairCollisionError> {
        if !self.phase.is_playing() {
            return Err(PairCollisionError);
        }
        let Control::Pair { active, .. } = &mut self.control else {
            return Err(PairCollisionError);
        };
        let Some(pair) = active else {
            return Err(PairCollisionError);
        };
        match advance(pair, &self.board) {
            Some(moved) => {
                *pair = moved;
                Ok(())
            }
            None => Err(PairCollisionError),
        }
    }

    fn finish_loading(&mut self) {
        if let Err(err) = self.hooks.on_game_start() {
            // Play must never be blocked by the scoring backend.
            warn!("game-start hook failed, continuing without a session token: {err}");
        }
        match &self.config {
            SessionConfig::Jewel(cfg) => {
                self.board = generator::generate(
                    cfg.cols,
                    cfg.rows,
                    0,
                    self.palette,
                    self.rules,
                    &mut self.rng,
                );
            }
            SessionConfig::Puyo(cfg) => {
                self.board = Board::new(cfg.cols, cfg.rows, cfg.hidden_rows);
            }
        }
        self.spawn_pair_if_needed();
        self.phase = Phase::Playing;
    }

    fn update_playing(&mut self, dt: f32) {
        let mut steps = 0;
        if let Control::Pair {
            active: Some(_),
            fall_timer,
            fall_interval,
            ..
        } = &mut self.control
        {
            *fall_timer += dt;
            while *fall_timer >= *fall_interval {
                *fall_timer -= *fall_interval;
                steps += 1;
            }
        }
        for _ in 0..steps {
            if !self.phase.is_playing() {
                break;
            }
            self.descend_pair();
        }
    }

    /// One gravity step: move the pair down, or lock it when blocked.
    fn descend_pair(&mut self) {
        let Control::Pair { active, .. } = &mut self.control else {
            return;
        };
        let Some(pair) = *active else {
            return;
        };
        let dropped = pair.dropped();
        if dropped.fits(&self.board) {
            *active = Some(dropped);
        } else {
            self.lock_pair();
        }
    }

    fn lock_pair(&mut self) {
        let Control::Pair { active, .. } = &mut self.control else {
            return;
        };
        let Some(pair) = active.take() else {
            return;
        };
        pair.lock(&mut self.board);
        self.chain = 0;
        self.begin_drop();
    }

    fn update_swapping(&mut self, dt: f32) {
        let Control::Swap { pending } = &mut self.control else {
            self.phase = Phase::Playing;
            return;
        };
        let Some(swap) = pending else {
            self.phase = Phase::Playing;
            return;
        };
        swap.progress += dt / SWAP_DURATION;
        if swap.progress < 1.0 {
            return;
        }
        let done = *swap;
        *pending = None;

        if done.reverting {
            self.phase = Phase::Playing;
            return;
        }
        let scan = self.rules.scan(&self.board, self.chain + 1);
        if scan.groups.is_empty() {
            // No match: undo on the board and play the animation backwards.
            self.board.swap(done.a, done.b);
            self.control = Control::Swap {
                pending: Some(PendingSwap {
                    a: done.a,
                    b: done.b,
                    progress: 0.0,
                    reverting: true,
                }),
            };
        } else {
            self.begin_pop(scan);
        }
    }

    /// Applies a found match. Score lands immediately; removal waits for the
    /// pop animation.
    fn begin_pop(&mut self, scan: MatchScan) {
        self.chain += 1;
        self.stats.apply_scan(&scan, self.chain);
        self.pop_cells = scan
            .groups
            .into_iter()
            .flat_map(|group| group.cells)
            .collect();
        self.pop_elapsed = 0.0;
        self.phase = Phase::Popping;
    }

    fn update_popping(&mut self, dt: f32) {
        self.pop_elapsed += dt;
        if self.pop_elapsed < POP_DURATION {
            return;
        }
        // A popped cell may already be gone; a missing cell is a no-op.
        for pos in std::mem::take(&mut self.pop_cells) {
            if self.board.get(pos).is_some() {
                self.board.set(pos, None);
            }
        }
        self.begin_drop();
    }

    /// Starts the cascade. Even a cascade that moves nothing routes through
    /// the drop phase, so the chain re-check always runs.
    fn begin_drop(&mut self) {
        let cascade = match &self.config {
            SessionConfig::Jewel(_) => Cascade::plan_with_refill(
                &mut self.board,
                &self.layout,
                self.gravity,
                &mut self.rng,
                self.palette,
            ),
            SessionConfig::Puyo(_) => Cascade::plan(&mut self.board, &self.layout, self.gravity),
        };
        self.cascade = Some(cascade);
        self.phase = Phase::Dropping;
    }

    fn update_dropping(&mut self, dt: f32) {
        let settled = match &mut self.cascade {
            Some(cascade) => cascade.step(dt),
            None => true,
        };
        if !settled {
            return;
        }
        self.cascade = None;
        let scan = self.rules.scan(&self.board, self.chain + 1);
        if scan.groups.is_empty() {
            self.chain = 0;
            self.resume_play();
        } else {
            self.begin_pop(scan);
        }
    }

    /// Returns control to the player once a settle produced no further match.
    fn resume_play(&mut self) {
        let mut blocked = false;
        match &mut self.control {
            Control::Swap { .. } => {
                if !self.rules.any_swap_match(&self.board) {
                    info!("no move available; regenerating the board");
                    if let SessionConfig::Jewel(cfg) = &self.config {
                        self.board = generator::generate(
                            cfg.cols,
                            cfg.rows,
                            0,
                            self.palette,
                            self.rules,
                            &mut self.rng,
                        );
                    }
                }
            }
            Control::Pair {
                active,
                queue,
                fall_timer,
                ..
            } => {
                *fall_timer = 0.0;
                let colors = queue.pop_next(&mut self.rng, self.palette);
                let pair = FallingPair::spawn(&self.board, colors);
                if pair.fits(&self.board) {
                    *active = Some(pair);
                } else {
                    blocked = true;
                }
            }
        }
        if blocked {
            self.finish();
        } else {
            self.phase = Phase::Playing;
        }
    }

    fn spawn_pair_if_needed(&mut self) {
        if let Control::Pair {
            active: active @ None,
            queue,
            fall_timer,
            ..
        } = &mut self.control
        {
            *fall_timer = 0.0;
            let colors = queue.pop_next(&mut self.rng, self.palette);
            *active = Some(FallingPair::spawn(&self.board, colors));
        }
    }

    /// Finalizes the session. The score is reported once, best-effort.
    fn finish(&mut self) {
        if self.phase.is_game_over() {
            return;
        }
        self.phase = Phase::GameOver;
        self.cascade = None;
        let score = self.stats.score();
        self.score_saved = Some(match self.hooks.on_score_save(score) {
            Ok(saved) => saved,
            Err(err) => {
                warn!("score-save hook failed: {err}");
                false
            }
        });
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    #[must_use]
    pub const fn chain(&self) -> u32 {
        self.chain
    }

    #[must_use]
    pub const fn rules(&self) -> MatchRules {
        self.rules
    }

    #[must_use]
    pub const fn clock_remaining(&self) -> Option<f32> {
        self.clock
    }

    #[must_use]
    pub const fn score_saved(&self) -> Option<bool> {
        self.score_saved
    }

    /// Cells currently playing the pop animation.
    #[must_use]
    pub fn pop_cells(&self) -> &[GridPos] {
        &self.pop_cells
    }

    /// Progress of the pop animation, 0 to 1.
    #[must_use]
    pub fn pop_progress(&self) -> f32 {
        (self.pop_elapsed / POP_DURATION).min(1.0)
    }

    /// Render-space vertical position of a cell, honoring the cascade.
    #[must_use]
    pub fn cell_pixel_y(&self, pos: GridPos) -> f32 {
        self.cascade
            .as_ref()
            .and_then(|cascade| cascade.pixel_y(pos))
            .unwrap_or_else(|| self.layout.grid_to_pixel(pos).y)
    }

    /// The in-flight swap as `(a, b, progress, reverting)`.
    #[must_use]
    pub fn swap_in_flight(&self) -> Option<(GridPos, GridPos, f32, bool)> {
        match &self.control {
            Control::Swap {
                pending: Some(swap),
            } => Some((swap.a, swap.b, swap.progress.min(1.0), swap.reverting)),
            _ => None,
        }
    }

    #[must_use]
    pub fn falling_pair(&self) -> Option<FallingPair> {
        match &self.control {
            Control::Pair { active, .. } => *active,
            Control::Swap { .. } => None,
        }
    }

    /// Upcoming pairs, soonest first. Empty for the swap variant.
    #[must_use]
    pub fn upcoming_pairs(&self) -> &[[GemColor; 2]] {
        match &self.control {
            Control::Pair { queue, .. } => queue.upcoming(),
            Control::Swap { .. } => &[],
        }
    }
}

fn seed_rng(seed: Option<u64>) -> Pcg64Mcg {
    Pcg64Mcg::seed_from_u64(seed.unwrap_or_else(rand::random))
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    /// Records hook invocations for assertions.
    #[derive(Debug, Default)]
    struct RecordingHooks {
        calls: Rc<RefCell<Vec<String>>>,
        fail_start: bool,
        fail_save: bool,
    }

    impl RecordingHooks {
        fn new() -> (Self, Rc<RefCell<Vec<String>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            (
                Self {
                    calls: calls.clone(),
                    fail_start: false,
                    fail_save: false,
                },
                calls,
            )
        }
    }

    impl SessionHooks for RecordingHooks {
        fn on_game_start(&mut self) -> Result<(), HookError> {
            self.calls.borrow_mut().push("start".into());
            if self.fail_start {
                return Err(HookError::new("no server"));
            }
            Ok(())
        }

        fn on_score_save(&mut self, score: usize) -> Result<bool, HookError> {
            self.calls.borrow_mut().push(format!("save {score}"));
            if self.fail_save {
                return Err(HookError::new("no server"));
            }
            Ok(true)
        }
    }

    fn seeded_jewel() -> GameSession {
        GameSession::jewel(JewelConfig {
            seed: Some(7),
            ..JewelConfig::default()
        })
    }

    fn run_until_idle(session: &mut GameSession) -> Vec<Phase> {
        let mut trace = vec![session.phase()];
        for _ in 0..10_000 {
            session.update(DT);
            if trace.last() != Some(&session.phase()) {
                trace.push(session.phase());
            }
            if matches!(session.phase(), Phase::Playing | Phase::GameOver) {
                return trace;
            }
        }
        panic!("session never returned to an idle phase");
    }

    #[test]
    fn start_runs_the_hook_and_builds_a_clean_board() {
        let (hooks, calls) = RecordingHooks::new();
        let mut session = GameSession::jewel_with_hooks(
            JewelConfig {
                seed: Some(3),
                ..JewelConfig::default()
            },
            Box::new(hooks),
        );
        assert!(session.phase().is_start());
        session.update(DT);
        assert!(session.phase().is_start(), "start waits for the command");

        session.start();
        assert!(session.phase().is_loading());
        session.update(DT);
        assert!(session.phase().is_playing());
        assert_eq!(calls.borrow().as_slice(), ["start"]);
        assert!(session.rules().find_groups(session.board()).is_empty());
        assert!(session.rules().any_swap_match(session.board()));
    }

    #[test]
    fn failed_start_hook_is_not_fatal() {
        let (mut hooks, calls) = RecordingHooks::new();
        hooks.fail_start = true;
        let mut session = GameSession::jewel_with_hooks(
            JewelConfig {
                seed: Some(3),
                ..JewelConfig::default()
            },
            Box::new(hooks),
        );
        session.start();
        session.update(DT);
        assert!(session.phase().is_playing());
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn invalid_swaps_are_ignored() {
        let mut session = seeded_jewel();
        session.start();
        session.update(DT);
        let before = session.board().clone();

        // Not adjacent.
        assert!(session
            .try_swap(GridPos::new(0, 0), GridPos::new(0, 2))
            .is_err());
        // Out of bounds.
        assert!(session
            .try_swap(GridPos::new(0, 7), GridPos::new(0, 8))
            .is_err());
        assert_eq!(session.board(), &before);
        assert!(session.phase().is_playing());
    }

    #[test]
    fn swap_input_is_rejected_during_animation_phases() {
        let mut session = seeded_jewel();
        session.start();
        session.update(DT);
        let (a, b) = find_matching_swap(&session).expect("generated board has a move");
        session.try_swap(a, b).unwrap();
        assert!(session.phase().is_swapping());
        assert!(session.try_swap(a, b).is_err());
    }

    #[test]
    fn matchless_swap_reverts_the_board_exactly() {
        let mut session = seeded_jewel();
        session.start();
        session.update(DT);
        let before = session.board().clone();
        let (a, b) = find_matchless_swap(&session).expect("some swap produces no match");

        session.try_swap(a, b).unwrap();
        assert!(session.phase().is_swapping());
        let trace = run_until_idle(&mut session);
        assert_eq!(trace, vec![Phase::Swapping, Phase::Playing]);
        assert_eq!(session.board(), &before);
        assert_eq!(session.stats().score(), 0);
    }

    #[test]
    fn matching_swap_scores_pops_and_cascades() {
        let mut session = seeded_jewel();
        session.start();
        session.update(DT);
        let (a, b) = find_matching_swap(&session).expect("generated board has a move");

        session.try_swap(a, b).unwrap();
        let trace = run_until_idle(&mut session);
        assert_eq!(&trace[..3], &[Phase::Swapping, Phase::Popping, Phase::Dropping]);
        assert!(session.stats().score() > 0);
        assert!(session.board().is_settled());
        assert!(session
            .board()
            .visible_positions()
            .all(|pos| session.board().get(pos).is_some()));
        // Chain is over once control returns.
        if session.phase().is_playing() {
            assert_eq!(session.chain(), 0);
        }
    }

    fn seeded_puyo() -> GameSession {
        let mut session = GameSession::puyo(PuyoConfig {
            seed: Some(1),
            ..PuyoConfig::default()
        });
        session.start();
        session.update(DT);
        assert!(session.phase().is_playing());
        session
    }

    #[test]
    fn pop_then_drop_chain_applies_multiplier_to_the_second_group_only() {
        // Popping the Sapphire square drops the two Emeralds in column 1 onto
        // the two resting in column 0's rows, completing a second square.
        let mut session = seeded_puyo();
        session.board = Board::from_glyphs(2, &[
            "......", //
            "......", //
            "......", //
            "......", //
            "......", //
            "......", //
            "......", //
            "......", //
            ".E....", //
            ".E....", //
            "ESS...", //
            "ESS...", //
        ]);
        let scan = session.rules.scan(&session.board, 1);
        assert_eq!(scan.groups.len(), 1);
        assert_eq!(scan.groups[0].color, GemColor::Sapphire);
        session.begin_pop(scan);

        let trace = run_until_idle(&mut session);
        assert_eq!(trace, vec![
            Phase::Popping,
            Phase::Dropping,
            Phase::Popping,
            Phase::Dropping,
            Phase::Playing,
        ]);
        // Group A: 4 cells at chain 1. Group B: 4 cells at chain 2, and only
        // B carries the chain tier.
        assert_eq!(session.stats().score(), 4 * 10 + 4 * 10 * 8);
        assert_eq!(session.stats().longest_chain(), 2);
        assert_eq!(session.chain(), 0);
        assert!(session.board().is_settled());
    }

    #[test]
    fn hard_drop_locks_and_routes_through_the_drop_phase() {
        let mut session = seeded_puyo();
        session.hard_drop_and_lock();
        assert!(session.phase().is_dropping());
        let trace = run_until_idle(&mut session);
        assert_eq!(trace.last(), Some(&Phase::Playing));
        let gems = session
            .board()
            .visible_positions()
            .filter(|&pos| session.board().get(pos).is_some())
            .count();
        assert_eq!(gems, 2);
        assert!(session.falling_pair().is_some(), "next pair spawned");
    }

    #[test]
    fn pair_input_moves_only_while_playing() {
        let mut session = seeded_puyo();
        assert!(session.try_move_left().is_ok());
        assert!(session.try_move_right().is_ok());
        assert!(session.try_rotate_cw().is_ok());
        session.toggle_pause();
        assert!(session.try_move_left().is_err());
        assert!(session.try_soft_drop().is_err());
        session.toggle_pause();
        assert!(session.try_move_left().is_ok());
    }

    #[test]
    fn blocked_spawn_ends_the_session() {
        let (hooks, calls) = RecordingHooks::new();
        let mut session = GameSession::puyo_with_hooks(
            PuyoConfig {
                seed: Some(2),
                ..PuyoConfig::default()
            },
            Box::new(hooks),
        );
        session.start();
        session.update(DT);
        // Fill the spawn column all the way through the staging rows.
        for row in 0..session.board().rows() {
            session.board.set(GridPos::new(row, 3), Some(GemColor::Ruby));
        }
        session.resume_play();
        assert!(session.phase().is_game_over());
        assert_eq!(session.score_saved(), Some(true));
        assert_eq!(calls.borrow().as_slice(), ["start", "save 0"]);
    }

    #[test]
    fn clock_expiry_finalizes_and_saves_once() {
        let (hooks, calls) = RecordingHooks::new();
        let mut session = GameSession::jewel_with_hooks(
            JewelConfig {
                seed: Some(5),
                time_limit: Some(0.5),
                ..JewelConfig::default()
            },
            Box::new(hooks),
        );
        session.start();
        session.update(DT);
        for _ in 0..60 {
            session.update(DT);
        }
        assert!(session.phase().is_game_over());
        assert_eq!(session.clock_remaining(), Some(0.0));
        assert_eq!(session.score_saved(), Some(true));
        let count_saves = || {
            calls
                .borrow()
                .iter()
                .filter(|call| call.starts_with("save"))
                .count()
        };
        assert_eq!(count_saves(), 1);
        // Updates after the end change nothing.
        session.update(DT);
        assert!(session.phase().is_game_over());
        assert_eq!(count_saves(), 1);
    }

    #[test]
    fn failed_save_hook_reports_unsaved() {
        let (mut hooks, _calls) = RecordingHooks::new();
        hooks.fail_save = true;
        let mut session = GameSession::jewel_with_hooks(
            JewelConfig {
                seed: Some(5),
                time_limit: Some(0.1),
                ..JewelConfig::default()
            },
            Box::new(hooks),
        );
        session.start();
        session.update(DT);
        for _ in 0..30 {
            session.update(DT);
        }
        assert!(session.phase().is_game_over());
        assert_eq!(session.score_saved(), Some(false));
    }

    #[test]
    fn pause_freezes_the_simulation() {
        let mut session = seeded_jewel();
        session.start();
        session.update(DT);
        session.toggle_pause();
        assert!(session.phase().is_paused());
        let time_before = session.stats().play_time();
        let clock_before = session.clock_remaining();
        for _ in 0..30 {
            session.update(DT);
        }
        assert_eq!(session.stats().play_time(), time_before);
        assert_eq!(session.clock_remaining(), clock_before);
        session.toggle_pause();
        assert!(session.phase().is_playing());
    }

    #[test]
    fn pause_is_unreachable_from_animation_phases() {
        let mut session = seeded_puyo();
        session.hard_drop_and_lock();
        assert!(session.phase().is_dropping());
        session.toggle_pause();
        assert!(session.phase().is_dropping());
    }

    #[test]
    fn reset_returns_to_the_start_screen() {
        let mut session = seeded_jewel();
        session.start();
        session.update(DT);
        let (a, b) = find_matching_swap(&session).expect("generated board has a move");
        session.try_swap(a, b).unwrap();
        run_until_idle(&mut session);
        assert!(session.stats().score() > 0);

        session.reset();
        assert!(session.phase().is_start());
        assert_eq!(session.stats().score(), 0);
        assert_eq!(session.chain(), 0);
        assert_eq!(session.score_saved(), None);
    }

    fn find_matching_swap(session: &GameSession) -> Option<(GridPos, GridPos)> {
        find_swap(session, true)
    }

    fn find_matchless_swap(session: &GameSession) -> Option<(GridPos, GridPos)> {
        find_swap(session, false)
    }

    fn find_swap(session: &GameSession, want_match: bool) -> Option<(GridPos, GridPos)> {
        let board = session.board();
        let mut scratch = board.clone();
        for pos in board.visible_positions() {
            for other in [
                GridPos::new(pos.row, pos.col + 1),
                GridPos::new(pos.row + 1, pos.col),
            ] {
                if !board.is_visible(other) || board.get(pos) == board.get(other) {
                    continue;
                }
                scratch.swap(pos, other);
                let matched = !session.rules().find_groups(&scratch).is_empty();
                scratch.swap(pos, other);
                if matched == want_match {
                    return Some((pos, other));
                }
            }
        }
        None
    }
}
