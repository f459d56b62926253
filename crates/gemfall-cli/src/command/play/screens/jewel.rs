use crossterm::event::{Event, KeyCode};
use gemfall_engine::{GameSession, GridPos, JewelConfig, SessionHooks};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
};

use crate::ui::widgets::SessionDisplay;

#[derive(Debug)]
pub struct JewelScreen {
    session: GameSession,
    cursor: GridPos,
    selected: Option<GridPos>,
    is_exiting: bool,
}

impl JewelScreen {
    pub fn new(config: JewelConfig, hooks: Box<dyn SessionHooks>) -> Self {
        let cursor = GridPos::new(config.rows / 2, config.cols / 2);
        Self {
            session: GameSession::jewel_with_hooks(config, hooks),
            cursor,
            selected: None,
            is_exiting: false,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.is_exiting
    }

    pub fn update(&mut self, dt: f32) {
        self.session.update(dt);
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let show_cursor = self.session.phase().is_playing();
        let session_display = SessionDisplay::new(&self.session)
            .cursor(show_cursor.then_some(self.cursor))
            .selected(self.selected.filter(|_| show_cursor));
        let help_text = match self.session.phase() {
            phase if phase.is_playing() => {
                "Controls: ← ↑ → ↓ (Cursor) | Space (Select / Swap) | P (Pause) | R (Reset) | Q (Quit)"
            }
            phase if phase.is_paused() => "Controls: P / S (Resume) | Q (Quit)",
            phase if phase.is_game_over() => "Controls: R (Restart) | Q (Quit)",
            phase if phase.is_start() => "Controls: S (Start) | Q (Quit)",
            _ => "",
        };
        let help_text = Text::from(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .centered();

        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(help_text, help_area);
    }

    pub fn handle_event(&mut self, event: &Event) {
        let is_playing = self.session.phase().is_playing();

        if let Some(event) = event.as_key_event() {
            match event.code {
                KeyCode::Left if is_playing => self.move_cursor(0, -1),
                KeyCode::Right if is_playing => self.move_cursor(0, 1),
                KeyCode::Up if is_playing => self.move_cursor(-1, 0),
                KeyCode::Down if is_playing => self.move_cursor(1, 0),
                KeyCode::Char(' ') | KeyCode::Enter if is_playing => self.confirm(),
                KeyCode::Char('s') => self.start_or_resume(),
                KeyCode::Char('p') => self.session.toggle_pause(),
                KeyCode::Char('r') => {
                    self.session.reset();
                    self.selected = None;
                }
                KeyCode::Char('q') => self.is_exiting = true,
                _ => {}
            }
        }
    }

    fn start_or_resume(&mut self) {
        if self.session.phase().is_start() {
            self.session.start();
        } else if self.session.phase().is_paused() {
            self.session.toggle_pause();
        }
    }

    fn move_cursor(&mut self, drow: i32, dcol: i32) {
        let board = self.session.board();
        let row = self.cursor.row.saturating_add_signed(drow as isize);
        let col = self.cursor.col.saturating_add_signed(dcol as isize);
        let moved = GridPos::new(
            row.clamp(board.hidden_rows(), board.rows() - 1),
            col.min(board.cols() - 1),
        );
        self.cursor = moved;
    }

    /// Space on an empty selection picks the cursor cell; on an adjacent cell
    /// it requests the swap. Anything else just moves the selection.
    fn confirm(&mut self) {
        match self.selected {
            None => self.selected = Some(self.cursor),
            Some(selected) if selected == self.cursor => self.selected = None,
            Some(selected) if selected.distance(self.cursor) == 1 => {
                let _ = self.session.try_swap(selected, self.cursor);
                self.selected = None;
            }
            Some(_) => self.selected = Some(self.cursor),
        }
    }
}
