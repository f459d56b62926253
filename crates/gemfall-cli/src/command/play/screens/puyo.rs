use crossterm::event::{Event, KeyCode};
use gemfall_engine::{GameSession, PuyoConfig, SessionHooks};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
};

use crate::ui::widgets::SessionDisplay;

#[derive(Debug)]
pub struct PuyoScreen {
    session: GameSession,
    is_exiting: bool,
}

impl PuyoScreen {
    pub fn new(config: PuyoConfig, hooks: Box<dyn SessionHooks>) -> Self {
        Self {
            session: GameSession::puyo_with_hooks(config, hooks),
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
        let session_display = SessionDisplay::new(&self.session);
        let help_text = match self.session.phase() {
            phase if phase.is_playing() => {
                "Controls: ← → (Move) | ↑ X Z (Rotate) | ↓ (Soft Drop) | Space (Hard Drop) | P (Pause) | Q (Quit)"
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
                KeyCode::Left if is_playing => _ = self.session.try_move_left(),
                KeyCode::Right if is_playing => _ = self.session.try_move_right(),
                KeyCode::Down if is_playing => _ = self.session.try_soft_drop(),
                KeyCode::Up if is_playing => _ = self.session.try_rotate_cw(),
                KeyCode::Char('x') if is_playing => _ = self.session.try_rotate_cw(),
                KeyCode::Char('z') if is_playing => _ = self.session.try_rotate_ccw(),
                KeyCode::Char(' ') if is_playing => self.session.hard_drop_and_lock(),
                KeyCode::Char('s') => self.start_or_resume(),
                KeyCode::Char('p') => self.session.toggle_pause(),
                KeyCode::Char('r') => self.session.reset(),
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
}
