use crossterm::event::Event;
use gemfall_engine::{JewelConfig, PuyoConfig, SessionHooks};
use ratatui::Frame;

use crate::command::play::screens::{jewel::JewelScreen, puyo::PuyoScreen};

mod jewel;
mod puyo;

#[derive(Debug)]
pub enum Screen {
    Jewel(JewelScreen),
    Puyo(PuyoScreen),
}

impl Screen {
    pub fn jewel(config: JewelConfig, hooks: Box<dyn SessionHooks>) -> Self {
        Screen::Jewel(JewelScreen::new(config, hooks))
    }

    pub fn puyo(config: PuyoConfig, hooks: Box<dyn SessionHooks>) -> Self {
        Screen::Puyo(PuyoScreen::new(config, hooks))
    }

    pub fn should_exit(&self) -> bool {
        match self {
            Screen::Jewel(screen) => screen.should_exit(),
            Screen::Puyo(screen) => screen.should_exit(),
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        match self {
            Screen::Jewel(screen) => screen.handle_event(event),
            Screen::Puyo(screen) => screen.handle_event(event),
        }
    }

    pub fn update(&mut self, dt: f32) {
        match self {
            Screen::Jewel(screen) => screen.update(dt),
            Screen::Puyo(screen) => screen.update(dt),
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self {
            Screen::Jewel(screen) => screen.draw(frame),
            Screen::Puyo(screen) => screen.draw(frame),
        }
    }
}
