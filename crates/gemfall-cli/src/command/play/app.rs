use std::time::Duration;

use crossterm::event::Event;
use gemfall_engine::{JewelConfig, PuyoConfig, SessionHooks};
use ratatui::Frame;
use ratatui_runtime::{App, RenderMode, Runtime};

use crate::command::play::screens::Screen;

const FPS: f64 = 60.0;

#[derive(Debug)]
pub struct PlayApp {
    screen: Screen,
}

impl PlayApp {
    pub fn jewel(config: JewelConfig, hooks: Box<dyn SessionHooks>) -> Self {
        Self {
            screen: Screen::jewel(config, hooks),
        }
    }

    pub fn puyo(config: PuyoConfig, hooks: Box<dyn SessionHooks>) -> Self {
        Self {
            screen: Screen::puyo(config, hooks),
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_rate(Some(FPS));
        runtime.set_render_mode(RenderMode::throttled_from_rate(FPS));
    }

    fn should_exit(&self) -> bool {
        self.screen.should_exit()
    }

    fn handle_event(&mut self, _runtime: &mut Runtime, event: Event) {
        self.screen.handle_event(&event);
    }

    fn draw(&self, frame: &mut Frame) {
        self.screen.draw(frame);
    }

    fn update(&mut self, _runtime: &mut Runtime, dt: Duration) {
        self.screen.update(dt.as_secs_f32());
    }
}
