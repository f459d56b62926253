use gemfall_engine::GemColor;
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};

use crate::ui::widgets::style;

/// One board cell: a style plus a short glyph, rendered two columns wide.
#[derive(Debug)]
pub struct GemDisplay {
    style: Style,
    symbol: &'static str,
}

impl GemDisplay {
    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub fn width() -> u16 {
        2
    }

    pub fn height() -> u16 {
        1
    }

    pub fn empty() -> Self {
        Self::new(style::EMPTY_DOT, ".")
    }

    pub fn gem(color: GemColor) -> Self {
        Self::new(style::gem(color), "")
    }

    /// A gem mid-pop: solid, then hollow, then almost gone.
    pub fn popping(color: GemColor, progress: f32) -> Self {
        if progress < 0.4 {
            Self::new(style::gem(color), "")
        } else if progress < 0.8 {
            Self::new(style::gem_outline(color), "[]")
        } else {
            Self::new(style::gem_outline(color), "··")
        }
    }

    pub fn cursor(color: GemColor) -> Self {
        Self::new(style::cursor(color), "[]")
    }

    pub fn selected(color: GemColor) -> Self {
        Self::new(style::selected(color), "><")
    }
}

impl Widget for GemDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &GemDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        // A Paragraph fills the whole cell, not just the glyph columns.
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
