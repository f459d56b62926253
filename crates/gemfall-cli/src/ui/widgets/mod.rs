use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{
    board_display::*, gem_display::*, pair_queue_display::*, session_display::*,
    session_stats_display::*,
};

mod board_display;
mod gem_display;
mod pair_queue_display;
mod session_display;
mod session_stats_display;

mod color {
    use gemfall_engine::GemColor;
    use ratatui::style::Color;

    pub const RED: Color = Color::Rgb(225, 50, 80);
    pub const ORANGE: Color = Color::Rgb(255, 150, 40);
    pub const YELLOW: Color = Color::Rgb(245, 220, 50);
    pub const GREEN: Color = Color::Rgb(60, 210, 100);
    pub const BLUE: Color = Color::Rgb(60, 130, 245);
    pub const MAGENTA: Color = Color::Rgb(190, 90, 230);
    pub const GRAY: Color = Color::Rgb(127, 127, 127);
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);

    pub const fn of(gem: GemColor) -> Color {
        match gem {
            GemColor::Ruby => RED,
            GemColor::Amber => ORANGE,
            GemColor::Topaz => YELLOW,
            GemColor::Emerald => GREEN,
            GemColor::Sapphire => BLUE,
            GemColor::Amethyst => MAGENTA,
        }
    }
}

pub mod style {
    use gemfall_engine::GemColor;
    use ratatui::style::{Color, Style};

    use crate::ui::widgets::color;

    const fn fg_bg(fg: Color, bg: Color) -> Style {
        Style::new().fg(fg).bg(bg)
    }

    const fn bg_only(color: Color) -> Style {
        Style::new().fg(color).bg(color)
    }

    pub const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    pub const EMPTY_DOT: Style = fg_bg(color::GRAY, color::BLACK);
    pub const POPUP: Style = fg_bg(color::YELLOW, color::BLACK);

    pub const fn gem(gem: GemColor) -> Style {
        bg_only(color::of(gem))
    }

    /// Outline look for a gem mid-pop: colored glyph on the board background.
    pub const fn gem_outline(gem: GemColor) -> Style {
        fg_bg(color::of(gem), color::BLACK)
    }

    pub const fn cursor(gem: GemColor) -> Style {
        fg_bg(color::WHITE, color::of(gem))
    }

    pub const fn selected(gem: GemColor) -> Style {
        fg_bg(color::BLACK, color::of(gem))
    }
}

fn block_vertical_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.height - inner_rect.height
}

fn block_horizontal_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.width - inner_rect.width
}
