use gemfall_engine::{GameSession, GridPos, ScorePopup};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::{GemDisplay, style};

/// The play field: settled gems, cells in transit, the falling pair, the
/// cursor, and floating score popups.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    session: &'a GameSession,
    cursor: Option<GridPos>,
    selected: Option<GridPos>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self {
            session,
            cursor: None,
            selected: None,
            block: None,
        }
    }

    pub fn cursor(self, cursor: Option<GridPos>) -> Self {
        Self { cursor, ..self }
    }

    pub fn selected(self, selected: Option<GridPos>) -> Self {
        Self { selected, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        let cols = u16::try_from(self.session.board().cols()).unwrap_or(u16::MAX);
        cols * GemDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        let rows = u16::try_from(self.session.board().visible_rows()).unwrap_or(u16::MAX);
        rows * GemDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let session = self.session;
        let board = session.board();
        let cell_size = session.layout().cell_size();
        let hidden = board.hidden_rows() as i32;

        for row in 0..board.visible_rows() {
            for col in 0..board.cols() {
                if let Some(rect) = cell_rect(area, row as i32, col as i32) {
                    GemDisplay::empty().render(rect, buf);
                }
            }
        }

        let swap = session.swap_in_flight();
        for pos in board.visible_positions() {
            let Some(color) = board.get(pos) else {
                continue;
            };
            let mut row_f = session.cell_pixel_y(pos) / cell_size;
            let mut col_f = pos.col as f32;
            // A cell in an active swap glides between the two endpoints; the
            // board already holds the destination colors.
            if let Some((a, b, progress, _)) = swap {
                let from = match pos {
                    _ if pos == a => Some(b),
                    _ if pos == b => Some(a),
                    _ => None,
                };
                if let Some(from) = from {
                    row_f = lerp(
                        (from.row as i32 - hidden) as f32,
                        (pos.row as i32 - hidden) as f32,
                        progress,
                    );
                    col_f = lerp(from.col as f32, pos.col as f32, progress);
                }
            }
            #[expect(clippy::cast_possible_truncation)]
            let (row, col) = (row_f.round() as i32, col_f.round() as i32);
            let Some(rect) = cell_rect(area, row, col) else {
                continue;
            };
            let display = if session.pop_cells().contains(&pos) {
                GemDisplay::popping(color, session.pop_progress())
            } else {
                GemDisplay::gem(color)
            };
            display.render(rect, buf);
        }

        if let Some(pair) = session.falling_pair() {
            for (pos, color) in pair.cells() {
                let row = pos.row as i32 - hidden;
                if let Some(rect) = cell_rect(area, row, pos.col as i32) {
                    GemDisplay::gem(color).render(rect, buf);
                }
            }
        }

        if let Some(selected) = self.selected
            && let Some(color) = board.get(selected)
            && let Some(rect) = cell_rect(area, selected.row as i32 - hidden, selected.col as i32)
        {
            GemDisplay::selected(color).render(rect, buf);
        }
        if let Some(cursor) = self.cursor
            && let Some(color) = board.get(cursor)
            && let Some(rect) = cell_rect(area, cursor.row as i32 - hidden, cursor.col as i32)
        {
            GemDisplay::cursor(color).render(rect, buf);
        }

        // Score popups drift upward as they age.
        for popup in session.stats().popups() {
            #[expect(clippy::cast_possible_truncation)]
            let lift = (popup.age / ScorePopup::LIFETIME * 2.0) as i32;
            let row = popup.pos.row as i32 - hidden - lift;
            let col = popup.pos.col as i32;
            let Some(rect) = cell_rect(area, row, col) else {
                continue;
            };
            let text = if popup.chain > 1 {
                format!("+{} x{}", popup.amount, popup.chain)
            } else {
                format!("+{}", popup.amount)
            };
            let max_width = (area.right() - rect.x) as usize;
            buf.set_stringn(rect.x, rect.y, text, max_width, style::POPUP);
        }
    }
}

fn cell_rect(area: Rect, row: i32, col: i32) -> Option<Rect> {
    if row < 0 || col < 0 {
        return None;
    }
    let x = area.x + u16::try_from(col).ok()? * GemDisplay::width();
    let y = area.y + u16::try_from(row).ok()? * GemDisplay::height();
    if y >= area.bottom() || x + GemDisplay::width() > area.right() {
        return None;
    }
    Some(Rect::new(x, y, GemDisplay::width(), GemDisplay::height()))
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
