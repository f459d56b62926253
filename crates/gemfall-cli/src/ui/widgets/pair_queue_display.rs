use gemfall_engine::GameSession;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::GemDisplay;

/// Upcoming pairs, soonest on top, satellite gem above the pivot.
#[derive(Debug)]
pub struct PairQueueDisplay<'a> {
    session: &'a GameSession,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PairQueueDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self {
            session,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        GemDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        let pairs = u16::try_from(self.session.upcoming_pairs().len()).unwrap_or(0);
        pairs * 3 + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for PairQueueDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PairQueueDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        for (slot, pair) in self.session.upcoming_pairs().iter().enumerate() {
            let y = area.y + u16::try_from(slot * 3).unwrap_or(u16::MAX);
            for (offset, color) in [(0, pair[1]), (1, pair[0])] {
                let y = y + offset;
                if y >= area.bottom() || area.x + GemDisplay::width() > area.right() {
                    continue;
                }
                let rect = Rect::new(area.x, y, GemDisplay::width(), GemDisplay::height());
                GemDisplay::gem(color).render(rect, buf);
            }
        }
    }
}
