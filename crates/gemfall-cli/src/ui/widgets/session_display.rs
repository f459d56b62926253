use gemfall_engine::{GameSession, GridPos, Phase};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::ui::widgets::{BoardDisplay, PairQueueDisplay, SessionStatsDisplay, style};

/// The full play view: board, stats, pair preview, and the phase overlay.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    session: &'a GameSession,
    cursor: Option<GridPos>,
    selected: Option<GridPos>,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self {
            session,
            cursor: None,
            selected: None,
        }
    }

    pub fn cursor(self, cursor: Option<GridPos>) -> Self {
        Self { cursor, ..self }
    }

    pub fn selected(self, selected: Option<GridPos>) -> Self {
        Self { selected, ..self }
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let session = self.session;
        let border_style = match session.phase() {
            Phase::Start | Phase::Loading => Style::new().fg(Color::DarkGray),
            Phase::Paused => Style::new().fg(Color::Yellow),
            Phase::GameOver => Style::new().fg(Color::Red),
            _ => Style::new().fg(Color::White),
        };
        let block_padding = Padding::symmetric(1, 0);

        let game_board = BoardDisplay::new(session)
            .cursor(self.cursor)
            .selected(self.selected)
            .block(
                Block::bordered()
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
        let session_stats = SessionStatsDisplay::new(session).block(
            Block::bordered()
                .title(Line::from("STATS").centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT),
        );
        let pair_queue = (!session.upcoming_pairs().is_empty()).then(|| {
            PairQueueDisplay::new(session).block(
                Block::bordered()
                    .title(Line::from("NEXT").centered())
                    .padding(block_padding)
                    .border_style(border_style)
                    .style(style::DEFAULT),
            )
        });

        let [stats_column, board_column, queue_column] = Layout::horizontal([
            Constraint::Length(session_stats.width()),
            Constraint::Length(game_board.width()),
            Constraint::Length(pair_queue.as_ref().map_or(0, PairQueueDisplay::width)),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas::<3>(area);

        let [stats_area] =
            Layout::vertical([Constraint::Length(session_stats.height())]).areas(stats_column);
        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(board_column);

        let board_width = game_board.width();
        session_stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        if let Some(pair_queue) = pair_queue {
            let [queue_area] =
                Layout::vertical([Constraint::Length(pair_queue.height())]).areas(queue_column);
            pair_queue.render(queue_area, buf);
        }

        let overlay = overlay_lines(session);
        if let Some((lines, style)) = overlay {
            let height = u16::try_from(lines.len()).unwrap_or(u16::MAX) + 2;
            let block = Block::new().style(style);
            let text_height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
            let text = Text::from(lines).style(style).centered();
            let area = board_area.centered(
                Constraint::Length(board_width),
                Constraint::Length(height),
            );
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(
                inner.centered_vertically(Constraint::Length(text_height)),
                buf,
            );
        }
    }
}

/// HUD overlay contents for the non-play phases.
fn overlay_lines(session: &GameSession) -> Option<(Vec<Line<'static>>, Style)> {
    match session.phase() {
        Phase::Start => Some((
            vec![Line::from("READY?"), Line::from("PRESS S TO START")],
            Style::new().fg(Color::Black).bg(Color::Cyan),
        )),
        Phase::Loading => Some((
            vec![Line::from("LOADING...")],
            Style::new().fg(Color::Black).bg(Color::Cyan),
        )),
        Phase::Paused => Some((
            vec![Line::from("PAUSED")],
            Style::new().fg(Color::Black).bg(Color::Yellow),
        )),
        Phase::GameOver => {
            let mut lines = vec![
                Line::from("GAME OVER!!"),
                Line::from(format!("SCORE {}", session.stats().score())),
            ];
            match session.score_saved() {
                Some(true) => lines.push(Line::from("score saved")),
                Some(false) => lines.push(Line::from("score not saved")),
                None => {}
            }
            lines.push(Line::from("R TO RESTART"));
            Some((lines, Style::new().fg(Color::White).bg(Color::Red)))
        }
        _ => None,
    }
}
