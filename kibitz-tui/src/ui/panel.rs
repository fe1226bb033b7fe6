use analysis::types::{engine_display_name, short_network_version, strength_tier};
use analysis::worst_moves::WorstMoveEntry;
use analysis::AiReview;
use baduk::{Move, Player};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// How many key moves are listed before collapsing to "+N more".
const KEY_MOVES_SHOWN: usize = 6;

/// Review metadata, current estimates and the key-moves list.
pub struct ReviewInfoPanel<'a> {
    pub review: Option<&'a AiReview>,
    pub reviews: &'a [AiReview],
    pub selected: Option<usize>,
    /// A requested review is queued server-side.
    pub reviewing: bool,
    pub key_moves: &'a [WorstMoveEntry],
    pub win_rate: f64,
    pub score: f64,
    pub use_score: bool,
    pub board_height: u8,
    /// Feedback on the last user action, e.g. a refused request.
    pub status: Option<&'a str>,
}

impl Widget for ReviewInfoPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().title(" AI Review ").borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(review) = self.review else {
            let text = if self.reviewing {
                "Queued for analysis..."
            } else {
                "No review available"
            };
            let mut lines = vec![Line::from(Span::styled(
                text,
                Style::default().fg(Color::DarkGray),
            ))];
            if let Some(status) = self.status {
                lines.push(Line::from(Span::styled(
                    status.to_string(),
                    Style::default().fg(Color::Yellow),
                )));
            }
            Paragraph::new(lines).render(inner, buf);
            return;
        };

        let mut lines: Vec<Line<'static>> = Vec::new();

        let tier = strength_tier(review);
        let stars = match tier {
            Some(tier) => "\u{2605}".repeat(tier as usize + 1),
            None => "fast".to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled(
                engine_display_name(&review.engine).to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" {} ", short_network_version(&review.network))),
            Span::styled(stars, Style::default().fg(Color::Yellow)),
            Span::raw(format!(
                "  [{}/{}]",
                self.selected.map(|i| i + 1).unwrap_or(0),
                self.reviews.len()
            )),
        ]));

        if let Some(error) = review.error.as_deref() {
            lines.push(Line::from(Span::styled(
                format!("Analysis failed: {}", error),
                Style::default().fg(Color::Red),
            )));
        } else if self.use_score && review.scores.is_some() {
            let (leader, margin) = if self.score >= 0.0 {
                (Player::Black, self.score)
            } else {
                (Player::White, -self.score)
            };
            lines.push(Line::from(format!("{} by {:.1} points", leader, margin)));
        } else {
            lines.push(Line::from(format!(
                "Black {:.1}%  White {:.1}%",
                100.0 * self.win_rate,
                100.0 * (1.0 - self.win_rate)
            )));
        }

        if !self.key_moves.is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                "Key Moves",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )));
            for entry in self.key_moves.iter().take(KEY_MOVES_SHOWN) {
                let coord = match entry.mv {
                    Move::Place(c) => c.pretty(self.board_height),
                    Move::Pass => "pass".to_string(),
                };
                let color = match entry.player {
                    Player::Black => Color::White,
                    Player::White => Color::Gray,
                };
                lines.push(Line::from(vec![
                    Span::raw(format!("  {:>3}. ", entry.move_number)),
                    Span::styled(format!("{:<4}", coord), Style::default().fg(color)),
                    Span::styled(
                        format!(" -{:.1}", entry.delta),
                        Style::default().fg(Color::Red),
                    ),
                ]));
            }
            let more = self.key_moves.len().saturating_sub(KEY_MOVES_SHOWN);
            if more > 0 {
                lines.push(Line::from(Span::styled(
                    format!("  +{} more", more),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }

        if let Some(status) = self.status {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                status.to_string(),
                Style::default().fg(Color::Yellow),
            )));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
