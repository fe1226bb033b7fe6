use analysis::{AiReview, ReviewChartEntry};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Win-rate (or score) trajectory over the whole game, with the key moves
/// and the current position picked out in color. Interactive variation
/// results along the current line overlay the trunk trajectory.
pub struct ReviewChart<'a> {
    pub review: &'a AiReview,
    pub current_move: u32,
    pub use_score: bool,
    /// Move numbers of the highlighted worst moves.
    pub key_moves: &'a [u32],
    pub variation: &'a [ReviewChartEntry],
}

impl Widget for ReviewChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.use_score && self.review.scores.is_some() {
            " Score "
        } else {
            " Win Rate "
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        let width = (inner.width as usize).saturating_sub(2);
        let lines = if self.use_score && self.review.scores.is_some() {
            let scores = self.review.scores.as_deref().unwrap_or(&[]);
            let overlay: Vec<(u32, f64)> = self
                .variation
                .iter()
                .map(|e| (e.move_number, e.score))
                .collect();
            build_score_graph(scores, width, self.current_move, self.key_moves, &overlay)
        } else {
            let win_rates: Vec<f64> = self
                .review
                .win_rates
                .iter()
                .map(|w| w.unwrap_or(self.review.win_rate))
                .collect();
            let overlay: Vec<(u32, f64)> = self
                .variation
                .iter()
                .map(|e| (e.move_number, e.win_rate))
                .collect();
            build_win_rate_graph(&win_rates, width, self.current_move, self.key_moves, &overlay)
        };
        Paragraph::new(lines).render(inner, buf);
    }
}

const GRAPH_HEIGHT: usize = 5;

// Block characters for bar rendering (bottom to top within a cell)
const BLOCKS: [char; 9] = [
    ' ', '\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}',
    '\u{2588}',
];

fn column_color(
    move_number: u32,
    current_move: u32,
    key_moves: &[u32],
    default: Color,
) -> Color {
    if move_number == current_move {
        Color::Cyan
    } else if key_moves.contains(&move_number) {
        Color::Red
    } else {
        default
    }
}

/// Sparkline of black's win rate, filled from the bottom. One column per
/// sampled move. Columns covered by a variation datapoint draw that value
/// in magenta instead of the trunk value.
pub fn build_win_rate_graph(
    values: &[f64],
    width: usize,
    current_move: u32,
    key_moves: &[u32],
    variation: &[(u32, f64)],
) -> Vec<Line<'static>> {
    if values.is_empty() || width == 0 {
        return vec![];
    }

    let total = values.len();
    let cols: Vec<(u32, f64, bool)> = (0..width.min(total).max(1))
        .map(|col| {
            let idx = (col * total / width.min(total).max(1)).min(total - 1);
            match variation.iter().find(|(n, _)| *n as usize == idx) {
                Some(&(_, value)) => (idx as u32, value.clamp(0.0, 1.0), true),
                None => (idx as u32, values[idx].clamp(0.0, 1.0), false),
            }
        })
        .collect();

    let max_sub = (GRAPH_HEIGHT * 8) as f64;
    let mut rows = Vec::with_capacity(GRAPH_HEIGHT);
    for row in 0..GRAPH_HEIGHT {
        let mut spans: Vec<Span<'static>> = vec![Span::raw(" ")];
        for &(move_number, value, from_variation) in &cols {
            let fill_sub = (value * max_sub).clamp(0.0, max_sub) as usize;
            let row_bottom = (GRAPH_HEIGHT - 1 - row) * 8;
            let row_top = row_bottom + 8;
            let block_char = if fill_sub >= row_top {
                '\u{2588}'
            } else if fill_sub <= row_bottom {
                ' '
            } else {
                BLOCKS[fill_sub - row_bottom]
            };
            let default = if from_variation {
                Color::Magenta
            } else {
                Color::Gray
            };
            let fg = column_color(move_number, current_move, key_moves, default);
            spans.push(Span::styled(block_char.to_string(), Style::default().fg(fg)));
        }
        rows.push(Line::from(spans));
    }
    rows
}

/// Score sparkline around a midline, positive (black ahead) above. Scores
/// are clamped to +/-20 points.
pub fn build_score_graph(
    scores: &[f64],
    width: usize,
    current_move: u32,
    key_moves: &[u32],
    variation: &[(u32, f64)],
) -> Vec<Line<'static>> {
    if scores.is_empty() || width == 0 {
        return vec![];
    }

    let total = scores.len();
    let cols: Vec<(u32, f64, bool)> = (0..width.min(total).max(1))
        .map(|col| {
            let idx = (col * total / width.min(total).max(1)).min(total - 1);
            match variation.iter().find(|(n, _)| *n as usize == idx) {
                Some(&(_, score)) => (idx as u32, score.clamp(-20.0, 20.0), true),
                None => (idx as u32, scores[idx].clamp(-20.0, 20.0), false),
            }
        })
        .collect();

    let mid = GRAPH_HEIGHT / 2;
    let max_sub = (GRAPH_HEIGHT * 8) as f64;
    let mid_sub = (mid * 8) as f64;

    let mut rows = Vec::with_capacity(GRAPH_HEIGHT);
    for row in 0..GRAPH_HEIGHT {
        let mut spans: Vec<Span<'static>> = vec![Span::raw(" ")];
        for &(move_number, score, from_variation) in &cols {
            let fill_sub = (mid_sub + (score / 20.0) * mid_sub).clamp(0.0, max_sub) as usize;
            let row_bottom = (GRAPH_HEIGHT - 1 - row) * 8;
            let row_top = row_bottom + 8;
            let block_char = if fill_sub >= row_top {
                '\u{2588}'
            } else if fill_sub <= row_bottom {
                ' '
            } else {
                BLOCKS[fill_sub - row_bottom]
            };
            let default = if from_variation {
                Color::Magenta
            } else if row <= mid {
                Color::White
            } else {
                Color::Gray
            };
            let fg = column_color(move_number, current_move, key_moves, default);
            spans.push(Span::styled(block_char.to_string(), Style::default().fg(fg)));
        }
        rows.push(Line::from(spans));
    }
    rows
}
