use analysis::summary::{MoveCategory, SummaryTable};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// The per-player move-quality table with its headline averages.
pub struct SummaryTablePanel<'a> {
    pub table: &'a SummaryTable,
}

fn category_color(category: MoveCategory) -> Color {
    match category {
        MoveCategory::Excellent => Color::Cyan,
        MoveCategory::Great => Color::LightGreen,
        MoveCategory::Good => Color::White,
        MoveCategory::Inaccuracy => Color::Yellow,
        MoveCategory::Mistake => Color::Magenta,
        MoveCategory::Blunder => Color::Red,
    }
}

fn percent_cell(percent: Option<f64>) -> String {
    match percent {
        Some(p) => format!("{:>5.1}%", p),
        None => "     -".to_string(),
    }
}

impl Widget for SummaryTablePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().title(" Summary ").borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        if self.table.rows.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "Summary unavailable for this review",
                Style::default().fg(Color::DarkGray),
            )))
            .render(inner, buf);
            return;
        }

        let mut lines: Vec<Line<'static>> = vec![Line::from(Span::styled(
            format!("{:<12}{:>6} {:>6}  {:>6} {:>6}", "", "Black", "", "White", ""),
            Style::default().add_modifier(Modifier::BOLD),
        ))];

        for row in &self.table.rows {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<12}", row.category.label()),
                    Style::default().fg(category_color(row.category)),
                ),
                Span::raw(format!("{:>6} ", row.black_count)),
                Span::raw(percent_cell(row.black_percent)),
                Span::raw(format!("  {:>4} ", row.white_count)),
                Span::raw(percent_cell(row.white_percent)),
            ]));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("Avg loss    ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!(
                "{:>6.1}        {:>6.1}",
                self.table.avg_score_loss[0], self.table.avg_score_loss[1]
            )),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Median loss ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!(
                "{:>6}        {:>6}",
                median_cell(self.table.median_score_loss[0]),
                median_cell(self.table.median_score_loss[1])
            )),
        ]));

        if self.table.moves_pending > 0 {
            lines.push(Line::from(Span::styled(
                format!(
                    "{} of {} positions still streaming",
                    self.table.moves_pending, self.table.max_entries
                ),
                Style::default().fg(Color::DarkGray),
            )));
        }
        if !self.table.consistent {
            lines.push(Line::from(Span::styled(
                "Review does not cover the whole game",
                Style::default().fg(Color::Yellow),
            )));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

/// A median of -1 means the player has no counted moves yet.
fn median_cell(median: f64) -> String {
    if median < 0.0 {
        "-".to_string()
    } else {
        format!("{:.1}", median)
    }
}
