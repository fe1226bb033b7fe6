use analysis::annotate::{BoardAnnotations, CircleKind, MarkKind};
use baduk::{Board, Coord, Player};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Widget},
};

/// The goban with the review overlay: stones, heatmap shading, delta labels,
/// move marks and ghost stones for the matched AI line.
pub struct GobanPanel<'a> {
    pub board: &'a Board,
    pub annotations: Option<&'a BoardAnnotations>,
    /// Side to move at the displayed position; ghost stones alternate
    /// starting with this color.
    pub ghost_first: Player,
    pub last_move: Option<Coord>,
}

impl Widget for GobanPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().title(" Board ").borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        let width = self.board.width() as u16;
        let height = self.board.height() as u16;
        if inner.width < width * 2 || inner.height < height {
            return;
        }

        for y in 0..height {
            for x in 0..width {
                let coord = Coord::new(x as u8, y as u8);
                let cell = self.cell(coord);
                let screen_x = inner.x + x * 2;
                let screen_y = inner.y + y;
                buf.set_string(screen_x, screen_y, cell.text, cell.style);
            }
        }
    }
}

struct Cell {
    text: String,
    style: Style,
}

impl GobanPanel<'_> {
    fn cell(&self, coord: Coord) -> Cell {
        let mut style = Style::default();

        if let Some(ann) = self.annotations {
            if let Some(heatmap) = ann.heatmap.as_ref() {
                let intensity = heatmap[coord.y as usize][coord.x as usize];
                if intensity > 0.0 {
                    style = style.bg(heat_color(intensity));
                }
            }
        }

        if let Some(player) = self.board.stone_at(coord) {
            let mut fg = match player {
                Player::Black => Color::Black,
                Player::White => Color::White,
            };
            let mut symbol = match player {
                Player::Black => "\u{25cf} ",
                Player::White => "\u{25cb} ",
            };
            if let Some(ann) = self.annotations {
                if let Some(circle) = ann.circles.iter().find(|c| c.coord == coord) {
                    fg = circle_color(circle.kind);
                    symbol = match player {
                        Player::Black => "\u{25c9} ",
                        Player::White => "\u{25ce} ",
                    };
                }
            }
            if self.last_move == Some(coord) {
                style = style.bg(Color::DarkGray);
            }
            return Cell {
                text: symbol.to_string(),
                style: style.fg(fg),
            };
        }

        if let Some(ann) = self.annotations {
            // Ghost stones of the matched AI line, numbered.
            if let Some(ghost) = ann.ghost.as_ref() {
                for (i, mark) in ghost.marks.iter().enumerate() {
                    if mark.mv.coord() == Some(coord) {
                        let mover = if i % 2 == 0 {
                            self.ghost_first
                        } else {
                            self.ghost_first.opponent()
                        };
                        let fg = match mover {
                            Player::Black => Color::DarkGray,
                            Player::White => Color::Gray,
                        };
                        return Cell {
                            text: format!("{:<2}", mark.label % 100),
                            style: style.fg(fg),
                        };
                    }
                }
            }

            if let Some((_, label)) = ann.labels.iter().find(|(c, _)| *c == coord) {
                let fg = if ann
                    .marks
                    .iter()
                    .any(|(c, kind)| *c == coord && *kind == MarkKind::BlueMove)
                {
                    Color::Blue
                } else {
                    Color::Yellow
                };
                let mut text: String = label.chars().take(2).collect();
                if text.len() < 2 {
                    text.push(' ');
                }
                return Cell {
                    text,
                    style: style.fg(fg),
                };
            }

            if let Some(circle) = ann.circles.iter().find(|c| c.coord == coord) {
                return Cell {
                    text: "\u{25cb} ".to_string(),
                    style: style.fg(circle_color(circle.kind)),
                };
            }
        }

        Cell {
            text: "\u{00b7} ".to_string(),
            style: style.fg(Color::DarkGray),
        }
    }
}

fn circle_color(kind: CircleKind) -> Color {
    match kind {
        CircleKind::PlayedTopChoice => Color::Green,
        CircleKind::Played => Color::Yellow,
        CircleKind::TopChoice => Color::Blue,
    }
}

/// Background ramp for branch exploration intensity (visits / strength).
fn heat_color(intensity: f64) -> Color {
    if intensity >= 0.5 {
        Color::LightBlue
    } else if intensity >= 0.1 {
        Color::Blue
    } else {
        Color::Indexed(17)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_ramp_is_monotonic() {
        assert_eq!(heat_color(0.8), Color::LightBlue);
        assert_eq!(heat_color(0.2), Color::Blue);
        assert_eq!(heat_color(0.01), Color::Indexed(17));
    }
}
