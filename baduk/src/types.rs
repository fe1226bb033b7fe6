//! Canonical player, coordinate and move types for the project.

use serde::{Deserialize, Serialize};

/// Project-owned color type. Black moves first in an even game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Black,
    White,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A board intersection. `(0, 0)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

// Column letters skip 'I' by Go convention.
const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

impl Coord {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Human-readable coordinates like "Q16" (rank counted from the bottom).
    pub fn pretty(self, board_height: u8) -> String {
        let letter = COLUMN_LETTERS
            .get(self.x as usize)
            .copied()
            .unwrap_or(b'?') as char;
        format!("{}{}", letter, board_height.saturating_sub(self.y))
    }
}

/// A move: either a stone placement or a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Move {
    Place(Coord),
    Pass,
}

impl Move {
    pub fn place(x: u8, y: u8) -> Self {
        Self::Place(Coord::new(x, y))
    }

    pub fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn coord(self) -> Option<Coord> {
        match self {
            Self::Place(c) => Some(c),
            Self::Pass => None,
        }
    }
}

/// Static game metadata the review core needs: handicap information, player
/// identities for permission gating, and upload provenance for the summary
/// consistency checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: u8,
    pub height: u8,
    pub handicap: u32,
    pub free_handicap_placement: bool,
    /// Set when the game record was uploaded (SGF import) rather than played
    /// on the server. Uploaded records carry the full move string.
    pub original_sgf: bool,
    /// "!"-separated move segments of an uploaded record.
    pub all_moves: Option<String>,
    pub black_player_id: Option<u64>,
    pub white_player_id: Option<u64>,
    pub creator_id: Option<u64>,
}

impl GameConfig {
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Offset into the score array introduced by free handicap placement.
    pub fn handicap_offset(&self) -> u32 {
        if self.free_handicap_placement && self.handicap > 0 {
            self.handicap
        } else {
            0
        }
    }

    pub fn is_player(&self, user_id: u64) -> bool {
        self.black_player_id == Some(user_id)
            || self.white_player_id == Some(user_id)
            || self.creator_id == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_flips() {
        assert_eq!(Player::Black.opponent(), Player::White);
        assert_eq!(Player::White.opponent(), Player::Black);
    }

    #[test]
    fn pretty_coordinates_skip_i() {
        // Column 8 is 'J' because 'I' is skipped.
        assert_eq!(Coord::new(8, 0).pretty(19), "J19");
        assert_eq!(Coord::new(0, 18).pretty(19), "A1");
        assert_eq!(Coord::new(15, 3).pretty(19), "Q16");
    }

    #[test]
    fn pass_has_no_coord() {
        assert!(Move::Pass.is_pass());
        assert_eq!(Move::Pass.coord(), None);
        assert_eq!(Move::place(2, 3).coord(), Some(Coord::new(2, 3)));
    }

    #[test]
    fn handicap_offset_requires_free_placement() {
        let mut config = GameConfig::new(19, 19);
        config.handicap = 3;
        assert_eq!(config.handicap_offset(), 0);

        config.free_handicap_placement = true;
        assert_eq!(config.handicap_offset(), 3);
    }
}
