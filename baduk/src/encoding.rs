//! Compact move-string codec.
//!
//! Moves travel between client and backend as two-character tokens: 'a' + x
//! followed by 'a' + y, with ".." for a pass. Variation keys and branch
//! sequences are concatenations of these tokens, so prefix relationships on
//! the encoded strings mirror ancestor relationships between positions.

use crate::types::{Coord, Move};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodingError {
    #[error("move string has odd length: {0}")]
    OddLength(usize),

    #[error("invalid coordinate character {0:?}")]
    InvalidChar(char),
}

/// Encode a single move as a two-character token. Coordinates past 'z' do
/// not exist on any supported board; they clamp rather than overflow.
pub fn encode_move(mv: Move) -> String {
    match mv {
        Move::Pass => "..".to_string(),
        Move::Place(Coord { x, y }) => {
            let cx = (b'a' + x.min(25)) as char;
            let cy = (b'a' + y.min(25)) as char;
            format!("{}{}", cx, cy)
        }
    }
}

/// Encode a move sequence as one concatenated string.
pub fn encode_moves(moves: &[Move]) -> String {
    let mut out = String::with_capacity(moves.len() * 2);
    for mv in moves {
        out.push_str(&encode_move(*mv));
    }
    out
}

/// Decode a concatenated move string back into moves.
pub fn decode_moves(s: &str) -> Result<Vec<Move>, EncodingError> {
    let bytes = s.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(EncodingError::OddLength(bytes.len()));
    }

    let mut moves = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        if pair == b".." {
            moves.push(Move::Pass);
            continue;
        }
        let x = decode_char(pair[0])?;
        let y = decode_char(pair[1])?;
        moves.push(Move::place(x, y));
    }
    Ok(moves)
}

fn decode_char(c: u8) -> Result<u8, EncodingError> {
    match c {
        b'a'..=b'z' => Ok(c - b'a'),
        _ => Err(EncodingError::InvalidChar(c as char)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_stone_placement() {
        assert_eq!(encode_move(Move::place(0, 0)), "aa");
        assert_eq!(encode_move(Move::place(15, 3)), "pd");
    }

    #[test]
    fn encode_pass() {
        assert_eq!(encode_move(Move::Pass), "..");
    }

    #[test]
    fn encode_clamps_out_of_range_coordinates() {
        assert_eq!(encode_move(Move::place(200, 1)), "zb");
        assert_eq!(encode_move(Move::place(25, 255)), "zz");
    }

    #[test]
    fn encode_sequence_concatenates() {
        let moves = [Move::place(15, 3), Move::Pass, Move::place(3, 15)];
        assert_eq!(encode_moves(&moves), "pd..dp");
    }

    #[test]
    fn decode_round_trips_sequence() {
        let decoded = decode_moves("pd..dp").unwrap();
        assert_eq!(
            decoded,
            vec![Move::place(15, 3), Move::Pass, Move::place(3, 15)]
        );
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert_eq!(decode_moves("pdq"), Err(EncodingError::OddLength(3)));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(decode_moves("p!"), Err(EncodingError::InvalidChar('!')));
    }

    #[test]
    fn decode_empty_is_empty() {
        assert_eq!(decode_moves(""), Ok(vec![]));
    }

    proptest! {
        #[test]
        fn round_trip_any_sequence(moves in prop::collection::vec(
            prop_oneof![
                Just(Move::Pass),
                (0u8..25, 0u8..25).prop_map(|(x, y)| Move::place(x, y)),
            ],
            0..40,
        )) {
            let encoded = encode_moves(&moves);
            prop_assert_eq!(decode_moves(&encoded).unwrap(), moves);
        }
    }
}
