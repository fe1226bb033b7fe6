//! Game model for the kibitz review client: board coordinates, compact move
//! encoding, and the move tree the review core navigates.
//!
//! This crate is deliberately not a rules engine. Capture resolution, ko and
//! scoring belong to the host client; the review core only needs occupancy,
//! trunk/branch navigation and the move-string codec.

pub mod board;
pub mod encoding;
pub mod move_tree;
pub mod types;

pub use board::Board;
pub use encoding::{decode_moves, encode_move, encode_moves, EncodingError};
pub use move_tree::{MoveNode, MoveTree, NodeId};
pub use types::{Coord, GameConfig, Move, Player};
