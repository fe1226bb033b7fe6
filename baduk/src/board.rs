//! Board occupancy grid.
//!
//! Captures are not resolved here; the host client owns full board state.
//! The review core only needs occupancy to reject AI suggestions that land
//! on played intersections and to draw stones.

use crate::move_tree::{MoveTree, NodeId};
use crate::types::{Coord, Move, Player};

#[derive(Debug, Clone)]
pub struct Board {
    width: u8,
    height: u8,
    grid: Vec<Option<Player>>,
}

impl Board {
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            grid: vec![None; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if coord.x < self.width && coord.y < self.height {
            Some(coord.y as usize * self.width as usize + coord.x as usize)
        } else {
            None
        }
    }

    pub fn stone_at(&self, coord: Coord) -> Option<Player> {
        self.index(coord).and_then(|i| self.grid[i])
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.stone_at(coord).is_some()
    }

    pub fn place(&mut self, coord: Coord, player: Player) {
        if let Some(i) = self.index(coord) {
            self.grid[i] = Some(player);
        }
    }

    /// Occupancy after replaying the path from the root to `node`.
    pub fn at_node(width: u8, height: u8, tree: &MoveTree, node: NodeId) -> Self {
        let mut board = Self::new(width, height);
        let mut cur = Some(node);
        let mut path = Vec::new();
        while let Some(id) = cur {
            path.push(id);
            cur = tree.node(id).parent;
        }
        for id in path.into_iter().rev() {
            let n = tree.node(id);
            if let (Some(Move::Place(coord)), Some(player)) = (n.mv, n.player) {
                board.place(coord, player);
            }
        }
        board
    }
}
