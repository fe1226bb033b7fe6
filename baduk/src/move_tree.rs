//! Arena-backed move tree with a distinguished trunk line.
//!
//! The trunk is the canonical game record; everything else is a variation
//! explored by the user or suggested by the AI. Review matching works on the
//! encoded move string from the root to a node, so the tree keeps enough
//! structure to produce that string and to find the branch point where a
//! variation leaves the trunk.

use crate::encoding::encode_move;
use crate::types::{Move, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct MoveNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Next move along the trunk, if this node is on the trunk and not its tip.
    pub trunk_next: Option<NodeId>,
    pub trunk: bool,
    /// Root is move 0; every child is its parent's number plus one.
    pub move_number: u32,
    /// The player who made this move. `None` only at the root.
    pub player: Option<Player>,
    /// The move itself. `None` only at the root.
    pub mv: Option<Move>,
}

#[derive(Debug, Clone)]
pub struct MoveTree {
    nodes: Vec<MoveNode>,
}

impl MoveTree {
    /// A tree holding just the empty-board root.
    pub fn new() -> Self {
        Self {
            nodes: vec![MoveNode {
                id: NodeId(0),
                parent: None,
                children: Vec::new(),
                trunk_next: None,
                trunk: true,
                move_number: 0,
                player: None,
                mv: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.0]
    }

    /// Append a move to the trunk. The parent must be the current trunk tip;
    /// appending elsewhere creates a variation instead.
    pub fn play_trunk(&mut self, parent: NodeId, player: Player, mv: Move) -> NodeId {
        if !self.nodes[parent.0].trunk || self.nodes[parent.0].trunk_next.is_some() {
            return self.play_variation(parent, player, mv);
        }
        let id = self.push_node(parent, player, mv, true);
        self.nodes[parent.0].trunk_next = Some(id);
        id
    }

    /// Append a variation move under any node.
    pub fn play_variation(&mut self, parent: NodeId, player: Player, mv: Move) -> NodeId {
        self.push_node(parent, player, mv, false)
    }

    fn push_node(&mut self, parent: NodeId, player: Player, mv: Move, trunk: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        let move_number = self.nodes[parent.0].move_number + 1;
        self.nodes.push(MoveNode {
            id,
            parent: Some(parent),
            children: Vec::new(),
            trunk_next: None,
            trunk,
            move_number,
            player: Some(player),
            mv: Some(mv),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Nearest trunk ancestor (the node itself when it is on the trunk).
    pub fn branch_point(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while !self.nodes[cur.0].trunk {
            match self.nodes[cur.0].parent {
                Some(parent) => cur = parent,
                None => break,
            }
        }
        cur
    }

    /// Moves along the path from the root to this node, in play order.
    pub fn moves_to(&self, id: NodeId) -> Vec<Move> {
        let mut moves = Vec::with_capacity(self.nodes[id.0].move_number as usize);
        let mut cur = Some(id);
        while let Some(node_id) = cur {
            let node = &self.nodes[node_id.0];
            if let Some(mv) = node.mv {
                moves.push(mv);
            }
            cur = node.parent;
        }
        moves.reverse();
        moves
    }

    /// Encoded move string from the root to this node.
    pub fn move_string_to(&self, id: NodeId) -> String {
        let mut out = String::new();
        for mv in self.moves_to(id) {
            out.push_str(&encode_move(mv));
        }
        out
    }

    /// Number of moves separating a node from one of its ancestors.
    pub fn distance(&self, id: NodeId, ancestor: NodeId) -> u32 {
        self.nodes[id.0]
            .move_number
            .saturating_sub(self.nodes[ancestor.0].move_number)
    }

    /// Trunk node carrying the given move number, walking from the root.
    pub fn trunk_node_at(&self, move_number: u32) -> Option<NodeId> {
        let mut cur = self.root();
        loop {
            if self.nodes[cur.0].move_number == move_number {
                return Some(cur);
            }
            cur = self.nodes[cur.0].trunk_next?;
        }
    }

    /// Side to move at a node. Black opens from the empty board; free
    /// handicap placement is the host client's concern, not this tree's.
    pub fn next_player(&self, id: NodeId) -> Player {
        match self.nodes[id.0].player {
            Some(player) => player.opponent(),
            None => Player::Black,
        }
    }

    /// Who played each trunk move, in order (move 1 first).
    pub fn trunk_players(&self) -> Vec<Player> {
        let mut players = Vec::new();
        let mut cur = self.nodes[0].trunk_next;
        while let Some(id) = cur {
            if let Some(player) = self.nodes[id.0].player {
                players.push(player);
            }
            cur = self.nodes[id.0].trunk_next;
        }
        players
    }

    /// Number of moves on the trunk (excluding the root).
    pub fn trunk_len(&self) -> usize {
        let mut len = 0;
        let mut cur = self.nodes[0].trunk_next;
        while let Some(id) = cur {
            len += 1;
            cur = self.nodes[id.0].trunk_next;
        }
        len
    }
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}
