//! Viewer identity and the permission gates on review actions.

use baduk::GameConfig;
use serde::{Deserialize, Serialize};

/// Moderator capability bits, as delivered by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeratorPowers(pub u32);

impl ModeratorPowers {
    pub const AI_DETECTOR: u32 = 0x1;
    pub const ASSESS_AI_PLAY: u32 = 0x2;

    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }
}

/// The signed-in (or anonymous) viewer of the review panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    /// `None` for anonymous viewers.
    pub id: Option<u64>,
    #[serde(default)]
    pub supporter: bool,
    #[serde(default)]
    pub professional: bool,
    #[serde(default)]
    pub moderator: bool,
    #[serde(default)]
    pub moderator_powers: ModeratorPowers,
}

impl UserContext {
    pub fn anonymous(&self) -> bool {
        self.id.is_none()
    }

    /// May this user start a new fast or full review?
    pub fn can_start_review(&self) -> bool {
        !self.anonymous()
            && (self.supporter
                || self.professional
                || self.moderator
                || self.moderator_powers.has(ModeratorPowers::AI_DETECTOR))
    }

    /// On-demand variation analysis is limited to signed-in supporters who
    /// took part in the game.
    pub fn can_request_variation_analysis(&self, config: &GameConfig) -> bool {
        match self.id {
            Some(id) => self.supporter && config.is_player(id),
            None => false,
        }
    }

    /// The per-player summary table is a moderation tool.
    pub fn can_view_summary_table(&self) -> bool {
        self.moderator
            || self.moderator_powers.has(ModeratorPowers::AI_DETECTOR)
            || self.moderator_powers.has(ModeratorPowers::ASSESS_AI_PLAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supporter(id: u64) -> UserContext {
        UserContext {
            id: Some(id),
            supporter: true,
            ..Default::default()
        }
    }

    #[test]
    fn anonymous_users_can_do_nothing() {
        let user = UserContext::default();
        assert!(user.anonymous());
        assert!(!user.can_start_review());
        assert!(!user.can_request_variation_analysis(&GameConfig::new(19, 19)));
    }

    #[test]
    fn supporters_can_start_reviews() {
        assert!(supporter(7).can_start_review());
        let plain = UserContext {
            id: Some(7),
            ..Default::default()
        };
        assert!(!plain.can_start_review());
    }

    #[test]
    fn ai_detector_power_suffices_for_reviews_and_table() {
        let user = UserContext {
            id: Some(9),
            moderator_powers: ModeratorPowers(ModeratorPowers::AI_DETECTOR),
            ..Default::default()
        };
        assert!(user.can_start_review());
        assert!(user.can_view_summary_table());
    }

    #[test]
    fn variation_analysis_requires_supporter_and_participation() {
        let mut config = GameConfig::new(19, 19);
        config.black_player_id = Some(7);

        assert!(supporter(7).can_request_variation_analysis(&config));
        // A supporter who did not play the game is refused.
        assert!(!supporter(8).can_request_variation_analysis(&config));
        // A player who is not a supporter is refused.
        let player = UserContext {
            id: Some(7),
            ..Default::default()
        };
        assert!(!player.can_request_variation_analysis(&config));
        // The game creator counts as a participant.
        config.creator_id = Some(11);
        assert!(supporter(11).can_request_variation_analysis(&config));
    }
}
