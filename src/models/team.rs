//! Team record and the stat patches the scoring state machine produces.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in games and lookups).
pub type TeamId = Uuid;

/// A team in the tournament with its cumulative record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Group label ("A", "B", ...).
    pub group: String,
    pub wins: u32,
    pub losses: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
}

impl Team {
    /// Create a new team in the given group. Record starts at zero.
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            group: group.into(),
            wins: 0,
            losses: 0,
            points_for: 0,
            points_against: 0,
            sets_won: 0,
            sets_lost: 0,
        }
    }

    pub fn point_diff(&self) -> i64 {
        i64::from(self.points_for) - i64::from(self.points_against)
    }

    /// Games played to completion, as far as the record knows.
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }

    /// Apply a stat delta. Counters never go below zero.
    pub fn apply_patch(&mut self, patch: &TeamPatch) {
        self.wins = self.wins.saturating_add_signed(patch.wins);
        self.losses = self.losses.saturating_add_signed(patch.losses);
        self.points_for = self.points_for.saturating_add_signed(patch.points_for);
        self.points_against = self.points_against.saturating_add_signed(patch.points_against);
        self.sets_won = self.sets_won.saturating_add_signed(patch.sets_won);
        self.sets_lost = self.sets_lost.saturating_add_signed(patch.sets_lost);
    }
}

/// Change to one team's record caused by a completed game.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamPatch {
    pub team_id: TeamId,
    pub wins: i32,
    pub losses: i32,
    pub points_for: i32,
    pub points_against: i32,
    pub sets_won: i32,
    pub sets_lost: i32,
}

impl TeamPatch {
    /// The patch that undoes this one (used when an admin re-scores a finished game).
    pub fn negated(&self) -> Self {
        Self {
            team_id: self.team_id,
            wins: -self.wins,
            losses: -self.losses,
            points_for: -self.points_for,
            points_against: -self.points_against,
            sets_won: -self.sets_won,
            sets_lost: -self.sets_lost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negated_patch_restores_record() {
        let mut team = Team::new("Spikers", "A");
        let patch = TeamPatch {
            team_id: team.id,
            wins: 1,
            points_for: 15,
            points_against: 9,
            sets_won: 1,
            ..Default::default()
        };
        team.apply_patch(&patch);
        assert_eq!(team.wins, 1);
        assert_eq!(team.point_diff(), 6);
        team.apply_patch(&patch.negated());
        assert_eq!(team, Team { id: team.id, ..Team::new("Spikers", "A") });
    }

    #[test]
    fn patch_never_underflows() {
        let mut team = Team::new("Blockers", "B");
        team.apply_patch(&TeamPatch {
            team_id: team.id,
            losses: -3,
            ..Default::default()
        });
        assert_eq!(team.losses, 0);
    }
}
