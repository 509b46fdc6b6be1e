//! Game (match), its sets, the two sides and the tournament phase it belongs to.

use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a game.
pub type GameId = Uuid;

/// One side of a game.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Team1,
    Team2,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }
}

/// Phase of the tournament a game belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Group,
    Quarterfinal,
    Semifinal,
    Final,
}

/// Who occupies a slot in a game. Knockout games start with placeholders.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "team_id", rename_all = "snake_case")]
pub enum Entrant {
    Team(TeamId),
    /// Padding slot in an incomplete bracket; never plays.
    Bye,
    /// Winner of an earlier round, not known yet.
    Tbd,
}

impl Entrant {
    pub fn team_id(&self) -> Option<TeamId> {
        match self {
            Entrant::Team(id) => Some(*id),
            Entrant::Bye | Entrant::Tbd => None,
        }
    }
}

/// A single scoring unit within a game.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameSet {
    pub team_1_score: u32,
    pub team_2_score: u32,
    pub is_complete: bool,
}

impl GameSet {
    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Team1 => self.team_1_score,
            Side::Team2 => self.team_2_score,
        }
    }

    pub fn score_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Team1 => &mut self.team_1_score,
            Side::Team2 => &mut self.team_2_score,
        }
    }

    /// Side with the higher score once the set is complete.
    pub fn winner(&self) -> Option<Side> {
        if !self.is_complete {
            return None;
        }
        match self.team_1_score.cmp(&self.team_2_score) {
            std::cmp::Ordering::Greater => Some(Side::Team1),
            std::cmp::Ordering::Less => Some(Side::Team2),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A game between two entrants on one court.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    /// Scheduling order; group games get one from the scheduler.
    pub sequence: Option<u32>,
    pub team_1: Entrant,
    pub team_2: Entrant,
    pub sets: Vec<GameSet>,
    /// Always a valid index into `sets`.
    pub current_set: usize,
    pub is_complete: bool,
    pub is_running: bool,
    /// Court label, e.g. "Court 2".
    pub field: String,
    pub phase: Phase,
    /// Group label (group phase only).
    pub group: Option<String>,
    /// None until the game is complete.
    pub winner: Option<Side>,
    pub started_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Create a pending game with `set_count` empty sets (at least one).
    pub fn new(
        team_1: Entrant,
        team_2: Entrant,
        phase: Phase,
        field: impl Into<String>,
        set_count: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: None,
            team_1,
            team_2,
            sets: vec![GameSet::default(); set_count.max(1)],
            current_set: 0,
            is_complete: false,
            is_running: false,
            field: field.into(),
            phase,
            group: None,
            winner: None,
            started_at: None,
        }
    }

    pub fn entrant(&self, side: Side) -> Entrant {
        match side {
            Side::Team1 => self.team_1,
            Side::Team2 => self.team_2,
        }
    }

    /// Whether the given team plays in this game.
    pub fn involves(&self, team_id: TeamId) -> bool {
        self.team_1.team_id() == Some(team_id) || self.team_2.team_id() == Some(team_id)
    }

    /// Both slots hold real teams.
    pub fn has_known_entrants(&self) -> bool {
        self.team_1.team_id().is_some() && self.team_2.team_id().is_some()
    }

    /// Completed sets won by `side`.
    pub fn sets_won(&self, side: Side) -> u32 {
        self.sets.iter().filter(|s| s.winner() == Some(side)).count() as u32
    }

    /// Points scored by `side` across all sets.
    pub fn total_points(&self, side: Side) -> u32 {
        self.sets.iter().map(|s| s.score(side)).sum()
    }

    pub fn current_set(&self) -> Option<&GameSet> {
        self.sets.get(self.current_set)
    }

    pub fn winning_team(&self) -> Option<TeamId> {
        self.winner.and_then(|side| self.entrant(side).team_id())
    }
}
