//! Tournament configuration supplied by the organiser.

use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};

/// Points at which the win-by-two rule starts to apply in sets mode.
pub const WIN_BY_TWO_FLOOR: u32 = 15;

/// Largest knockout bracket the scheduler builds.
pub const MAX_BRACKET_SIZE: usize = 8;

/// How a game is decided.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinCondition {
    /// Single set, first to `points_to_win`.
    #[default]
    Points,
    /// Time-limited; completion is driven externally (manual score override).
    Time,
    /// Best of `number_of_sets`, first to `sets_to_win`.
    Sets,
}

/// Settings for one tournament. Read-only input to every scheduling and scoring call.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentSettings {
    pub number_of_courts: u32,
    pub number_of_groups: u32,
    pub win_condition: WinCondition,
    /// Points mode: score that ends the game.
    pub points_to_win: u32,
    /// Time mode: length of a game in minutes (display only).
    pub time_limit_minutes: u32,
    pub number_of_sets: u32,
    pub sets_to_win: u32,
    pub points_to_win_set: u32,
    /// 1 or 2.
    pub teams_advancing_from_group: u32,
    /// Seconds to wait before starting the next game on a court; `None` disables auto-start.
    pub auto_start_delay_secs: Option<u64>,
    /// Minimum gap in sequence numbers between two games of the same team.
    pub rest_cooldown: u32,
    /// Fewer qualifiers than this and the knockout stage is not ready.
    pub min_knockout_teams: u32,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            number_of_courts: 4,
            number_of_groups: 4,
            win_condition: WinCondition::Points,
            points_to_win: 15,
            time_limit_minutes: 20,
            number_of_sets: 1,
            sets_to_win: 1,
            points_to_win_set: 25,
            teams_advancing_from_group: 2,
            auto_start_delay_secs: None,
            rest_cooldown: 3,
            min_knockout_teams: 4,
        }
    }
}

impl TournamentSettings {
    /// Reject settings the scheduler and state machine cannot work with.
    pub fn validate(&self) -> Result<(), TournamentError> {
        let invalid = |msg: &str| Err(TournamentError::InvalidSettings(msg.to_string()));
        if self.number_of_courts == 0 {
            return invalid("need at least one court");
        }
        if !(1..=26).contains(&self.number_of_groups) {
            return invalid("number of groups must be between 1 and 26");
        }
        if !(1..=2).contains(&self.teams_advancing_from_group) {
            return invalid("either 1 or 2 teams advance from each group");
        }
        if self.rest_cooldown == 0 {
            return invalid("rest cooldown must be at least 1");
        }
        if !(2..=MAX_BRACKET_SIZE as u32).contains(&self.min_knockout_teams) {
            return invalid("minimum knockout teams must be between 2 and 8");
        }
        match self.win_condition {
            WinCondition::Points if self.points_to_win == 0 => invalid("points to win must be positive"),
            WinCondition::Sets if self.number_of_sets == 0 || self.points_to_win_set == 0 => {
                invalid("sets mode needs at least one set and positive points per set")
            }
            WinCondition::Sets if self.sets_to_win == 0 || self.sets_to_win > self.number_of_sets => {
                invalid("sets to win must be between 1 and the number of sets")
            }
            _ => Ok(()),
        }
    }

    /// Number of sets a freshly generated game carries.
    pub fn sets_per_game(&self) -> usize {
        match self.win_condition {
            WinCondition::Sets => self.number_of_sets.max(1) as usize,
            WinCondition::Points | WinCondition::Time => 1,
        }
    }

    /// Group labels in order: "A", "B", ... (at most 26).
    pub fn group_labels(&self) -> Vec<String> {
        (b'A'..=b'Z')
            .take(self.number_of_groups as usize)
            .map(|c| (c as char).to_string())
            .collect()
    }

    /// How many teams the group stage should send to the knockout stage.
    /// A single group qualifies by overall ranking and always fills the minimum bracket.
    pub fn required_qualifiers(&self) -> usize {
        let per_groups = (self.number_of_groups * self.teams_advancing_from_group) as usize;
        let required = if self.number_of_groups == 1 {
            per_groups.max(self.min_knockout_teams as usize)
        } else {
            per_groups
        };
        required.min(MAX_BRACKET_SIZE)
    }

    /// Court label for the n-th game handed out (round-robin over courts).
    pub fn court_label(&self, index: usize) -> String {
        let courts = self.number_of_courts.max(1) as usize;
        format!("Court {}", index % courts + 1)
    }
}
