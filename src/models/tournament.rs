//! Tournament aggregate: roster, games, settings and current phase.

use crate::models::game::{Entrant, Game, GameId, Phase};
use crate::models::settings::TournamentSettings;
use crate::models::team::{Team, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Tournament is not in a state that allows this action.
    InvalidState,
    /// Settings failed validation.
    InvalidSettings(String),
    TeamNotFound(TeamId),
    GameNotFound(GameId),
    /// A team with this name already exists (names are unique, case-insensitive).
    DuplicateTeamName,
    EmptyTeamName,
    /// Group label is not one of the configured groups.
    UnknownGroup(String),
    /// A game needs two different teams.
    SameTeam,
    /// Game still has TBD or bye slots.
    EntrantsUnknown,
    /// Team is already playing in another running game.
    TeamBusy(TeamId),
    /// A manual result must have a winner.
    TiedScore,
    /// Roster CSV could not be read or written.
    Csv(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::InvalidSettings(msg) => write!(f, "Invalid settings: {}", msg),
            TournamentError::TeamNotFound(_) => write!(f, "Team not found"),
            TournamentError::GameNotFound(_) => write!(f, "Game not found"),
            TournamentError::DuplicateTeamName => write!(f, "A team with this name already exists"),
            TournamentError::EmptyTeamName => write!(f, "Team name must not be empty"),
            TournamentError::UnknownGroup(group) => write!(f, "Group {} does not exist", group),
            TournamentError::SameTeam => write!(f, "Please select two different teams"),
            TournamentError::EntrantsUnknown => write!(f, "Both teams must be known before the game starts"),
            TournamentError::TeamBusy(_) => write!(f, "Team is already playing another game"),
            TournamentError::TiedScore => write!(f, "A final score cannot be a tie"),
            TournamentError::Csv(msg) => write!(f, "CSV error: {}", msg),
        }
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Full tournament state as owned by the orchestrator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub settings: TournamentSettings,
    pub teams: Vec<Team>,
    /// Group games first (in schedule order), knockout games appended.
    pub games: Vec<Game>,
    pub phase: Phase,
}

impl Tournament {
    /// Create an empty tournament in the group phase.
    pub fn new(settings: TournamentSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            settings,
            teams: Vec::new(),
            games: Vec::new(),
            phase: Phase::Group,
        }
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn game_mut(&mut self, id: GameId) -> Option<&mut Game> {
        self.games.iter_mut().find(|g| g.id == id)
    }

    /// Display name for a game slot.
    pub fn entrant_name(&self, entrant: Entrant) -> String {
        match entrant {
            Entrant::Team(id) => self
                .team(id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "Unknown team".to_string()),
            Entrant::Bye => "Bye".to_string(),
            Entrant::Tbd => "TBD".to_string(),
        }
    }

    /// Teams in the roster (placeholders are never stored as teams).
    pub fn real_team_count(&self) -> usize {
        self.teams.len()
    }

    fn has_running_game(&self) -> bool {
        self.games.iter().any(|g| g.is_running)
    }

    /// Next free sequence number after every scheduled game.
    pub fn next_sequence(&self) -> u32 {
        self.games
            .iter()
            .filter_map(|g| g.sequence)
            .max()
            .map_or(1, |s| s + 1)
    }

    /// Replace the settings. Not allowed while a game is being scored.
    pub fn update_settings(&mut self, settings: TournamentSettings) -> Result<(), TournamentError> {
        settings.validate()?;
        if self.has_running_game() {
            return Err(TournamentError::InvalidState);
        }
        self.settings = settings;
        Ok(())
    }

    /// Add a team to a group. Names must be unique (case-insensitive).
    pub fn add_team(&mut self, name: &str, group: &str) -> Result<TeamId, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyTeamName);
        }
        let group = group.trim().to_ascii_uppercase();
        if !self.settings.group_labels().contains(&group) {
            return Err(TournamentError::UnknownGroup(group));
        }
        if self.teams.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
            return Err(TournamentError::DuplicateTeamName);
        }
        let team = Team::new(name, group);
        let id = team.id;
        self.teams.push(team);
        Ok(id)
    }

    /// Remove a team together with every game it plays in.
    pub fn remove_team(&mut self, team_id: TeamId) -> Result<(), TournamentError> {
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?;
        self.teams.remove(idx);
        self.games.retain(|g| !g.involves(team_id));
        Ok(())
    }

    /// Install a new roster (e.g. from a CSV import). Games of dropped teams go with them.
    ///
    /// The roster must pass the checks `add_team` applies, and each team id may appear once.
    pub fn replace_teams(&mut self, teams: Vec<Team>) -> Result<(), TournamentError> {
        if self.has_running_game() {
            return Err(TournamentError::InvalidState);
        }
        let labels = self.settings.group_labels();
        let mut ids = std::collections::HashSet::new();
        for (i, team) in teams.iter().enumerate() {
            if team.name.trim().is_empty() {
                return Err(TournamentError::EmptyTeamName);
            }
            if !labels.contains(&team.group) {
                return Err(TournamentError::UnknownGroup(team.group.clone()));
            }
            if !ids.insert(team.id)
                || teams[..i].iter().any(|t| t.name.eq_ignore_ascii_case(&team.name))
            {
                return Err(TournamentError::DuplicateTeamName);
            }
        }
        self.games.retain(|g| {
            [g.team_1, g.team_2]
                .iter()
                .all(|e| e.team_id().map_or(true, |id| ids.contains(&id)))
        });
        self.teams = teams;
        Ok(())
    }

    /// Manually schedule a group-phase game between two teams.
    pub fn create_game(
        &mut self,
        team_1: TeamId,
        team_2: TeamId,
        field: &str,
    ) -> Result<GameId, TournamentError> {
        if team_1 == team_2 {
            return Err(TournamentError::SameTeam);
        }
        let group_1 = self.team(team_1).ok_or(TournamentError::TeamNotFound(team_1))?.group.clone();
        let group_2 = self.team(team_2).ok_or(TournamentError::TeamNotFound(team_2))?.group.clone();
        let mut game = Game::new(
            Entrant::Team(team_1),
            Entrant::Team(team_2),
            Phase::Group,
            field.trim(),
            self.settings.sets_per_game(),
        );
        game.sequence = Some(self.next_sequence());
        if group_1 == group_2 {
            game.group = Some(group_1);
        }
        let id = game.id;
        self.games.push(game);
        Ok(id)
    }

    pub fn delete_game(&mut self, game_id: GameId) -> Result<(), TournamentError> {
        let idx = self
            .games
            .iter()
            .position(|g| g.id == game_id)
            .ok_or(TournamentError::GameNotFound(game_id))?;
        self.games.remove(idx);
        Ok(())
    }

    /// Fill the slots of a knockout game (winners are not promoted automatically).
    pub fn assign_entrants(
        &mut self,
        game_id: GameId,
        team_1: TeamId,
        team_2: TeamId,
    ) -> Result<(), TournamentError> {
        if team_1 == team_2 {
            return Err(TournamentError::SameTeam);
        }
        for id in [team_1, team_2] {
            if self.team(id).is_none() {
                return Err(TournamentError::TeamNotFound(id));
            }
        }
        let game = self
            .game_mut(game_id)
            .ok_or(TournamentError::GameNotFound(game_id))?;
        if game.phase == Phase::Group || game.is_complete || game.is_running {
            return Err(TournamentError::InvalidState);
        }
        game.team_1 = Entrant::Team(team_1);
        game.team_2 = Entrant::Team(team_2);
        Ok(())
    }

    /// Put a pending game on court. Neither team may be playing elsewhere.
    pub fn start_game(&mut self, game_id: GameId, now: DateTime<Utc>) -> Result<(), TournamentError> {
        let game = self
            .game(game_id)
            .ok_or(TournamentError::GameNotFound(game_id))?;
        if game.is_complete {
            return Err(TournamentError::InvalidState);
        }
        if game.is_running {
            return Ok(());
        }
        if !game.has_known_entrants() {
            return Err(TournamentError::EntrantsUnknown);
        }
        for team_id in [game.team_1, game.team_2].iter().filter_map(Entrant::team_id) {
            let busy = self
                .games
                .iter()
                .any(|g| g.id != game_id && g.is_running && g.involves(team_id));
            if busy {
                return Err(TournamentError::TeamBusy(team_id));
            }
        }
        if let Some(game) = self.game_mut(game_id) {
            game.is_running = true;
            game.started_at = Some(now);
        }
        Ok(())
    }

    /// Pause a running game; its score is kept.
    pub fn stop_game(&mut self, game_id: GameId) -> Result<(), TournamentError> {
        let game = self
            .game_mut(game_id)
            .ok_or(TournamentError::GameNotFound(game_id))?;
        game.is_running = false;
        Ok(())
    }

    /// Next game waiting on a court: lowest sequence first, then insertion order.
    pub fn next_game_on_field(&self, field: &str) -> Option<GameId> {
        if self.games.iter().any(|g| g.field == field && g.is_running) {
            return None;
        }
        self.games
            .iter()
            .filter(|g| g.field == field && !g.is_complete && !g.is_running && g.has_known_entrants())
            .min_by_key(|g| g.sequence.unwrap_or(u32::MAX))
            .map(|g| g.id)
    }

    /// Administrative phase override.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Clear teams and games; settings are kept.
    pub fn reset(&mut self) {
        self.teams.clear();
        self.games.clear();
        self.phase = Phase::Group;
    }
}
