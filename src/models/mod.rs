//! Data structures for the court tournament: teams, games, settings, tournament state.

mod game;
mod notification;
mod settings;
mod team;
mod tournament;

pub use game::{Entrant, Game, GameId, GameSet, Phase, Side};
pub use notification::{Notification, NotificationKind};
pub use settings::{TournamentSettings, WinCondition, MAX_BRACKET_SIZE, WIN_BY_TWO_FLOOR};
pub use team::{Team, TeamId, TeamPatch};
pub use tournament::{Tournament, TournamentError, TournamentId};
