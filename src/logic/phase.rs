//! Phase progression: group stage completion triggers the knockout stage.

use crate::logic::knockout::generate_knockout_stage;
use crate::models::{Game, Notification, Phase, Tournament};

/// True when there is at least one group game and all of them are complete.
pub fn group_stage_complete(games: &[Game]) -> bool {
    let mut group_games = games.iter().filter(|g| g.phase == Phase::Group).peekable();
    group_games.peek().is_some() && group_games.all(|g| g.is_complete)
}

/// Generate the knockout stage if the tournament is still in the group phase and every
/// group game is finished. Returns what happened, if anything.
pub fn advance_phase_if_ready(tournament: &mut Tournament) -> Option<Notification> {
    if tournament.phase != Phase::Group || !group_stage_complete(&tournament.games) {
        return None;
    }
    match generate_knockout_stage(tournament) {
        Ok(notification) => Some(notification),
        Err(e) => {
            log::debug!("Knockout stage not generated: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entrant;

    #[test]
    fn no_group_games_is_not_complete() {
        assert!(!group_stage_complete(&[]));
        let knockout = Game::new(Entrant::Tbd, Entrant::Tbd, Phase::Final, "Court 1", 1);
        assert!(!group_stage_complete(&[knockout]));
    }
}
