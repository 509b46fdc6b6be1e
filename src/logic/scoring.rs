//! Live scoring: point adjustments, set and game completion, team record updates.

use crate::logic::phase::advance_phase_if_ready;
use crate::models::{
    Game, GameId, GameSet, Notification, NotificationKind, Side, TeamPatch, Tournament,
    TournamentError, TournamentSettings, WinCondition, WIN_BY_TWO_FLOOR,
};

/// New state of a game after a scoring call, plus the team stat changes it caused.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScoreUpdate {
    pub game: Game,
    /// Applied in order. Empty unless the game was decided by this call.
    pub patches: Vec<TeamPatch>,
    /// The game became complete with this call.
    pub completed: bool,
}

impl ScoreUpdate {
    fn unchanged(game: &Game) -> Self {
        Self {
            game: game.clone(),
            patches: Vec::new(),
            completed: false,
        }
    }
}

/// The side that has taken the set at its current score, if any. Only a leading side can.
fn set_winner(set: &GameSet, settings: &TournamentSettings) -> Option<Side> {
    let (t1, t2) = (set.team_1_score, set.team_2_score);
    let leader = match t1.cmp(&t2) {
        std::cmp::Ordering::Greater => Side::Team1,
        std::cmp::Ordering::Less => Side::Team2,
        std::cmp::Ordering::Equal => return None,
    };
    let score = set.score(leader);
    let won = match settings.win_condition {
        WinCondition::Points => score >= settings.points_to_win,
        WinCondition::Sets => {
            score >= settings.points_to_win_set
                || (score >= WIN_BY_TWO_FLOOR && t1.abs_diff(t2) >= 2)
        }
        WinCondition::Time => false,
    };
    won.then_some(leader)
}

/// Sets first in sets mode, then points. `fallback` decides a dead heat.
fn decide_winner(game: &Game, settings: &TournamentSettings, fallback: Side) -> Side {
    let by_sets = match settings.win_condition {
        WinCondition::Sets => game.sets_won(Side::Team1).cmp(&game.sets_won(Side::Team2)),
        WinCondition::Points | WinCondition::Time => std::cmp::Ordering::Equal,
    };
    let ordering =
        by_sets.then_with(|| game.total_points(Side::Team1).cmp(&game.total_points(Side::Team2)));
    match ordering {
        std::cmp::Ordering::Greater => Side::Team1,
        std::cmp::Ordering::Less => Side::Team2,
        std::cmp::Ordering::Equal => fallback,
    }
}

fn finish(game: &mut Game, winner: Side) {
    game.winner = Some(winner);
    game.is_complete = true;
    game.is_running = false;
}

/// Team stat changes a completed game accounts for. Empty for walkovers and undecided games.
pub fn result_patches(game: &Game) -> Vec<TeamPatch> {
    let winner = match game.winner {
        Some(side) if game.is_complete && game.has_known_entrants() => side,
        _ => return Vec::new(),
    };
    [Side::Team1, Side::Team2]
        .into_iter()
        .filter_map(|side| {
            let team_id = game.entrant(side).team_id()?;
            let won = side == winner;
            Some(TeamPatch {
                team_id,
                wins: i32::from(won),
                losses: i32::from(!won),
                points_for: game.total_points(side) as i32,
                points_against: game.total_points(side.other()) as i32,
                sets_won: game.sets_won(side) as i32,
                sets_lost: game.sets_won(side.other()) as i32,
            })
        })
        .collect()
}

/// Apply one point adjustment to the active set of a running game.
///
/// Stale calls (game not running, already complete, set already closed) and adjustments
/// that would push a score below zero leave the game unchanged. Every applied change is
/// checked for set completion, so a correction can close a set for the leading side. In
/// sets mode a closed set either decides the game (a side reached `sets_to_win`, or no
/// sets are left) or moves play to the next set.
pub fn apply_score_delta(
    game: &Game,
    side: Side,
    delta: i32,
    settings: &TournamentSettings,
) -> ScoreUpdate {
    if !game.is_running || game.is_complete {
        return ScoreUpdate::unchanged(game);
    }
    let set = match game.current_set() {
        Some(set) if !set.is_complete => set,
        _ => return ScoreUpdate::unchanged(game),
    };
    let current = set.score(side);
    let adjusted = (i64::from(current) + i64::from(delta)).clamp(0, i64::from(u32::MAX)) as u32;
    if adjusted == current {
        return ScoreUpdate::unchanged(game);
    }

    let mut next = game.clone();
    let idx = next.current_set;
    *next.sets[idx].score_mut(side) = adjusted;

    if let Some(set_side) = set_winner(&next.sets[idx], settings) {
        next.sets[idx].is_complete = true;
        let decided = match settings.win_condition {
            WinCondition::Sets => {
                let needed = settings.sets_to_win;
                next.sets_won(Side::Team1) >= needed
                    || next.sets_won(Side::Team2) >= needed
                    || idx + 1 >= next.sets.len()
            }
            WinCondition::Points | WinCondition::Time => true,
        };
        if decided {
            let winner = decide_winner(&next, settings, set_side);
            finish(&mut next, winner);
        } else {
            next.current_set = idx + 1;
        }
    }

    let completed = next.is_complete;
    let patches = if completed { result_patches(&next) } else { Vec::new() };
    ScoreUpdate {
        game: next,
        patches,
        completed,
    }
}

/// Administrative override: record a final score on the first set and close the game.
///
/// Bypasses set progression whatever the win condition. If the game already had a
/// result, the patches first undo it. Ties and games with unknown entrants are ignored.
pub fn apply_manual_score(game: &Game, team_1_score: u32, team_2_score: u32) -> ScoreUpdate {
    if team_1_score == team_2_score || !game.has_known_entrants() {
        return ScoreUpdate::unchanged(game);
    }
    let mut patches: Vec<TeamPatch> = result_patches(game).iter().map(TeamPatch::negated).collect();

    let mut next = game.clone();
    next.sets = vec![GameSet::default(); game.sets.len().max(1)];
    next.sets[0] = GameSet {
        team_1_score,
        team_2_score,
        is_complete: true,
    };
    next.current_set = 0;
    let winner = if team_1_score > team_2_score {
        Side::Team1
    } else {
        Side::Team2
    };
    finish(&mut next, winner);
    patches.extend(result_patches(&next));

    ScoreUpdate {
        game: next,
        patches,
        completed: true,
    }
}

fn match_complete_notification(tournament: &Tournament, game: &Game) -> Option<Notification> {
    let winner = game.winner?;
    let name = tournament.entrant_name(game.entrant(winner));
    let (own, other) = if game.sets.len() > 1 {
        (game.sets_won(winner), game.sets_won(winner.other()))
    } else {
        (game.total_points(winner), game.total_points(winner.other()))
    };
    Some(Notification::new(
        NotificationKind::MatchComplete,
        format!("{} wins {}-{}!", name, own, other),
    ))
}

/// Store a scoring result in the tournament and run the group-completion check.
fn commit(tournament: &mut Tournament, update: ScoreUpdate) -> Vec<Notification> {
    let mut notifications = Vec::new();
    for patch in &update.patches {
        if let Some(team) = tournament.team_mut(patch.team_id) {
            team.apply_patch(patch);
        }
    }
    if update.completed {
        log::info!("Game {} complete", update.game.id);
        notifications.extend(match_complete_notification(tournament, &update.game));
    }
    let completed = update.completed;
    if let Some(slot) = tournament.game_mut(update.game.id) {
        *slot = update.game;
    }
    if completed {
        notifications.extend(advance_phase_if_ready(tournament));
    }
    notifications
}

/// Point adjustment from the scoreboard. Unknown game ids are the only error.
pub fn score_point(
    tournament: &mut Tournament,
    game_id: GameId,
    side: Side,
    delta: i32,
) -> Result<Vec<Notification>, TournamentError> {
    let game = tournament
        .game(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    let update = apply_score_delta(game, side, delta, &tournament.settings);
    Ok(commit(tournament, update))
}

/// Admin correction of a game's final score.
pub fn override_score(
    tournament: &mut Tournament,
    game_id: GameId,
    team_1_score: u32,
    team_2_score: u32,
) -> Result<Vec<Notification>, TournamentError> {
    let game = tournament
        .game(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    if team_1_score == team_2_score {
        return Err(TournamentError::TiedScore);
    }
    if !game.has_known_entrants() {
        return Err(TournamentError::EntrantsUnknown);
    }
    let update = apply_manual_score(game, team_1_score, team_2_score);
    Ok(commit(tournament, update))
}
