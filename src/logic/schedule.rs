//! Group stage: cooldown-aware round-robin scheduling and court assignment.

use crate::models::{
    Entrant, Game, Notification, NotificationKind, Phase, Team, TeamId, Tournament,
    TournamentError, TournamentSettings,
};
use std::collections::HashMap;

/// Consecutive empty sequence slots allowed per remaining matchup before giving up.
const IDLE_ADVANCES_PER_MATCHUP: usize = 5;

/// A pairing waiting to be scheduled.
struct Matchup {
    team_1: TeamId,
    team_2: TeamId,
    group: String,
}

/// Outcome of generating the group stage for a tournament.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScheduleReport {
    pub scheduled: usize,
    /// Size of the full round robin over all groups.
    pub expected: usize,
    pub notification: Notification,
}

impl ScheduleReport {
    pub fn is_complete(&self) -> bool {
        self.scheduled == self.expected
    }
}

/// Every unordered pair within each configured group, groups in label order.
fn enumerate_matchups(teams: &[Team], settings: &TournamentSettings) -> Vec<Matchup> {
    let mut matchups = Vec::new();
    for label in settings.group_labels() {
        let members: Vec<&Team> = teams.iter().filter(|t| t.group == label).collect();
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                matchups.push(Matchup {
                    team_1: a.id,
                    team_2: b.id,
                    group: label.clone(),
                });
            }
        }
    }
    matchups
}

/// Number of games a complete round robin of every group needs.
pub fn round_robin_size(teams: &[Team], settings: &TournamentSettings) -> usize {
    settings
        .group_labels()
        .iter()
        .map(|label| {
            let n = teams.iter().filter(|t| &t.group == label).count();
            n * n.saturating_sub(1) / 2
        })
        .sum()
}

fn is_rested(last_played: &HashMap<TeamId, u32>, team: TeamId, sequence: u32, cooldown: u32) -> bool {
    last_played
        .get(&team)
        .map_or(true, |&last| sequence - last >= cooldown)
}

/// Generate group-phase games for the roster.
///
/// 1. Enumerate each within-group pair once, groups in label order.
/// 2. Walk forward through sequence numbers starting at `starting_sequence`.
/// 3. At each number schedule the first remaining pair whose teams are both fresh or
///    have rested at least `rest_cooldown` numbers; courts are handed out round-robin.
/// 4. If nothing fits, leave the number empty. After too many empty numbers in a row
///    the schedule stops and the games produced so far are returned.
pub fn generate_group_matches(
    teams: &[Team],
    settings: &TournamentSettings,
    starting_sequence: u32,
) -> Vec<Game> {
    let mut remaining = enumerate_matchups(teams, settings);
    let cooldown = settings.rest_cooldown.max(1);
    let mut last_played: HashMap<TeamId, u32> = HashMap::new();
    let mut games: Vec<Game> = Vec::with_capacity(remaining.len());
    let mut sequence = starting_sequence.max(1);
    let mut idle = 0usize;

    while !remaining.is_empty() {
        let next = remaining.iter().position(|m| {
            is_rested(&last_played, m.team_1, sequence, cooldown)
                && is_rested(&last_played, m.team_2, sequence, cooldown)
        });
        match next {
            Some(idx) => {
                let matchup = remaining.remove(idx);
                let mut game = Game::new(
                    Entrant::Team(matchup.team_1),
                    Entrant::Team(matchup.team_2),
                    Phase::Group,
                    settings.court_label(games.len()),
                    settings.sets_per_game(),
                );
                game.sequence = Some(sequence);
                game.group = Some(matchup.group);
                last_played.insert(matchup.team_1, sequence);
                last_played.insert(matchup.team_2, sequence);
                log::debug!("Scheduled game #{} on {}", sequence, game.field);
                games.push(game);
                idle = 0;
            }
            None => {
                idle += 1;
                if idle >= IDLE_ADVANCES_PER_MATCHUP * remaining.len() {
                    log::warn!(
                        "Stopping schedule with {} matchup(s) blocked by a rest cooldown of {}",
                        remaining.len(),
                        cooldown
                    );
                    break;
                }
            }
        }
        sequence += 1;
    }

    games
}

/// Replace the tournament's group games with a freshly generated schedule.
///
/// Refused once any group game has been started or finished, and outside the group phase.
pub fn generate_group_stage(tournament: &mut Tournament) -> Result<ScheduleReport, TournamentError> {
    if tournament.phase != Phase::Group {
        return Err(TournamentError::InvalidState);
    }
    let started = tournament
        .games
        .iter()
        .any(|g| g.phase == Phase::Group && (g.is_running || g.is_complete));
    if started {
        return Err(TournamentError::InvalidState);
    }

    tournament.games.retain(|g| g.phase != Phase::Group);
    let starting_sequence = tournament.next_sequence();
    let games = generate_group_matches(&tournament.teams, &tournament.settings, starting_sequence);
    let expected = round_robin_size(&tournament.teams, &tournament.settings);
    let scheduled = games.len();

    // Group games go in front of any knockout games.
    let mut all = games;
    all.append(&mut tournament.games);
    tournament.games = all;

    let notification = if scheduled == expected {
        log::info!("Generated {} group game(s)", scheduled);
        Notification::new(
            NotificationKind::ScheduleGenerated,
            format!("{} round-robin games have been generated for all groups", scheduled),
        )
    } else {
        log::warn!("Generated {} of {} group game(s)", scheduled, expected);
        Notification::new(
            NotificationKind::ScheduleIncomplete,
            format!(
                "Only {} of {} games could be scheduled with a rest cooldown of {}",
                scheduled, expected, tournament.settings.rest_cooldown
            ),
        )
    };

    Ok(ScheduleReport {
        scheduled,
        expected,
        notification,
    })
}
