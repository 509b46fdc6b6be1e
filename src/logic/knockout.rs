//! Knockout stage: seeded bracket skeleton built from the ranked qualifiers.

use crate::logic::standings::qualifiers;
use crate::models::{
    Entrant, Game, Notification, NotificationKind, Phase, Side, Team, Tournament, TournamentError,
    TournamentSettings, MAX_BRACKET_SIZE,
};

/// Result of trying to build the knockout bracket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KnockoutOutcome {
    Generated {
        /// First-round games (seeded), then semifinal and final placeholders.
        games: Vec<Game>,
        /// Qualifiers actually placed in the bracket (byes excluded).
        real_teams: usize,
        first_round: Phase,
    },
    /// Too few qualifiers; nothing was generated.
    NotReady { required: usize, available: usize },
}

impl KnockoutOutcome {
    pub fn notification(&self) -> Notification {
        match self {
            KnockoutOutcome::Generated {
                real_teams,
                first_round,
                ..
            } => {
                let round = match first_round {
                    Phase::Quarterfinal => "Quarterfinals",
                    _ => "Semifinals",
                };
                Notification::new(
                    NotificationKind::KnockoutGenerated,
                    format!("{} generated for {} teams. Knockout phase has begun!", round, real_teams),
                )
            }
            KnockoutOutcome::NotReady {
                required,
                available,
            } => Notification::new(
                NotificationKind::InsufficientTeams,
                format!(
                    "Need at least {} teams to generate knockout phase ({} qualified)",
                    required, available
                ),
            ),
        }
    }
}

/// A first-round game against a bye is decided before it is played.
fn settle_walkover(game: &mut Game) {
    let winner = match (game.team_1, game.team_2) {
        (Entrant::Team(_), Entrant::Bye) => Side::Team1,
        (Entrant::Bye, Entrant::Team(_)) => Side::Team2,
        _ => return,
    };
    game.winner = Some(winner);
    game.is_complete = true;
}

/// Build the knockout bracket from qualifiers ranked best first.
///
/// Up to four qualifiers give a four-leaf bracket (semifinals 1v4, 2v3), up to eight an
/// eight-leaf one (quarterfinals 1v8, 2v7, 3v6, 4v5). Missing seeds are filled with byes.
/// Later rounds are created as TBD placeholders. Qualifiers past the eighth are ignored.
pub fn generate_knockout_bracket(qualified: &[&Team], settings: &TournamentSettings) -> KnockoutOutcome {
    let required = settings.min_knockout_teams as usize;
    let available = qualified.len();
    if available < required {
        log::warn!("Knockout not ready: {} of {} teams qualified", available, required);
        return KnockoutOutcome::NotReady {
            required,
            available,
        };
    }
    if available > MAX_BRACKET_SIZE {
        log::warn!("Only the top {} of {} qualifiers enter the bracket", MAX_BRACKET_SIZE, available);
    }

    let mut seeds: Vec<Entrant> = qualified
        .iter()
        .take(MAX_BRACKET_SIZE)
        .map(|t| Entrant::Team(t.id))
        .collect();
    let real_teams = seeds.len();
    let size = if real_teams <= 4 { 4 } else { MAX_BRACKET_SIZE };
    seeds.resize(size, Entrant::Bye);

    let first_round = if size == MAX_BRACKET_SIZE {
        Phase::Quarterfinal
    } else {
        Phase::Semifinal
    };
    let set_count = settings.sets_per_game();
    let mut games: Vec<Game> = Vec::with_capacity(size);

    for i in 0..size / 2 {
        let mut game = Game::new(
            seeds[i],
            seeds[size - 1 - i],
            first_round,
            settings.court_label(games.len()),
            set_count,
        );
        settle_walkover(&mut game);
        games.push(game);
    }

    let mut placeholders = Vec::new();
    if first_round == Phase::Quarterfinal {
        placeholders.extend([Phase::Semifinal, Phase::Semifinal]);
    }
    placeholders.push(Phase::Final);
    for phase in placeholders {
        let field = settings.court_label(games.len());
        games.push(Game::new(Entrant::Tbd, Entrant::Tbd, phase, field, set_count));
    }

    KnockoutOutcome::Generated {
        games,
        real_teams,
        first_round,
    }
}

/// Rank every group, build the bracket from its qualifiers and move the tournament into
/// the bracket's first round. A not-ready outcome leaves the tournament untouched.
pub fn generate_knockout_stage(tournament: &mut Tournament) -> Result<Notification, TournamentError> {
    if tournament.games.iter().any(|g| g.phase != Phase::Group) {
        return Err(TournamentError::InvalidState);
    }
    let outcome = {
        let ranked = qualifiers(&tournament.teams, &tournament.settings);
        generate_knockout_bracket(&ranked, &tournament.settings)
    };
    let notification = outcome.notification();

    if let KnockoutOutcome::Generated {
        games, first_round, ..
    } = outcome
    {
        let mut sequence = tournament.next_sequence();
        for mut game in games {
            game.sequence = Some(sequence);
            sequence += 1;
            tournament.games.push(game);
        }
        tournament.phase = first_round;
        log::info!("Tournament {} moved to {:?}", tournament.id, first_round);
    }

    Ok(notification)
}
