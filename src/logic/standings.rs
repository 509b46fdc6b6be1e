//! Group standings and knockout qualification.

use crate::models::{Team, TournamentSettings};

/// Rank teams of one group, best first.
///
/// Order: wins, then point differential, then points scored. The sort is stable,
/// so teams still level keep their input order.
pub fn rank_group<'a, I>(teams: I) -> Vec<&'a Team>
where
    I: IntoIterator<Item = &'a Team>,
{
    let mut ranked: Vec<&Team> = teams.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.point_diff().cmp(&a.point_diff()))
            .then_with(|| b.points_for.cmp(&a.points_for))
    });
    ranked
}

/// Standings of every configured group, in group order. Empty groups are included.
pub fn group_standings<'a>(
    teams: &'a [Team],
    settings: &TournamentSettings,
) -> Vec<(String, Vec<&'a Team>)> {
    settings
        .group_labels()
        .into_iter()
        .map(|label| {
            let ranked = rank_group(teams.iter().filter(|t| t.group == label));
            (label, ranked)
        })
        .collect()
}

/// Knockout qualifiers, best-seeded first.
///
/// Several groups: the top `teams_advancing_from_group` of each group, concatenated in
/// group order. A single group qualifies by overall ranking and sends enough teams
/// to fill the minimum bracket.
pub fn qualifiers<'a>(teams: &'a [Team], settings: &TournamentSettings) -> Vec<&'a Team> {
    let per_group = if settings.number_of_groups == 1 {
        settings.required_qualifiers()
    } else {
        settings.teams_advancing_from_group as usize
    };
    group_standings(teams, settings)
        .into_iter()
        .flat_map(|(_, ranked)| ranked.into_iter().take(per_group))
        .collect()
}
