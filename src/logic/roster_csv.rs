//! Roster import/export as CSV (spreadsheet round trip of teams and their records).

use crate::models::{Team, TournamentError};
use serde::{Deserialize, Serialize};

/// One spreadsheet row.
#[derive(Debug, Serialize, Deserialize)]
struct TeamRow {
    #[serde(rename = "Team Name")]
    name: String,
    #[serde(rename = "Group")]
    group: String,
    #[serde(rename = "Wins")]
    wins: String,
    #[serde(rename = "Losses")]
    losses: String,
    #[serde(rename = "Points For")]
    points_for: String,
    #[serde(rename = "Points Against")]
    points_against: String,
    #[serde(rename = "Sets Won")]
    sets_won: String,
    #[serde(rename = "Sets Lost")]
    sets_lost: String,
}

const HEADERS: [&str; 8] = [
    "Team Name",
    "Group",
    "Wins",
    "Losses",
    "Points For",
    "Points Against",
    "Sets Won",
    "Sets Lost",
];

fn csv_error(e: impl std::fmt::Display) -> TournamentError {
    TournamentError::Csv(e.to_string())
}

/// Unparseable numbers count as zero, like a spreadsheet with blank cells.
fn count(cell: &str) -> u32 {
    cell.trim().parse().unwrap_or(0)
}

/// Write the roster with a header row (also for an empty roster).
pub fn export_teams_csv(teams: &[Team]) -> Result<String, TournamentError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADERS).map_err(csv_error)?;
    for team in teams {
        writer
            .serialize(TeamRow {
                name: team.name.clone(),
                group: team.group.clone(),
                wins: team.wins.to_string(),
                losses: team.losses.to_string(),
                points_for: team.points_for.to_string(),
                points_against: team.points_against.to_string(),
                sets_won: team.sets_won.to_string(),
                sets_lost: team.sets_lost.to_string(),
            })
            .map_err(csv_error)?;
    }
    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

/// Read a roster. Rows whose name matches an existing team (case-insensitive) keep that
/// team's id.
///
/// All eight columns are required in the header; blank rows are skipped. A name that
/// appears twice is rejected with `DuplicateTeamName`.
pub fn import_teams_csv(data: &str, existing: &[Team]) -> Result<Vec<Team>, TournamentError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());
    let mut teams = Vec::new();
    for row in reader.deserialize::<TeamRow>() {
        let row = row.map_err(csv_error)?;
        let name = row.name.trim();
        if name.is_empty() {
            continue;
        }
        if teams.iter().any(|t: &Team| t.name.eq_ignore_ascii_case(name)) {
            return Err(TournamentError::DuplicateTeamName);
        }
        let mut team = Team::new(name, row.group.trim().to_ascii_uppercase());
        if let Some(known) = existing.iter().find(|t| t.name.eq_ignore_ascii_case(name)) {
            team.id = known.id;
        }
        team.wins = count(&row.wins);
        team.losses = count(&row.losses);
        team.points_for = count(&row.points_for);
        team.points_against = count(&row.points_against);
        team.sets_won = count(&row.sets_won);
        team.sets_lost = count(&row.sets_lost);
        teams.push(team);
    }
    log::info!("Imported {} team(s) from CSV", teams.len());
    Ok(teams)
}
