//! Integration tests for roster CSV import/export.

use court_tournament::{
    export_teams_csv, generate_group_stage, import_teams_csv, Team, Tournament, TournamentError,
    TournamentSettings,
};

#[test]
fn export_writes_header_and_rows() {
    let mut team = Team::new("Net Ninjas", "B");
    team.wins = 2;
    team.points_for = 30;
    let csv = export_teams_csv(&[team]).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Team Name,Group,Wins,Losses,Points For,Points Against,Sets Won,Sets Lost")
    );
    assert_eq!(lines.next(), Some("Net Ninjas,B,2,0,30,0,0,0"));
    assert_eq!(lines.next(), None);
}

#[test]
fn empty_roster_still_has_header() {
    let csv = export_teams_csv(&[]).unwrap();
    assert!(csv.starts_with("Team Name,"));
}

#[test]
fn import_keeps_ids_of_known_teams() {
    let existing = vec![Team::new("Aces", "A")];
    let data = "\
Team Name,Group,Wins,Losses,Points For,Points Against,Sets Won,Sets Lost
Aces,a,3,1,60,41,3,1

\"Blocks, Inc\",B,x,2,,30,0,2
";
    let teams = import_teams_csv(data, &existing).unwrap();
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].id, existing[0].id);
    assert_eq!(teams[0].group, "A");
    assert_eq!((teams[0].wins, teams[0].points_against), (3, 41));
    assert_eq!(teams[1].name, "Blocks, Inc");
    assert_eq!((teams[1].wins, teams[1].losses, teams[1].points_for), (0, 2, 0));
}

#[test]
fn import_requires_all_columns() {
    let data = "Team Name,Group,Wins\nAces,A,1\n";
    assert!(matches!(import_teams_csv(data, &[]), Err(TournamentError::Csv(_))));
}

#[test]
fn import_rejects_repeated_names() {
    let existing = vec![Team::new("Aces", "A")];
    let data = "\
Team Name,Group,Wins,Losses,Points For,Points Against,Sets Won,Sets Lost
Aces,A,0,0,0,0,0,0
Blocks,A,0,0,0,0,0,0
aces,A,0,0,0,0,0,0
";
    assert_eq!(
        import_teams_csv(data, &existing),
        Err(TournamentError::DuplicateTeamName)
    );
}

#[test]
fn import_matches_existing_names_ignoring_case() {
    let existing = vec![Team::new("Aces", "A")];
    let data = "\
Team Name,Group,Wins,Losses,Points For,Points Against,Sets Won,Sets Lost
ACES,A,1,0,15,9,1,0
";
    let teams = import_teams_csv(data, &existing).unwrap();
    assert_eq!(teams[0].id, existing[0].id);
}

#[test]
fn replaced_roster_follows_the_add_team_rules() {
    let mut t = Tournament::new(TournamentSettings {
        number_of_groups: 2,
        ..Default::default()
    });
    let aces = t.add_team("Aces", "A").unwrap();

    let original = t.teams[0].clone();
    let mut copy = original.clone();
    copy.name = "Aces Again".to_string();
    assert_eq!(
        t.replace_teams(vec![original, copy]),
        Err(TournamentError::DuplicateTeamName)
    );
    assert_eq!(
        t.replace_teams(vec![Team::new("Aces", "A"), Team::new("aces", "B")]),
        Err(TournamentError::DuplicateTeamName)
    );
    assert_eq!(
        t.replace_teams(vec![Team::new("Zed", "C")]),
        Err(TournamentError::UnknownGroup("C".to_string()))
    );
    assert_eq!(t.teams.len(), 1);
    assert_eq!(t.teams[0].id, aces);
}

#[test]
fn imported_roster_never_schedules_a_team_against_itself() {
    let mut t = Tournament::new(TournamentSettings {
        number_of_groups: 1,
        ..Default::default()
    });
    t.add_team("Aces", "A").unwrap();
    let data = "\
Team Name,Group,Wins,Losses,Points For,Points Against,Sets Won,Sets Lost
Aces,A,0,0,0,0,0,0
Blocks,A,0,0,0,0,0,0
Cards,A,0,0,0,0,0,0
";
    let teams = import_teams_csv(data, &t.teams).unwrap();
    t.replace_teams(teams).unwrap();
    generate_group_stage(&mut t).unwrap();
    assert_eq!(t.games.len(), 3);
    for game in &t.games {
        assert_ne!(game.team_1, game.team_2);
    }
}
