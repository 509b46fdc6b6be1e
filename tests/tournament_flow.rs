//! Integration tests for the tournament aggregate: roster, game control and phase progression.

use chrono::Utc;
use court_tournament::{
    generate_group_stage, override_score, score_point, Entrant, NotificationKind, Phase, Side,
    Tournament, TournamentError, TournamentSettings,
};

fn two_groups_of_three() -> Tournament {
    let mut t = Tournament::new(TournamentSettings {
        number_of_groups: 2,
        number_of_courts: 2,
        teams_advancing_from_group: 2,
        ..Default::default()
    });
    for (name, group) in [
        ("A0", "A"),
        ("A1", "A"),
        ("A2", "A"),
        ("B0", "B"),
        ("B1", "B"),
        ("B2", "B"),
    ] {
        t.add_team(name, group).unwrap();
    }
    t
}

fn team_id(t: &Tournament, name: &str) -> court_tournament::TeamId {
    t.teams.iter().find(|team| team.name == name).unwrap().id
}

#[test]
fn finishing_the_group_stage_generates_the_bracket() {
    let mut t = two_groups_of_three();
    let report = generate_group_stage(&mut t).unwrap();
    assert_eq!(report.scheduled, 6);

    let game_ids: Vec<_> = t.games.iter().map(|g| g.id).collect();
    let mut last = Vec::new();
    for id in game_ids {
        t.start_game(id, Utc::now()).unwrap();
        for _ in 0..15 {
            last = score_point(&mut t, id, Side::Team1, 1).unwrap();
        }
        assert!(t.game(id).unwrap().is_complete);
    }

    let kinds: Vec<_> = last.iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::MatchComplete, NotificationKind::KnockoutGenerated]);
    assert_eq!(t.phase, Phase::Semifinal);

    let a0 = t.teams.iter().find(|team| team.name == "A0").unwrap();
    assert_eq!((a0.wins, a0.losses, a0.points_for), (2, 0, 30));
    for team in &t.teams {
        assert!(team.games_played() <= 2);
    }

    let semis: Vec<_> = t.games.iter().filter(|g| g.phase == Phase::Semifinal).collect();
    assert_eq!(semis.len(), 2);
    assert_eq!(semis[0].team_1, Entrant::Team(team_id(&t, "A0")));
    assert_eq!(semis[0].team_2, Entrant::Team(team_id(&t, "B1")));
    assert_eq!(semis[1].team_1, Entrant::Team(team_id(&t, "A1")));
    assert_eq!(semis[1].team_2, Entrant::Team(team_id(&t, "B0")));
}

#[test]
fn group_stage_without_enough_qualifiers_reports_insufficient_teams() {
    let mut t = Tournament::new(TournamentSettings {
        number_of_groups: 1,
        ..Default::default()
    });
    for name in ["Aces", "Blocks", "Digs"] {
        t.add_team(name, "A").unwrap();
    }
    generate_group_stage(&mut t).unwrap();
    let ids: Vec<_> = t.games.iter().map(|g| g.id).collect();
    let mut last = Vec::new();
    for id in ids {
        last = override_score(&mut t, id, 15, 9).unwrap();
    }
    assert_eq!(last.last().unwrap().kind, NotificationKind::InsufficientTeams);
    assert_eq!(t.phase, Phase::Group);
}

#[test]
fn score_point_on_unknown_game_is_an_error() {
    let mut t = two_groups_of_three();
    let missing = uuid::Uuid::new_v4();
    assert_eq!(
        score_point(&mut t, missing, Side::Team1, 1),
        Err(TournamentError::GameNotFound(missing))
    );
}

#[test]
fn stale_increment_on_pending_game_changes_nothing() {
    let mut t = two_groups_of_three();
    generate_group_stage(&mut t).unwrap();
    let id = t.games[0].id;
    let before = t.games.clone();
    let notifications = score_point(&mut t, id, Side::Team1, 1).unwrap();
    assert!(notifications.is_empty());
    assert_eq!(t.games, before);
}

#[test]
fn override_rejects_ties() {
    let mut t = two_groups_of_three();
    generate_group_stage(&mut t).unwrap();
    let id = t.games[0].id;
    assert_eq!(override_score(&mut t, id, 7, 7), Err(TournamentError::TiedScore));
}

#[test]
fn a_team_plays_one_game_at_a_time() {
    let mut t = two_groups_of_three();
    let (a0, a1, a2) = (team_id(&t, "A0"), team_id(&t, "A1"), team_id(&t, "A2"));
    let first = t.create_game(a0, a1, "Court 1").unwrap();
    let second = t.create_game(a0, a2, "Court 2").unwrap();
    t.start_game(first, Utc::now()).unwrap();
    assert_eq!(t.start_game(second, Utc::now()), Err(TournamentError::TeamBusy(a0)));

    t.stop_game(first).unwrap();
    t.start_game(second, Utc::now()).unwrap();
    assert!(t.game(second).unwrap().started_at.is_some());
}

#[test]
fn next_game_on_field_follows_sequence() {
    let mut t = two_groups_of_three();
    generate_group_stage(&mut t).unwrap();
    let on_court_1: Vec<_> = t.games.iter().filter(|g| g.field == "Court 1").map(|g| g.id).collect();
    assert_eq!(t.next_game_on_field("Court 1"), Some(on_court_1[0]));

    t.start_game(on_court_1[0], Utc::now()).unwrap();
    assert_eq!(t.next_game_on_field("Court 1"), None);
    override_score(&mut t, on_court_1[0], 15, 3).unwrap();
    assert_eq!(t.next_game_on_field("Court 1"), Some(on_court_1[1]));
}

#[test]
fn roster_rules() {
    let mut t = two_groups_of_three();
    assert_eq!(t.add_team("a0", "B"), Err(TournamentError::DuplicateTeamName));
    assert_eq!(t.add_team("   ", "A"), Err(TournamentError::EmptyTeamName));
    assert_eq!(
        t.add_team("Zed", "E"),
        Err(TournamentError::UnknownGroup("E".to_string()))
    );
    assert!(t.add_team("Lower", "b").is_ok());
    assert_eq!(t.real_team_count(), 7);

    generate_group_stage(&mut t).unwrap();
    let a0 = team_id(&t, "A0");
    t.remove_team(a0).unwrap();
    assert!(t.games.iter().all(|g| !g.involves(a0)));
    assert_eq!(t.create_game(a0, a0, "Court 1"), Err(TournamentError::SameTeam));
}

#[test]
fn settings_cannot_change_mid_game() {
    let mut t = two_groups_of_three();
    generate_group_stage(&mut t).unwrap();
    let id = t.games[0].id;
    t.start_game(id, Utc::now()).unwrap();
    let settings = TournamentSettings {
        points_to_win: 21,
        ..t.settings.clone()
    };
    assert_eq!(t.update_settings(settings.clone()), Err(TournamentError::InvalidState));
    t.stop_game(id).unwrap();
    t.update_settings(settings).unwrap();
    assert_eq!(t.settings.points_to_win, 21);
}

#[test]
fn reset_clears_teams_and_games() {
    let mut t = two_groups_of_three();
    generate_group_stage(&mut t).unwrap();
    t.set_phase(Phase::Final);
    t.reset();
    assert!(t.teams.is_empty());
    assert!(t.games.is_empty());
    assert_eq!(t.phase, Phase::Group);
}
