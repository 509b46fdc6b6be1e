//! Single binary web server: JSON API over in-memory tournaments.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_web::{
    delete, get, post, put,
    web::{Bytes, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::Utc;
use court_tournament::{
    export_teams_csv, generate_group_stage, generate_knockout_stage, group_standings,
    import_teams_csv, override_score, score_point, GameId, Notification, NotificationKind, Phase,
    Side, TeamId, Tournament, TournamentError, TournamentId, TournamentSettings,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Tournament plus the events an action produced.
#[derive(Serialize)]
struct ActionResponse<'a> {
    tournament: &'a Tournament,
    notifications: Vec<Notification>,
}

#[derive(Serialize)]
struct GroupStanding<'a> {
    group: String,
    teams: Vec<&'a court_tournament::Team>,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    group: String,
}

#[derive(Deserialize)]
struct CreateGameBody {
    team_1: TeamId,
    team_2: TeamId,
    field: String,
}

#[derive(Deserialize)]
struct ScoreBody {
    side: Side,
    delta: i32,
}

#[derive(Deserialize)]
struct FinalScoreBody {
    team_1_score: u32,
    team_2_score: u32,
}

#[derive(Deserialize)]
struct AssignEntrantsBody {
    team_1: TeamId,
    team_2: TeamId,
}

#[derive(Deserialize)]
struct PhaseBody {
    phase: Phase,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and team id
#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: TeamId,
}

/// Path segments: tournament id and game id
#[derive(Deserialize)]
struct TournamentGamePath {
    id: TournamentId,
    game_id: GameId,
}

fn bad_request(e: TournamentError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

/// Look up a tournament, refresh its activity time and run `action` on it.
fn with_tournament<F>(state: &AppState, id: TournamentId, action: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<HttpResponse, TournamentError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    action(&mut entry.tournament).unwrap_or_else(bad_request)
}

/// Court and delay for an auto-start, when `game_id` just completed and a delay is configured.
fn auto_start_target(
    t: &Tournament,
    game_id: GameId,
    notifications: &[Notification],
) -> Option<(String, Duration)> {
    let secs = t.settings.auto_start_delay_secs?;
    if !notifications.iter().any(|n| n.kind == NotificationKind::MatchComplete) {
        return None;
    }
    let game = t.game(game_id)?;
    Some((game.field.clone(), Duration::from_secs(secs)))
}

/// After a game completes, start the next pending game on the same court once the delay passes.
fn schedule_auto_start(state: AppState, id: TournamentId, field: String, delay: Duration) {
    actix_web::rt::spawn(async move {
        tokio::time::sleep(delay).await;
        let mut g = match state.write() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        let Some(entry) = g.get_mut(&id) else {
            return;
        };
        let t = &mut entry.tournament;
        if let Some(next) = t.next_game_on_field(&field) {
            match t.start_game(next, Utc::now()) {
                Ok(()) => log::info!("Auto-started game {} on {}", next, field),
                Err(e) => log::debug!("Auto-start on {} skipped: {}", field, e),
            }
        }
    });
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "court-tournament",
    })
}

/// Settings for a new tournament: defaults for an empty body, otherwise the JSON must parse.
fn parse_settings(body: &[u8]) -> Result<TournamentSettings, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TournamentSettings::default());
    }
    serde_json::from_slice(body)
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
/// An empty body means default settings; a malformed one is rejected.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Bytes) -> HttpResponse {
    let settings = match parse_settings(&body) {
        Ok(settings) => settings,
        Err(e) => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": format!("Invalid settings: {}", e) }))
        }
    };
    if let Err(e) = settings.validate() {
        return bad_request(e);
    }
    let tournament = Tournament::new(settings);
    let response = HttpResponse::Ok().json(&tournament);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        tournament.id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| Ok(HttpResponse::Ok().json(&*t)))
}

/// Replace the settings (refused while a game is running).
#[put("/api/tournaments/{id}/settings")]
async fn api_update_settings(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<TournamentSettings>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        t.update_settings(body.into_inner())?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(state: AppState, path: Path<TournamentPath>, body: Json<AddTeamBody>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        t.add_team(&body.name, &body.group)?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

/// Remove a team and its games.
#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_remove_team(state: AppState, path: Path<TournamentTeamPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        t.remove_team(path.team_id)?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

/// Download the roster as CSV.
#[get("/api/tournaments/{id}/teams/export")]
async fn api_export_teams(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let csv = export_teams_csv(&t.teams)?;
        Ok(HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(("Content-Disposition", "attachment; filename=\"tournament_teams.csv\""))
            .body(csv))
    })
}

/// Replace the roster from a CSV body.
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(state: AppState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let teams = import_teams_csv(&body, &t.teams)?;
        t.replace_teams(teams)?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let standings: Vec<GroupStanding> = group_standings(&t.teams, &t.settings)
            .into_iter()
            .map(|(group, teams)| GroupStanding { group, teams })
            .collect();
        Ok(HttpResponse::Ok().json(standings))
    })
}

/// Generate the group stage schedule.
#[post("/api/tournaments/{id}/games/generate")]
async fn api_generate_games(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let report = generate_group_stage(t)?;
        Ok(HttpResponse::Ok().json(ActionResponse {
            tournament: t,
            notifications: vec![report.notification],
        }))
    })
}

/// Manually create a game between two teams.
#[post("/api/tournaments/{id}/games")]
async fn api_create_game(state: AppState, path: Path<TournamentPath>, body: Json<CreateGameBody>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        t.create_game(body.team_1, body.team_2, &body.field)?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

#[delete("/api/tournaments/{id}/games/{game_id}")]
async fn api_delete_game(state: AppState, path: Path<TournamentGamePath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        t.delete_game(path.game_id)?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

#[post("/api/tournaments/{id}/games/{game_id}/start")]
async fn api_start_game(state: AppState, path: Path<TournamentGamePath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        t.start_game(path.game_id, Utc::now())?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

#[post("/api/tournaments/{id}/games/{game_id}/stop")]
async fn api_stop_game(state: AppState, path: Path<TournamentGamePath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        t.stop_game(path.game_id)?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

/// Add or remove a point for one side of a running game.
#[post("/api/tournaments/{id}/games/{game_id}/score")]
async fn api_score(state: AppState, path: Path<TournamentGamePath>, body: Json<ScoreBody>) -> HttpResponse {
    let mut auto_start = None;
    let response = with_tournament(&state, path.id, |t| {
        let notifications = score_point(t, path.game_id, body.side, body.delta)?;
        auto_start = auto_start_target(t, path.game_id, &notifications);
        Ok(HttpResponse::Ok().json(ActionResponse {
            tournament: t,
            notifications,
        }))
    });
    if let Some((field, delay)) = auto_start {
        schedule_auto_start(state.clone(), path.id, field, delay);
    }
    response
}

/// Admin override: set a game's final score directly.
#[put("/api/tournaments/{id}/games/{game_id}/final-score")]
async fn api_final_score(
    state: AppState,
    path: Path<TournamentGamePath>,
    body: Json<FinalScoreBody>,
) -> HttpResponse {
    let mut auto_start = None;
    let response = with_tournament(&state, path.id, |t| {
        let notifications = override_score(t, path.game_id, body.team_1_score, body.team_2_score)?;
        auto_start = auto_start_target(t, path.game_id, &notifications);
        Ok(HttpResponse::Ok().json(ActionResponse {
            tournament: t,
            notifications,
        }))
    });
    if let Some((field, delay)) = auto_start {
        schedule_auto_start(state.clone(), path.id, field, delay);
    }
    response
}

/// Fill the slots of a knockout placeholder game.
#[put("/api/tournaments/{id}/games/{game_id}/entrants")]
async fn api_assign_entrants(
    state: AppState,
    path: Path<TournamentGamePath>,
    body: Json<AssignEntrantsBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        t.assign_entrants(path.game_id, body.team_1, body.team_2)?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

/// Generate the knockout bracket from the current standings.
#[post("/api/tournaments/{id}/knockout/generate")]
async fn api_generate_knockout(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let notification = generate_knockout_stage(t)?;
        Ok(HttpResponse::Ok().json(ActionResponse {
            tournament: t,
            notifications: vec![notification],
        }))
    })
}

#[put("/api/tournaments/{id}/phase")]
async fn api_set_phase(state: AppState, path: Path<TournamentPath>, body: Json<PhaseBody>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        t.set_phase(body.phase);
        Ok(HttpResponse::Ok().json(&*t))
    })
}

/// Clear all teams and games.
#[post("/api/tournaments/{id}/reset")]
async fn api_reset_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        t.reset();
        Ok(HttpResponse::Ok().json(&*t))
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_update_settings)
            .service(api_add_team)
            .service(api_remove_team)
            .service(api_export_teams)
            .service(api_import_teams)
            .service(api_standings)
            .service(api_generate_games)
            .service(api_create_game)
            .service(api_delete_game)
            .service(api_start_game)
            .service(api_stop_game)
            .service(api_score)
            .service(api_final_score)
            .service(api_assign_entrants)
            .service(api_generate_knockout)
            .service(api_set_phase)
            .service(api_reset_tournament)
    })
    .bind(bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_gives_default_settings() {
        assert_eq!(parse_settings(b"").unwrap(), TournamentSettings::default());
        assert_eq!(parse_settings(b" \n").unwrap(), TournamentSettings::default());
        assert_eq!(parse_settings(b"{\"number_of_courts\": 2}").unwrap().number_of_courts, 2);
    }

    #[test]
    fn malformed_settings_are_rejected() {
        assert!(parse_settings(b"{\"number_of_courts\": ").is_err());
        assert!(parse_settings(b"{\"number_of_courts\": \"two\"}").is_err());
    }

    fn pending_game(delay: Option<u64>) -> (Tournament, GameId) {
        let mut t = Tournament::new(TournamentSettings {
            auto_start_delay_secs: delay,
            ..Default::default()
        });
        let a = t.add_team("Aces", "A").unwrap();
        let b = t.add_team("Blocks", "A").unwrap();
        let game = t.create_game(a, b, "Court 2").unwrap();
        (t, game)
    }

    #[test]
    fn override_completion_triggers_auto_start() {
        let (mut t, game) = pending_game(Some(30));
        let notifications = override_score(&mut t, game, 15, 11).unwrap();
        assert_eq!(
            auto_start_target(&t, game, &notifications),
            Some(("Court 2".to_string(), Duration::from_secs(30)))
        );
    }

    #[test]
    fn no_auto_start_without_delay_or_completion() {
        let (mut t, game) = pending_game(None);
        let notifications = override_score(&mut t, game, 15, 11).unwrap();
        assert_eq!(auto_start_target(&t, game, &notifications), None);

        let (mut t, game) = pending_game(Some(30));
        t.start_game(game, Utc::now()).unwrap();
        let notifications = score_point(&mut t, game, Side::Team1, 1).unwrap();
        assert_eq!(auto_start_target(&t, game, &notifications), None);
    }
}
