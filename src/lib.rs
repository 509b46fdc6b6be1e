//! Court tournament manager: library with models and business logic.

pub mod logic;
pub mod models;

pub use logic::{
    advance_phase_if_ready, apply_manual_score, apply_score_delta, export_teams_csv,
    generate_group_matches, generate_group_stage, generate_knockout_bracket,
    generate_knockout_stage, group_stage_complete, group_standings, import_teams_csv,
    override_score, qualifiers, rank_group, result_patches, round_robin_size, score_point,
    KnockoutOutcome, ScheduleReport, ScoreUpdate,
};
pub use models::{
    Entrant, Game, GameId, GameSet, Notification, NotificationKind, Phase, Side, Team, TeamId,
    TeamPatch, Tournament, TournamentError, TournamentId, TournamentSettings, WinCondition,
};
