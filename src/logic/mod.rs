//! Tournament business logic: scheduling, knockout bracket, live scoring, phases.

mod knockout;
mod phase;
mod roster_csv;
mod schedule;
mod scoring;
mod standings;

pub use knockout::{generate_knockout_bracket, generate_knockout_stage, KnockoutOutcome};
pub use phase::{advance_phase_if_ready, group_stage_complete};
pub use roster_csv::{export_teams_csv, import_teams_csv};
pub use schedule::{generate_group_matches, generate_group_stage, round_robin_size, ScheduleReport};
pub use scoring::{
    apply_manual_score, apply_score_delta, override_score, result_patches, score_point, ScoreUpdate,
};
pub use standings::{group_standings, qualifiers, rank_group};
