//! Warmup status report shown to players

use crate::registry::Roster;
use crate::round::RoundState;

pub const COMMAND_HINT: &str = "Commands: [/ready, /notready, /disable]";

/// Builds the three report lines: one per team, then the round state with
/// the streaming players.
pub fn compose_report(
    team_names: (&str, &str),
    roster: &Roster,
    state: RoundState,
) -> Vec<String> {
    vec![
        format!(
            "Team {}: R({}) NR({})",
            team_names.0,
            roster.team_a_ready.join(", "),
            roster.team_a_not_ready.join(", ")
        ),
        format!(
            "Team {}: R({}) NR({})",
            team_names.1,
            roster.team_b_ready.join(", "),
            roster.team_b_not_ready.join(", ")
        ),
        format!(
            "Game State: {} STREAM({}) {}",
            state,
            roster.streaming.join(", "),
            COMMAND_HINT
        ),
    ]
}
