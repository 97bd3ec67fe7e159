mod console;
mod csv_report;
mod json;
mod markdown;

pub use console::write_console_report;
pub use csv_report::write_csv_report;
pub use json::write_json_report;
pub use markdown::write_markdown_report;

use deterrence_core::{AnalysisReport, CardRanking, Domain, Team};

const NO_SESSIONS: &str = "No sessions selected. Pass --sessions or check the session files.";
const NO_VARIABLES: &str = "Select at least one variable to see descriptive statistics.";

/// Non-empty rankings in domain order, NATO before Russia.
fn ranked_domains(
    report: &AnalysisReport,
) -> impl Iterator<Item = (Domain, Team, &[CardRanking])> {
    report
        .dimension_rankings
        .iter()
        .flat_map(|(domain, teams)| {
            Team::ALL
                .into_iter()
                .map(move |team| (*domain, team, teams.for_team(team)))
        })
        .filter(|(_, _, rankings)| !rankings.is_empty())
}
