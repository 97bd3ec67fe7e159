use anyhow::Result;
use std::io::Write;

use deterrence_core::AnalysisReport;

/// Per-session value table: one row per selected session, one column per
/// selected variable.
pub fn write_csv_report<W: Write>(out: &mut W, report: &AnalysisReport) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["session".to_string(), "winner".to_string()];
    header.extend(report.selected_variables.iter().map(ToString::to_string));
    writer.write_record(&header)?;

    for row in &report.values {
        let mut record = vec![row.session_name.clone(), row.winner.label().to_string()];
        record.extend(report.selected_variables.iter().map(|variable| {
            row.values
                .get(variable)
                .map(ToString::to_string)
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deterrence_core::{
        AnalysisRequest, CardCatalog, GameSession, TeamState, VariableId, run_analysis,
    };

    #[test]
    fn csv_has_one_row_per_session() {
        let mut first = GameSession::named("alpha, the first");
        first.game_state.teams.nato = Some(TeamState {
            total_deterrence: Some(12.5),
            ..TeamState::default()
        });
        let sessions = vec![first, GameSession::named("beta")];
        let request = AnalysisRequest {
            sessions: vec!["alpha, the first".to_string(), "beta".to_string()],
            variables: vec![VariableId::NatoTotal, VariableId::TurnCount],
            ..AnalysisRequest::default()
        };
        let report = run_analysis(&sessions, CardCatalog::default_catalog(), &request);

        let mut buffer = Vec::new();
        write_csv_report(&mut buffer, &report).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "session,winner,nato_total,turn_count");
        assert_eq!(lines[1], "\"alpha, the first\",NATO,12.5,0");
        assert_eq!(lines[2], "beta,Tie,0,0");
    }
}
