//! Hand-off of computed results to the external document generator.

use serde::Serialize;
use thiserror::Error;

use crate::ReportExporter;
use crate::grouping::GroupingVariable;
use crate::session::GameSession;
use crate::stats::SummaryTable;
use crate::variables::VariableId;

/// Endpoint of the document generator that consumes [`ReportInput`].
pub const REPORT_ENDPOINT: &str = "/api/generate-word-report";

/// Everything the report generator needs, borrowed from the analysis.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput<'a> {
    pub methodology: &'a str,
    pub selected_sessions: &'a [&'a GameSession],
    pub selected_variables: &'a [VariableId],
    pub summary_stats: &'a SummaryTable,
    pub all_sessions: &'a [GameSession],
    pub grouping_variable: GroupingVariable,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("a methodology must be chosen before generating a report")]
    MissingMethodology,
    #[error("no sessions are selected for the report")]
    NoSessions,
    #[error("failed to serialize report payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReportInput<'_> {
    /// # Errors
    ///
    /// Returns an error if the methodology is blank or no session is
    /// selected.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.methodology.trim().is_empty() {
            return Err(ReportError::MissingMethodology);
        }
        if self.selected_sessions.is_empty() {
            return Err(ReportError::NoSessions);
        }
        Ok(())
    }

    /// Pretty JSON request body for [`REPORT_ENDPOINT`].
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid or cannot be serialized.
    pub fn to_json(&self) -> Result<String, ReportError> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Exporter that produces the request body instead of a document. Used
/// when the generator runs elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayloadExporter;

impl ReportExporter for JsonPayloadExporter {
    type Error = ReportError;
    type Document = String;

    fn export(&self, input: &ReportInput<'_>) -> Result<Self::Document, Self::Error> {
        input.to_json()
    }
}
