//! Deterrence Research Core
//!
//! Analytics behind the Multi-Dimension Deterrence Strategy research
//! dashboard: variable extraction from recorded sessions, descriptive
//! statistics, rule-based statistical test recommendations, hypothesis and
//! research-question analysis, and card purchase mining.
//! This crate performs no I/O; sessions and reports cross its boundary
//! through the [`SessionStore`] and [`ReportExporter`] traits.

pub mod analysis;
pub mod catalog;
pub mod grouping;
pub mod lenient;
pub mod numbers;
pub mod purchases;
pub mod recommender;
pub mod report;
pub mod session;
pub mod stats;
pub mod store;
pub mod text;
pub mod variables;

// Re-export commonly used types
pub use analysis::{AnalysisReport, AnalysisRequest, Analyzer, run_analysis, select_sessions};
pub use catalog::{Card, CardCatalog, CatalogError};
pub use grouping::{
    ComparisonType, GroupingVariable, ParseComparisonError, ParseGroupingError, count_groups,
    group_sessions,
};
pub use purchases::{
    CardFrequency, CardRanking, DimensionRankings, ParseTeamFilterError, Purchase,
    PurchaseAggregator, TeamFilter, TeamRankings, purchases,
};
pub use recommender::{
    SelectionCounts, StatisticalTest, TestCatalog, TestDefinition, TestKind, TestRecommender,
    recommend,
};
pub use report::{JsonPayloadExporter, REPORT_ENDPOINT, ReportError, ReportInput};
pub use session::{
    Domain, GameSession, GameState, LogEntry, ParseDomainError, Team, TeamState, Winner,
};
pub use stats::{DescriptiveStats, SummaryStat, SummaryTable, summarize};
pub use store::{MemorySessionStore, SessionLookupError, fetch_session};
pub use text::{
    HypothesisAnalysis, Narratives, QuestionAnalysis, TestNarrative, analyze_hypothesis,
    analyze_question, recommend_question_test, recommend_tests, recommend_variables,
};
pub use variables::{
    ParseVariableError, SessionValues, VariableDescriptor, VariableId, extract, value_table,
};

/// Source of recorded sessions (`GET /api/sessions` and
/// `GET /api/sessions/by-name/:name`).
/// Platform-specific implementations should provide this
pub trait SessionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// List every stored session
    ///
    /// # Errors
    ///
    /// Returns an error if the sessions cannot be read.
    fn list_sessions(&self) -> Result<Vec<GameSession>, Self::Error>;

    /// Look up one session by its unique name
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. A missing session is
    /// `Ok(None)`.
    fn find_session(&self, name: &str) -> Result<Option<GameSession>, Self::Error>;
}

/// External document generator fed with [`ReportInput`]
pub trait ReportExporter {
    type Error: std::error::Error + Send + Sync + 'static;
    type Document;

    /// Produce a document from the report hand-off
    ///
    /// # Errors
    ///
    /// Returns an error if the input is rejected or generation fails.
    fn export(&self, input: &ReportInput<'_>) -> Result<Self::Document, Self::Error>;
}

/// Research engine tying a session store to the analysis pipeline
pub struct ResearchEngine<'c, S>
where
    S: SessionStore,
{
    store: S,
    analyzer: Analyzer<'c>,
}

impl<'c, S> ResearchEngine<'c, S>
where
    S: SessionStore,
{
    /// Create an engine over `store` using `catalog` and the standard tests
    pub fn new(store: S, catalog: &'c CardCatalog) -> Self {
        Self::with_recommender(store, catalog, TestRecommender::default())
    }

    pub const fn with_recommender(
        store: S,
        catalog: &'c CardCatalog,
        recommender: TestRecommender,
    ) -> Self {
        Self {
            store,
            analyzer: Analyzer::new(catalog, recommender),
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Fetch one session by name
    ///
    /// # Errors
    ///
    /// Returns [`SessionLookupError::NotFound`] or the store's failure.
    pub fn session(&self, name: &str) -> Result<GameSession, SessionLookupError<S::Error>> {
        fetch_session(&self.store, name)
    }

    /// Load every session and run the analysis for `request`
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot list sessions; the analysis is
    /// not run in that case.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, S::Error> {
        let sessions = self.store.list_sessions()?;
        Ok(self.analyzer.run(&sessions, request))
    }
}
