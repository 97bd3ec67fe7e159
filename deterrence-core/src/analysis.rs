//! The recompute-on-selection pipeline behind the research dashboard.
//!
//! An [`AnalysisRequest`] captures the selection state. [`Analyzer::run`]
//! feeds it through every component and returns an [`AnalysisReport`]. The
//! pipeline is pure: identical sessions and requests give identical reports.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::catalog::CardCatalog;
use crate::grouping::{ComparisonType, GroupingVariable, group_sessions};
use crate::purchases::{CardFrequency, DimensionRankings, PurchaseAggregator, TeamFilter};
use crate::recommender::{SelectionCounts, StatisticalTest, TestRecommender};
use crate::report::ReportInput;
use crate::session::GameSession;
use crate::stats::{SummaryTable, summarize};
use crate::text::{HypothesisAnalysis, QuestionAnalysis, analyze_hypothesis, analyze_question};
use crate::variables::{SessionValues, VariableId, value_table};

/// Selection state of the dashboard. Omitted fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Session names, in display order.
    pub sessions: Vec<String>,
    pub variables: Vec<VariableId>,
    pub grouping_variable: GroupingVariable,
    pub comparison_type: ComparisonType,
    /// One entry per hypothesis panel.
    pub hypotheses: Vec<String>,
    pub research_question: Option<String>,
    /// Card ids for the frequency view.
    pub cards: Vec<String>,
    pub team_filter: TeamFilter,
    /// Test chosen for the exported report.
    pub methodology: Option<String>,
}

/// Everything the dashboard shows for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub selected_sessions: Vec<String>,
    pub missing_sessions: Vec<String>,
    pub selected_variables: Vec<VariableId>,
    pub summary: SummaryTable,
    pub values: Vec<SessionValues>,
    pub counts: SelectionCounts,
    pub groups: BTreeMap<String, Vec<String>>,
    pub tests: Vec<StatisticalTest>,
    pub hypotheses: Vec<HypothesisAnalysis>,
    pub question: Option<QuestionAnalysis>,
    pub card_frequency: Vec<CardFrequency>,
    pub dimension_rankings: DimensionRankings,
    pub methodology: Option<String>,
}

impl AnalysisReport {
    /// Tests whose requirements the selection meets.
    pub fn appropriate_tests(&self) -> impl Iterator<Item = &StatisticalTest> {
        self.tests.iter().filter(|test| test.appropriate)
    }

    /// Report hand-off for this analysis, `None` until a methodology is
    /// chosen. `selected` must be the sessions resolved for the request.
    #[must_use]
    pub fn report_input<'a>(
        &'a self,
        all_sessions: &'a [GameSession],
        selected: &'a [&'a GameSession],
    ) -> Option<ReportInput<'a>> {
        let methodology = self.methodology.as_deref()?;
        Some(ReportInput {
            methodology,
            selected_sessions: selected,
            selected_variables: &self.selected_variables,
            summary_stats: &self.summary,
            all_sessions,
            grouping_variable: self.counts.grouping_variable,
        })
    }
}

/// Resolve requested names against the available sessions, keeping request
/// order and dropping duplicates. Returns the found sessions and the names
/// that matched nothing.
#[must_use]
pub fn select_sessions<'s>(
    all_sessions: &'s [GameSession],
    names: &[String],
) -> (Vec<&'s GameSession>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    let mut missing = Vec::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }
        match all_sessions
            .iter()
            .find(|session| &session.session_name == name)
        {
            Some(session) => selected.push(session),
            None => missing.push(name.clone()),
        }
    }
    (selected, missing)
}

/// Runs the pipeline with an injected catalog and recommender.
#[derive(Debug, Clone)]
pub struct Analyzer<'c> {
    catalog: &'c CardCatalog,
    recommender: TestRecommender,
}

impl<'c> Analyzer<'c> {
    #[must_use]
    pub const fn new(catalog: &'c CardCatalog, recommender: TestRecommender) -> Self {
        Self {
            catalog,
            recommender,
        }
    }

    #[must_use]
    pub fn run(&self, all_sessions: &[GameSession], request: &AnalysisRequest) -> AnalysisReport {
        let (selected, missing) = select_sessions(all_sessions, &request.sessions);
        for name in &missing {
            log::warn!("session '{name}' is not available and was skipped");
        }
        let variables = dedup_variables(&request.variables);
        log::info!(
            "analyzing {} session(s) across {} variable(s)",
            selected.len(),
            variables.len()
        );

        let counts = SelectionCounts::from_selection(
            &selected,
            variables.len(),
            request.grouping_variable,
            request.comparison_type,
        );
        let aggregator = PurchaseAggregator::new(self.catalog);

        AnalysisReport {
            selected_sessions: selected
                .iter()
                .map(|session| session.session_name.clone())
                .collect(),
            missing_sessions: missing,
            summary: summarize(&selected, &variables),
            values: value_table(&selected, &variables),
            groups: group_sessions(request.grouping_variable, &selected),
            tests: self.recommender.recommend(&counts),
            counts,
            hypotheses: request
                .hypotheses
                .iter()
                .filter(|text| !text.trim().is_empty())
                .map(|text| analyze_hypothesis(text))
                .collect(),
            question: request
                .research_question
                .as_deref()
                .filter(|text| !text.trim().is_empty())
                .map(analyze_question),
            card_frequency: aggregator.frequency(&selected, &request.cards, request.team_filter),
            dimension_rankings: aggregator.rank_by_dimension(&selected),
            methodology: request.methodology.clone(),
            selected_variables: variables,
        }
    }
}

/// Run the pipeline with the standard test catalog.
#[must_use]
pub fn run_analysis(
    all_sessions: &[GameSession],
    catalog: &CardCatalog,
    request: &AnalysisRequest,
) -> AnalysisReport {
    Analyzer::new(catalog, TestRecommender::default()).run(all_sessions, request)
}

fn dedup_variables(requested: &[VariableId]) -> Vec<VariableId> {
    let mut variables = Vec::with_capacity(requested.len());
    for id in requested {
        if !variables.contains(id) {
            variables.push(*id);
        }
    }
    variables
}
