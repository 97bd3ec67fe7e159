//! Rule-based statistical test recommendations.
//!
//! Every test in the catalog is evaluated against the current selection
//! counts. Requirements are checked in a fixed order (groups or design, then
//! variables, then sessions) and the first unmet one becomes the reason text.

use serde::Serialize;

use crate::grouping::{ComparisonType, GroupingVariable, count_groups};
use crate::session::GameSession;

/// Sessions needed per variable before a regression is considered.
pub const REGRESSION_SESSIONS_PER_VARIABLE: usize = 5;

const ALL_MET: &str = "All requirements met";

/// The canonical tests the dashboard knows how to recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestKind {
    IndependentT,
    PairedT,
    OneWayAnova,
    RepeatedMeasuresAnova,
    Manova,
    TwoWayAnova,
    Correlation,
    MultipleRegression,
    ChiSquare,
    MannWhitneyU,
    KruskalWallis,
}

/// Static description of a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDefinition {
    pub kind: TestKind,
    pub name: &'static str,
    pub description: &'static str,
    pub requirements: &'static [&'static str],
}

/// Ordered set of tests a recommender evaluates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCatalog {
    tests: Vec<TestDefinition>,
}

impl TestCatalog {
    #[must_use]
    pub const fn new(tests: Vec<TestDefinition>) -> Self {
        Self { tests }
    }

    /// The eleven tests offered by the research dashboard, in display order.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            TestDefinition {
                kind: TestKind::IndependentT,
                name: "Independent Samples t-test",
                description: "Compares the means of one continuous variable between two independent groups.",
                requirements: &[
                    "Exactly 2 groups",
                    "1 dependent variable",
                    "At least 2 sessions",
                ],
            },
            TestDefinition {
                kind: TestKind::PairedT,
                name: "Paired Samples t-test",
                description: "Compares two related measurements taken on the same sessions.",
                requirements: &[
                    "Within-subjects comparison",
                    "1 dependent variable",
                    "At least 2 sessions",
                ],
            },
            TestDefinition {
                kind: TestKind::OneWayAnova,
                name: "One-Way ANOVA",
                description: "Compares the means of one continuous variable across three or more independent groups.",
                requirements: &[
                    "At least 3 groups",
                    "1 dependent variable",
                    "At least 3 sessions",
                ],
            },
            TestDefinition {
                kind: TestKind::RepeatedMeasuresAnova,
                name: "Repeated Measures ANOVA",
                description: "Compares three or more related measurements taken on the same sessions over time or conditions.",
                requirements: &[
                    "Within-subjects comparison",
                    "1 dependent variable",
                    "At least 3 sessions",
                ],
            },
            TestDefinition {
                kind: TestKind::Manova,
                name: "MANOVA",
                description: "Compares groups on several dependent variables at once while controlling the family-wise error rate.",
                requirements: &[
                    "At least 2 groups",
                    "2 or more dependent variables",
                    "At least 2 sessions",
                ],
            },
            TestDefinition {
                kind: TestKind::TwoWayAnova,
                name: "Two-Way ANOVA",
                description: "Examines the main effects and interaction of two independent grouping factors.",
                requirements: &[
                    "Two independent grouping factors",
                    "1 dependent variable",
                    "At least 4 sessions",
                ],
            },
            TestDefinition {
                kind: TestKind::Correlation,
                name: "Correlation (Pearson/Spearman)",
                description: "Measures the strength and direction of the association between two continuous variables.",
                requirements: &["Exactly 2 variables", "At least 3 sessions"],
            },
            TestDefinition {
                kind: TestKind::MultipleRegression,
                name: "Multiple Regression",
                description: "Predicts one outcome from several predictor variables and estimates each predictor's unique contribution.",
                requirements: &[
                    "2 or more variables",
                    "At least 5 sessions per variable",
                ],
            },
            TestDefinition {
                kind: TestKind::ChiSquare,
                name: "Chi-Square Test of Independence",
                description: "Tests whether two categorical variables, such as winner and grouping, are associated.",
                requirements: &["A grouping variable", "At least 5 sessions"],
            },
            TestDefinition {
                kind: TestKind::MannWhitneyU,
                name: "Mann-Whitney U Test",
                description: "Non-parametric alternative to the independent t-test that compares rank distributions of two groups.",
                requirements: &[
                    "Exactly 2 groups",
                    "1 dependent variable",
                    "At least 2 sessions",
                ],
            },
            TestDefinition {
                kind: TestKind::KruskalWallis,
                name: "Kruskal-Wallis H Test",
                description: "Non-parametric alternative to one-way ANOVA for three or more independent groups.",
                requirements: &[
                    "At least 3 groups",
                    "1 dependent variable",
                    "At least 3 sessions",
                ],
            },
        ])
    }

    #[must_use]
    pub fn tests(&self) -> &[TestDefinition] {
        &self.tests
    }
}

impl Default for TestCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Selection state the recommender evaluates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionCounts {
    pub num_sessions: usize,
    pub num_variables: usize,
    pub num_groups: usize,
    pub grouping_variable: GroupingVariable,
    pub comparison_type: ComparisonType,
}

impl SelectionCounts {
    /// Derive counts from the selected sessions, with groups per
    /// [`count_groups`].
    #[must_use]
    pub fn from_selection(
        sessions: &[&GameSession],
        num_variables: usize,
        grouping_variable: GroupingVariable,
        comparison_type: ComparisonType,
    ) -> Self {
        Self {
            num_sessions: sessions.len(),
            num_variables,
            num_groups: count_groups(grouping_variable, sessions),
            grouping_variable,
            comparison_type,
        }
    }
}

/// Evaluated test, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticalTest {
    pub name: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub appropriate: bool,
    pub reason: String,
}

/// Evaluates a [`TestCatalog`] against selection counts.
#[derive(Debug, Clone, Default)]
pub struct TestRecommender {
    catalog: TestCatalog,
}

impl TestRecommender {
    #[must_use]
    pub const fn new(catalog: TestCatalog) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub const fn catalog(&self) -> &TestCatalog {
        &self.catalog
    }

    /// Every catalog test with its verdict; appropriate tests first, catalog
    /// order otherwise.
    #[must_use]
    pub fn recommend(&self, counts: &SelectionCounts) -> Vec<StatisticalTest> {
        let mut evaluated: Vec<StatisticalTest> = self
            .catalog
            .tests()
            .iter()
            .map(|definition| {
                let verdict = evaluate(definition.kind, counts);
                StatisticalTest {
                    name: definition.name.to_string(),
                    description: definition.description.to_string(),
                    requirements: definition
                        .requirements
                        .iter()
                        .map(|requirement| (*requirement).to_string())
                        .collect(),
                    appropriate: verdict.is_ok(),
                    reason: verdict.err().unwrap_or_else(|| ALL_MET.to_string()),
                }
            })
            .collect();
        evaluated.sort_by_key(|test| !test.appropriate);
        evaluated
    }
}

/// Recommend from bare counts using the standard catalog.
#[must_use]
pub fn recommend(
    num_sessions: usize,
    num_variables: usize,
    num_groups: usize,
    grouping_variable: GroupingVariable,
    comparison_type: ComparisonType,
) -> Vec<StatisticalTest> {
    TestRecommender::default().recommend(&SelectionCounts {
        num_sessions,
        num_variables,
        num_groups,
        grouping_variable,
        comparison_type,
    })
}

fn require(condition: bool, reason: impl FnOnce() -> String) -> Result<(), String> {
    if condition { Ok(()) } else { Err(reason()) }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn exact_groups(counts: &SelectionCounts, expected: usize) -> Result<(), String> {
    require(counts.num_groups == expected, || {
        format!(
            "Requires exactly {expected} groups (currently {})",
            counts.num_groups
        )
    })
}

fn min_groups(counts: &SelectionCounts, min: usize) -> Result<(), String> {
    require(counts.num_groups >= min, || {
        format!(
            "Requires at least {min} groups (currently {})",
            counts.num_groups
        )
    })
}

fn exact_variables(counts: &SelectionCounts, expected: usize) -> Result<(), String> {
    require(counts.num_variables == expected, || {
        format!(
            "Requires exactly {} (currently {} selected)",
            plural(expected, "variable"),
            counts.num_variables
        )
    })
}

fn min_variables(counts: &SelectionCounts, min: usize) -> Result<(), String> {
    require(counts.num_variables >= min, || {
        format!(
            "Requires at least {min} variables (currently {} selected)",
            counts.num_variables
        )
    })
}

fn min_sessions(counts: &SelectionCounts, min: usize) -> Result<(), String> {
    require(counts.num_sessions >= min, || {
        format!(
            "Requires at least {min} sessions (currently {})",
            counts.num_sessions
        )
    })
}

fn within_design(counts: &SelectionCounts) -> Result<(), String> {
    require(counts.comparison_type == ComparisonType::Within, || {
        "Requires a within-subjects comparison (repeated measures on the same sessions)"
            .to_string()
    })
}

fn evaluate(kind: TestKind, counts: &SelectionCounts) -> Result<(), String> {
    match kind {
        TestKind::IndependentT | TestKind::MannWhitneyU => {
            exact_groups(counts, 2)?;
            exact_variables(counts, 1)?;
            min_sessions(counts, 2)
        }
        TestKind::PairedT => {
            within_design(counts)?;
            exact_variables(counts, 1)?;
            min_sessions(counts, 2)
        }
        TestKind::OneWayAnova | TestKind::KruskalWallis => {
            min_groups(counts, 3)?;
            exact_variables(counts, 1)?;
            min_sessions(counts, 3)
        }
        TestKind::RepeatedMeasuresAnova => {
            within_design(counts)?;
            exact_variables(counts, 1)?;
            min_sessions(counts, 3)
        }
        TestKind::Manova => {
            min_groups(counts, 2)?;
            min_variables(counts, 2)?;
            min_sessions(counts, 2)
        }
        TestKind::TwoWayAnova => Err(
            "Requires two independent grouping factors; only one grouping variable can be selected"
                .to_string(),
        ),
        TestKind::Correlation => {
            exact_variables(counts, 2)?;
            min_sessions(counts, 3)
        }
        TestKind::MultipleRegression => {
            min_variables(counts, 2)?;
            let required = counts.num_variables * REGRESSION_SESSIONS_PER_VARIABLE;
            require(counts.num_sessions >= required, || {
                format!(
                    "Requires at least {required} sessions ({REGRESSION_SESSIONS_PER_VARIABLE} per variable; currently {})",
                    counts.num_sessions
                )
            })
        }
        TestKind::ChiSquare => {
            require(counts.grouping_variable.is_selected(), || {
                "Requires a grouping variable to form categories".to_string()
            })?;
            min_sessions(counts, 5)
        }
    }
}
