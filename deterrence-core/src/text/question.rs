//! Research-question classification into a single test narrative.

use serde::Serialize;

use crate::variables::VariableId;

use super::markers::Markers;
use super::variables::recommend_from_markers;
use super::{TestNarrative, domain_phrase, team_phrase};

struct QuestionBranch {
    name: &'static str,
    applies: fn(&Markers) -> bool,
    build: fn(&Markers) -> TestNarrative,
}

const QUESTION_BRANCHES: &[QuestionBranch] = &[
    QuestionBranch {
        name: "which-strategy",
        applies: |m| m.interrogatives.which && m.strategy,
        build: |m| {
            TestNarrative::new(
                "Chi-Square Test + Frequency Analysis",
                format!(
                    "The question asks which strategies {} favour. Strategy choices are categorical, so purchase frequencies cross-tabulated against the winner answer it directly.",
                    team_phrase(m)
                ),
                "Tabulate card purchases per team and outcome, rank the most frequent cards, and test the association between strategy and winner with a chi-square test.",
            )
        },
    },
    QuestionBranch {
        name: "how-relationship",
        applies: |m| (m.interrogatives.how || m.interrogatives.what) && m.relationship,
        build: |m| {
            TestNarrative::new(
                "Correlation Analysis (Pearson/Spearman)",
                format!(
                    "The question asks how measures in {} relate to one another. Correlation coefficients describe the strength and direction of each relationship.",
                    domain_phrase(m)
                ),
                "Compute Pearson's r for roughly normal measures and Spearman's rho otherwise, and present the results as a correlation matrix.",
            )
        },
    },
    QuestionBranch {
        name: "team-comparison",
        applies: |m| (m.interrogatives.yes_no || m.contrast) && m.two_groups,
        build: |m| {
            TestNarrative::new(
                "Independent Samples t-test (or Mann-Whitney U)",
                format!(
                    "The question compares {} on a shared outcome. A two-group comparison of means answers it, with a rank-based alternative for small samples.",
                    team_phrase(m)
                ),
                "Compare the two teams' scores across the selected sessions and report the mean difference, its p-value and an effect size.",
            )
        },
    },
    QuestionBranch {
        name: "domain",
        applies: |m| (m.interrogatives.which || m.interrogatives.what) && m.mentions_domain,
        build: |m| {
            TestNarrative::new(
                "One-Way ANOVA across Domains",
                format!(
                    "The question concerns differences between {}. A one-way ANOVA compares mean deterrence across the domains.",
                    domain_phrase(m)
                ),
                "Treat domain as the grouping factor, compare mean scores, and use post-hoc tests to identify which domains differ.",
            )
        },
    },
    QuestionBranch {
        name: "timing",
        applies: |m| m.time,
        build: |m| {
            TestNarrative::new(
                "Repeated Measures ANOVA / Time-Series Analysis",
                format!(
                    "The question asks about change over the course of a game for {}. Repeated observations of the same sessions call for a within-subjects analysis.",
                    team_phrase(m)
                ),
                "Use per-turn statistics as repeated measures and examine the trend across turns, correcting for sphericity where needed.",
            )
        },
    },
    QuestionBranch {
        name: "effect",
        applies: |m| {
            (m.interrogatives.why
                || m.interrogatives.how
                || m.interrogatives.what
                || m.interrogatives.yes_no)
                && m.prediction
        },
        build: |m| {
            TestNarrative::new(
                "Multiple Regression Analysis",
                format!(
                    "The question asks what drives outcomes in {}. Regression estimates the effect of each factor while controlling for the others.",
                    domain_phrase(m)
                ),
                "Select an outcome variable, enter candidate factors as predictors, and interpret the standardized coefficients.",
            )
        },
    },
];

fn exploratory() -> TestNarrative {
    TestNarrative::new(
        "Exploratory Data Analysis + Descriptive Statistics",
        "The question does not map onto a specific inferential design. Descriptive statistics and visual exploration help refine it into a testable form.",
        "Summarize the selected variables with means, medians and spreads, plot their distributions, and look for patterns that suggest a focused hypothesis.",
    )
}

/// Single test narrative for a research question, `None` for blank text.
#[must_use]
pub fn recommend_question_test(text: &str) -> Option<TestNarrative> {
    if text.trim().is_empty() {
        return None;
    }
    Some(classify(&Markers::detect(text)))
}

fn classify(markers: &Markers) -> TestNarrative {
    QUESTION_BRANCHES
        .iter()
        .find(|branch| (branch.applies)(markers))
        .map_or_else(exploratory, |branch| {
            log::debug!("research question matched {} branch", branch.name);
            (branch.build)(markers)
        })
}

/// The research-question panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionAnalysis {
    pub text: String,
    pub variables: Vec<VariableId>,
    pub test: Option<TestNarrative>,
}

#[must_use]
pub fn analyze_question(text: &str) -> QuestionAnalysis {
    let markers = Markers::detect(text);
    QuestionAnalysis {
        text: text.to_string(),
        variables: recommend_from_markers(text, &markers),
        test: (!text.trim().is_empty()).then(|| classify(&markers)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> String {
        recommend_question_test(text)
            .map(|narrative| narrative.name)
            .unwrap_or_default()
    }

    #[test]
    fn blank_question_yields_none() {
        assert!(recommend_question_test(" ").is_none());
        assert!(analyze_question("").test.is_none());
    }

    #[test]
    fn which_strategy() {
        assert_eq!(
            name("Which card strategies lead to victory?"),
            "Chi-Square Test + Frequency Analysis"
        );
    }

    #[test]
    fn how_relationship() {
        assert_eq!(
            name("How does cyber deterrence relate to space deterrence?"),
            "Correlation Analysis (Pearson/Spearman)"
        );
    }

    #[test]
    fn team_comparison() {
        assert_eq!(
            name("Does NATO score better than Russia?"),
            "Independent Samples t-test (or Mann-Whitney U)"
        );
    }

    #[test]
    fn domain_question() {
        let narrative = recommend_question_test("What domain matters most?").expect("narrative");
        assert_eq!(narrative.name, "One-Way ANOVA across Domains");
        assert!(narrative.justification.contains("the deterrence domains"));
    }

    #[test]
    fn timing_question() {
        assert_eq!(
            name("When do scores peak over time?"),
            "Repeated Measures ANOVA / Time-Series Analysis"
        );
    }

    #[test]
    fn effect_question() {
        assert_eq!(
            name("Why does economic pressure influence the outcome?"),
            "Multiple Regression Analysis"
        );
    }

    #[test]
    fn unmatched_question_falls_back() {
        assert_eq!(
            name("Tell me about the games"),
            "Exploratory Data Analysis + Descriptive Statistics"
        );
    }

    #[test]
    fn analysis_carries_variables() {
        let analysis = analyze_question("Does NATO cyber spending differ from Russia?");
        assert_eq!(
            analysis.variables,
            vec![VariableId::NatoCyber, VariableId::RussiaCyber]
        );
        assert!(analysis.test.is_some());
    }
}
