//! Free-text analysis of research hypotheses and questions.
//!
//! Both analyzers share [`markers::Markers`] detection and differ in their
//! branch tables: hypotheses yield a pair of complementary test narratives,
//! research questions a single one. Branches are evaluated in order and the
//! first match wins.

pub mod hypothesis;
pub mod markers;
pub mod question;
pub mod variables;

use serde::Serialize;
use smallvec::SmallVec;

use crate::session::Team;
use markers::Markers;

pub use hypothesis::{HypothesisAnalysis, analyze_hypothesis, recommend_tests};
pub use question::{QuestionAnalysis, analyze_question, recommend_question_test};
pub use variables::recommend_variables;

/// A recommended test with generated explanatory text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestNarrative {
    pub name: String,
    pub justification: String,
    pub application: String,
}

impl TestNarrative {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        justification: impl Into<String>,
        application: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            justification: justification.into(),
            application: application.into(),
        }
    }
}

/// One or two narratives; hypotheses always produce two.
pub type Narratives = SmallVec<[TestNarrative; 2]>;

/// "a", "a and b", "a, b and c".
fn join_phrases(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => (*only).to_string(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}

/// Teams named in the text, or both sides when none or both are named.
fn team_phrase(markers: &Markers) -> String {
    match markers.teams.as_slice() {
        [team] => team.label().to_string(),
        _ => format!("{} and {}", Team::Nato.label(), Team::Russia.label()),
    }
}

fn domain_phrase(markers: &Markers) -> String {
    let keys: Vec<&str> = markers.domains.iter().map(|domain| domain.key()).collect();
    match keys.len() {
        0 => "the deterrence domains".to_string(),
        1 => format!("the {} domain", keys[0]),
        _ => format!("the {} domains", join_phrases(&keys)),
    }
}

fn variable_count_phrase(count: usize) -> String {
    match count {
        0 => "no specific variables".to_string(),
        1 => "one variable".to_string(),
        n => format!("{n} variables"),
    }
}
