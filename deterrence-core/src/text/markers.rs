//! Linguistic marker detection shared by the hypothesis and question analyzers.

use regex::Regex;
use smallvec::SmallVec;
use std::sync::OnceLock;

use crate::session::{Domain, Team};

/// Compiled marker patterns. All patterns are case-insensitive.
#[derive(Debug)]
pub struct Patterns {
    nato: Regex,
    russia: Regex,
    domains: [(Domain, Regex); 5],
    overall: Regex,
    comparison: Regex,
    contrast: Regex,
    correlation: Regex,
    prediction: Regex,
    two_groups: Regex,
    multi_groups: Regex,
    time: Regex,
    strategy: Regex,
    relationship: Regex,
    domain_word: Regex,
    which: Regex,
    how: Regex,
    what: Regex,
    why: Regex,
    yes_no: Regex,
}

fn pattern(source: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){source}"))
}

impl Patterns {
    /// # Errors
    ///
    /// Returns an error if any marker pattern fails to compile.
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            nato: pattern(r"\bnato\b")?,
            russia: pattern(r"\brussia\b")?,
            domains: [
                (Domain::Joint, pattern(r"\b(joint|military|forces)\b")?),
                (Domain::Economy, pattern(r"\becon")?),
                (
                    Domain::Cognitive,
                    pattern(r"\b(cognitive|information|perception|narrative)")?,
                ),
                (Domain::Space, pattern(r"\b(space|satellite)")?),
                (Domain::Cyber, pattern(r"\b(cyber|digital|network)")?),
            ],
            overall: pattern(r"\b(overall|total)\b")?,
            comparison: pattern(
                r"(compar|versus|\bbetween\b|differ|relationship|correlat|impact|effect|influenc)",
            )?,
            contrast: pattern(
                r"(compar|versus|\bvs\b|differ|higher than|lower than|more than|less than|outperform)",
            )?,
            correlation: pattern(r"(correlat|relationship|associat|relate[sd]? to|covar)")?,
            prediction: pattern(r"(predict|determin|effect|impact|influenc|\bcaus)")?,
            two_groups: pattern(r"(nato.*russia|russia.*nato|two teams|both teams)")?,
            multi_groups: pattern(r"(across.*domain|all.*domain|multiple.*group)")?,
            time: pattern(
                r"(over time|across turns|turn by turn|each turn|per turn|longitudinal|trend|trajector|progress|evolv|early|later in|throughout)",
            )?,
            strategy: pattern(r"(strateg|\bcards?\b|purchas|tactic|approach|invest)")?,
            relationship: pattern(r"(relat|correlat|associat|connect|\blink)")?,
            domain_word: pattern(r"\bdomains?\b")?,
            which: pattern(r"\bwhich\b")?,
            how: pattern(r"\bhow\b")?,
            what: pattern(r"\bwhat\b")?,
            why: pattern(r"\bwhy\b")?,
            yes_no: pattern(r"^\s*(does|do|is|are|can|will)\b")?,
        })
    }

    /// Shared compiled instance, `None` if compilation failed.
    #[must_use]
    pub fn shared() -> Option<&'static Self> {
        static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
        PATTERNS
            .get_or_init(|| match Self::compile() {
                Ok(patterns) => Some(patterns),
                Err(err) => {
                    log::error!("marker patterns failed to compile: {err}");
                    None
                }
            })
            .as_ref()
    }
}

/// Question words present in a research question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interrogatives {
    pub which: bool,
    pub how: bool,
    pub what: bool,
    pub why: bool,
    /// Leading "does/do/is/are/can/will".
    pub yes_no: bool,
}

/// Everything detected in one piece of free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    pub teams: SmallVec<[Team; 2]>,
    pub domains: SmallVec<[Domain; 5]>,
    /// "overall" or "total".
    pub overall: bool,
    /// Broad comparison language, used to default variable choices.
    pub comparison: bool,
    /// Explicit contrast ("compare", "versus", "higher than"), excluding
    /// association wording such as "relationship between".
    pub contrast: bool,
    pub correlation: bool,
    pub prediction: bool,
    pub two_groups: bool,
    pub multi_groups: bool,
    pub time: bool,
    pub strategy: bool,
    pub relationship: bool,
    pub mentions_domain: bool,
    pub interrogatives: Interrogatives,
}

impl Markers {
    /// Detect every marker in `text`. Blank text, or a failed pattern
    /// compile, yields no markers.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        match Patterns::shared() {
            Some(patterns) if !text.trim().is_empty() => Self::detect_with(patterns, text),
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn detect_with(patterns: &Patterns, text: &str) -> Self {
        let mut teams = SmallVec::new();
        if patterns.nato.is_match(text) {
            teams.push(Team::Nato);
        }
        if patterns.russia.is_match(text) {
            teams.push(Team::Russia);
        }
        let domains: SmallVec<[Domain; 5]> = patterns
            .domains
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(domain, _)| *domain)
            .collect();
        Self {
            mentions_domain: !domains.is_empty() || patterns.domain_word.is_match(text),
            teams,
            domains,
            overall: patterns.overall.is_match(text),
            comparison: patterns.comparison.is_match(text),
            contrast: patterns.contrast.is_match(text),
            correlation: patterns.correlation.is_match(text),
            prediction: patterns.prediction.is_match(text),
            two_groups: patterns.two_groups.is_match(text),
            multi_groups: patterns.multi_groups.is_match(text),
            time: patterns.time.is_match(text),
            strategy: patterns.strategy.is_match(text),
            relationship: patterns.relationship.is_match(text),
            interrogatives: Interrogatives {
                which: patterns.which.is_match(text),
                how: patterns.how.is_match(text),
                what: patterns.what.is_match(text),
                why: patterns.why.is_match(text),
                yes_no: patterns.yes_no.is_match(text),
            },
        }
    }

    #[must_use]
    pub fn mentions(&self, team: Team) -> bool {
        self.teams.contains(&team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_compile() {
        assert!(Patterns::compile().is_ok());
        assert!(Patterns::shared().is_some());
    }

    #[test]
    fn detects_teams_on_word_boundaries() {
        let markers = Markers::detect("Does NATO outspend Russia?");
        assert_eq!(markers.teams.as_slice(), &[Team::Nato, Team::Russia]);
        let markers = Markers::detect("the senator spoke");
        assert!(markers.teams.is_empty());
    }

    #[test]
    fn detects_domains_by_synonym() {
        let markers = Markers::detect("Satellite and digital investments shape economic outcomes");
        assert_eq!(
            markers.domains.as_slice(),
            &[Domain::Economy, Domain::Space, Domain::Cyber]
        );
        assert!(markers.mentions_domain);
    }

    #[test]
    fn relationship_between_is_not_a_contrast() {
        let markers = Markers::detect("the relationship between cyber and space scores");
        assert!(markers.comparison);
        assert!(markers.correlation);
        assert!(!markers.contrast);
        let markers = Markers::detect("NATO scores higher than Russia");
        assert!(markers.contrast);
        assert!(markers.two_groups);
    }

    #[test]
    fn group_and_time_language() {
        let markers = Markers::detect("Scores rise across every domain over time");
        assert!(markers.multi_groups);
        assert!(markers.time);
        assert!(!markers.two_groups);
    }

    #[test]
    fn interrogatives() {
        let markers = Markers::detect("Are cyber purchases more common late in the game?");
        assert!(markers.interrogatives.yes_no);
        assert!(!markers.interrogatives.which);
        let markers = Markers::detect("Which strategy wins most often?");
        assert!(markers.interrogatives.which);
        assert!(markers.strategy);
    }

    #[test]
    fn blank_text_has_no_markers() {
        assert_eq!(Markers::detect("   "), Markers::default());
    }
}
