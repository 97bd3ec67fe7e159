//! Catalog of numeric research variables and their extraction from sessions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::session::{Domain, GameSession, Team, Winner};

/// Identifier of a research variable. Ordering follows the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableId {
    NatoTotal,
    RussiaTotal,
    NatoJoint,
    NatoEconomy,
    NatoCognitive,
    NatoSpace,
    NatoCyber,
    RussiaJoint,
    RussiaEconomy,
    RussiaCognitive,
    RussiaSpace,
    RussiaCyber,
    TurnCount,
    CardCount,
}

/// What a variable measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    TeamTotal(Team),
    DomainScore(Team, Domain),
    TurnCount,
    CardCount,
}

impl VariableId {
    pub const ALL: [Self; 14] = [
        Self::NatoTotal,
        Self::RussiaTotal,
        Self::NatoJoint,
        Self::NatoEconomy,
        Self::NatoCognitive,
        Self::NatoSpace,
        Self::NatoCyber,
        Self::RussiaJoint,
        Self::RussiaEconomy,
        Self::RussiaCognitive,
        Self::RussiaSpace,
        Self::RussiaCyber,
        Self::TurnCount,
        Self::CardCount,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NatoTotal => "nato_total",
            Self::RussiaTotal => "russia_total",
            Self::NatoJoint => "nato_joint",
            Self::NatoEconomy => "nato_economy",
            Self::NatoCognitive => "nato_cognitive",
            Self::NatoSpace => "nato_space",
            Self::NatoCyber => "nato_cyber",
            Self::RussiaJoint => "russia_joint",
            Self::RussiaEconomy => "russia_economy",
            Self::RussiaCognitive => "russia_cognitive",
            Self::RussiaSpace => "russia_space",
            Self::RussiaCyber => "russia_cyber",
            Self::TurnCount => "turn_count",
            Self::CardCount => "card_count",
        }
    }

    #[must_use]
    pub const fn kind(self) -> VariableKind {
        match self {
            Self::NatoTotal => VariableKind::TeamTotal(Team::Nato),
            Self::RussiaTotal => VariableKind::TeamTotal(Team::Russia),
            Self::NatoJoint => VariableKind::DomainScore(Team::Nato, Domain::Joint),
            Self::NatoEconomy => VariableKind::DomainScore(Team::Nato, Domain::Economy),
            Self::NatoCognitive => VariableKind::DomainScore(Team::Nato, Domain::Cognitive),
            Self::NatoSpace => VariableKind::DomainScore(Team::Nato, Domain::Space),
            Self::NatoCyber => VariableKind::DomainScore(Team::Nato, Domain::Cyber),
            Self::RussiaJoint => VariableKind::DomainScore(Team::Russia, Domain::Joint),
            Self::RussiaEconomy => VariableKind::DomainScore(Team::Russia, Domain::Economy),
            Self::RussiaCognitive => VariableKind::DomainScore(Team::Russia, Domain::Cognitive),
            Self::RussiaSpace => VariableKind::DomainScore(Team::Russia, Domain::Space),
            Self::RussiaCyber => VariableKind::DomainScore(Team::Russia, Domain::Cyber),
            Self::TurnCount => VariableKind::TurnCount,
            Self::CardCount => VariableKind::CardCount,
        }
    }

    #[must_use]
    pub const fn team_total(team: Team) -> Self {
        match team {
            Team::Nato => Self::NatoTotal,
            Team::Russia => Self::RussiaTotal,
        }
    }

    #[must_use]
    pub const fn team_domain(team: Team, domain: Domain) -> Self {
        match (team, domain) {
            (Team::Nato, Domain::Joint) => Self::NatoJoint,
            (Team::Nato, Domain::Economy) => Self::NatoEconomy,
            (Team::Nato, Domain::Cognitive) => Self::NatoCognitive,
            (Team::Nato, Domain::Space) => Self::NatoSpace,
            (Team::Nato, Domain::Cyber) => Self::NatoCyber,
            (Team::Russia, Domain::Joint) => Self::RussiaJoint,
            (Team::Russia, Domain::Economy) => Self::RussiaEconomy,
            (Team::Russia, Domain::Cognitive) => Self::RussiaCognitive,
            (Team::Russia, Domain::Space) => Self::RussiaSpace,
            (Team::Russia, Domain::Cyber) => Self::RussiaCyber,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NatoTotal => "NATO Total Deterrence",
            Self::RussiaTotal => "Russia Total Deterrence",
            Self::NatoJoint => "NATO Joint Deterrence",
            Self::NatoEconomy => "NATO Economy Deterrence",
            Self::NatoCognitive => "NATO Cognitive Deterrence",
            Self::NatoSpace => "NATO Space Deterrence",
            Self::NatoCyber => "NATO Cyber Deterrence",
            Self::RussiaJoint => "Russia Joint Deterrence",
            Self::RussiaEconomy => "Russia Economy Deterrence",
            Self::RussiaCognitive => "Russia Cognitive Deterrence",
            Self::RussiaSpace => "Russia Space Deterrence",
            Self::RussiaCyber => "Russia Cyber Deterrence",
            Self::TurnCount => "Number of Turns",
            Self::CardCount => "Total Cards Purchased",
        }
    }

    #[must_use]
    pub const fn category(self) -> &'static str {
        match self.kind() {
            VariableKind::TeamTotal(_) => "Team Totals",
            VariableKind::DomainScore(Team::Nato, _) => "NATO Domains",
            VariableKind::DomainScore(Team::Russia, _) => "Russia Domains",
            VariableKind::TurnCount | VariableKind::CardCount => "Game Metrics",
        }
    }

    #[must_use]
    pub const fn descriptor(self) -> VariableDescriptor {
        VariableDescriptor {
            id: self,
            label: self.label(),
            category: self.category(),
        }
    }

    /// Numeric value of this variable for one session. Never fails; absent
    /// fields read as zero.
    #[must_use]
    pub fn extract(self, session: &GameSession) -> f64 {
        match self.kind() {
            VariableKind::TeamTotal(team) => session.team_total(team),
            VariableKind::DomainScore(team, domain) => session.domain_score(team, domain),
            VariableKind::TurnCount => session.turn(),
            VariableKind::CardCount => crate::numbers::count_to_f64(logged_actions(session)),
        }
    }
}

/// Strategy-log entries attributed to NATO plus those attributed to Russia.
///
/// Every logged action counts, purchase or not, even though `card_count` is
/// labelled as purchases.
fn logged_actions(session: &GameSession) -> usize {
    let log = session.strategy_log();
    let nato = log.iter().filter(|entry| entry.team() == Some(Team::Nato)).count();
    let russia = log
        .iter()
        .filter(|entry| entry.team() == Some(Team::Russia))
        .count();
    nato + russia
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variable '{0}'")]
pub struct ParseVariableError(pub String);

impl FromStr for VariableId {
    type Err = ParseVariableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseVariableError(s.to_string()))
    }
}

/// Catalog entry shown to researchers when picking variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariableDescriptor {
    pub id: VariableId,
    pub label: &'static str,
    pub category: &'static str,
}

impl VariableDescriptor {
    /// All fourteen variables in catalog order.
    #[must_use]
    pub fn catalog() -> Vec<Self> {
        VariableId::ALL.into_iter().map(VariableId::descriptor).collect()
    }
}

/// Shorthand for [`VariableId::extract`].
#[must_use]
pub fn extract(session: &GameSession, variable: VariableId) -> f64 {
    variable.extract(session)
}

/// Raw values for one session, as shown in the data table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionValues {
    #[serde(rename = "sessionName")]
    pub session_name: String,
    pub winner: Winner,
    pub values: BTreeMap<VariableId, f64>,
}

/// One row per session with every requested variable extracted.
#[must_use]
pub fn value_table(sessions: &[&GameSession], variables: &[VariableId]) -> Vec<SessionValues> {
    sessions
        .iter()
        .map(|session| SessionValues {
            session_name: session.session_name.clone(),
            winner: session.winner(),
            values: variables
                .iter()
                .map(|variable| (*variable, variable.extract(session)))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{LogEntry, TeamState};

    fn session_with_log(teams: &[&str]) -> GameSession {
        let mut session = GameSession::named("log");
        session.game_state.strategy_log = teams
            .iter()
            .map(|team| LogEntry {
                team: Some((*team).to_string()),
                action: Some("advanced turn".to_string()),
                ..LogEntry::default()
            })
            .collect();
        session
    }

    #[test]
    fn catalog_has_fourteen_unique_ids() {
        let catalog = VariableDescriptor::catalog();
        assert_eq!(catalog.len(), 14);
        for descriptor in &catalog {
            assert_eq!(descriptor.id.as_str().parse::<VariableId>(), Ok(descriptor.id));
        }
        assert_eq!(catalog[0].category, "Team Totals");
        assert_eq!(catalog[13].category, "Game Metrics");
    }

    #[test]
    fn serde_names_match_catalog_ids() {
        for id in VariableId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }

    #[test]
    fn team_domain_round_trips_kind() {
        for team in Team::ALL {
            for domain in Domain::ALL {
                let id = VariableId::team_domain(team, domain);
                assert_eq!(id.kind(), VariableKind::DomainScore(team, domain));
                assert_eq!(id.as_str(), format!("{}_{}", team.key(), domain.key()));
            }
        }
    }

    #[test]
    fn extraction_defaults_to_zero() {
        let session = GameSession::named("empty");
        for id in VariableId::ALL {
            assert!(id.extract(&session).abs() < f64::EPSILON, "{id} should default to 0");
        }
    }

    #[test]
    fn extraction_reads_nested_scores() {
        let mut session = GameSession::named("scores");
        session.game_state.turn = Some(7.0);
        session.game_state.teams.russia = Some(TeamState {
            total_deterrence: Some(31.0),
            deterrence: BTreeMap::from([("space".to_string(), 4.5)]),
            ..TeamState::default()
        });
        assert!((extract(&session, VariableId::TurnCount) - 7.0).abs() < f64::EPSILON);
        assert!((extract(&session, VariableId::RussiaTotal) - 31.0).abs() < f64::EPSILON);
        assert!((extract(&session, VariableId::RussiaSpace) - 4.5).abs() < f64::EPSILON);
        assert!(extract(&session, VariableId::NatoSpace).abs() < f64::EPSILON);
    }

    #[test]
    fn card_count_counts_every_team_entry() {
        let session = session_with_log(&["NATO", "Russia", "NATO", "Observer", "nato"]);
        assert!((extract(&session, VariableId::CardCount) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn value_table_keeps_session_order() {
        let a = GameSession::named("a");
        let b = session_with_log(&["NATO"]);
        let rows = value_table(&[&a, &b], &[VariableId::CardCount]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].session_name, "a");
        assert_eq!(rows[1].values.get(&VariableId::CardCount), Some(&1.0));
        assert_eq!(rows[0].winner, Winner::Tie);
    }
}
