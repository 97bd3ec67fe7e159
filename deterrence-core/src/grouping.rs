//! Grouping variables and comparison designs used to partition sessions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::session::{GameSession, Team};

/// Categorical axis sessions are partitioned by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingVariable {
    /// No grouping selected.
    #[default]
    #[serde(rename = "")]
    None,
    Team,
    Session,
    Winner,
}

impl GroupingVariable {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Team => "team",
            Self::Session => "session",
            Self::Winner => "winner",
        }
    }

    #[must_use]
    pub const fn is_selected(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for GroupingVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            other => f.write_str(other.key()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown grouping variable '{0}' (expected team, session, winner or none)")]
pub struct ParseGroupingError(pub String);

impl FromStr for GroupingVariable {
    type Err = ParseGroupingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "team" => Ok(Self::Team),
            "session" => Ok(Self::Session),
            "winner" => Ok(Self::Winner),
            _ => Err(ParseGroupingError(s.to_string())),
        }
    }
}

/// Whether groups are independent or repeated measurements of the same units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonType {
    #[default]
    Between,
    Within,
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Between => f.write_str("between"),
            Self::Within => f.write_str("within"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown comparison type '{0}' (expected between or within)")]
pub struct ParseComparisonError(pub String);

impl FromStr for ComparisonType {
    type Err = ParseComparisonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "between" => Ok(Self::Between),
            "within" => Ok(Self::Within),
            _ => Err(ParseComparisonError(s.to_string())),
        }
    }
}

/// Number of groups the selection forms under `grouping`.
///
/// Team grouping always yields the two sides, session grouping one group per
/// session, winner grouping the distinct winners (NATO, Russia, Tie) among the
/// selected sessions. No grouping yields zero groups.
#[must_use]
pub fn count_groups(grouping: GroupingVariable, sessions: &[&GameSession]) -> usize {
    match grouping {
        GroupingVariable::None => 0,
        GroupingVariable::Team => Team::ALL.len(),
        GroupingVariable::Session => sessions.len(),
        GroupingVariable::Winner => sessions
            .iter()
            .map(|session| session.winner())
            .collect::<BTreeSet<_>>()
            .len(),
    }
}

/// Partition of the selected session names by group label.
///
/// Team grouping places every session in both teams, since each session
/// contributes one observation per side.
#[must_use]
pub fn group_sessions(
    grouping: GroupingVariable,
    sessions: &[&GameSession],
) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for session in sessions {
        let name = session.session_name.clone();
        match grouping {
            GroupingVariable::None => {}
            GroupingVariable::Team => {
                for team in Team::ALL {
                    groups
                        .entry(team.label().to_string())
                        .or_default()
                        .push(name.clone());
                }
            }
            GroupingVariable::Session => {
                groups.entry(name.clone()).or_default().push(name);
            }
            GroupingVariable::Winner => {
                groups
                    .entry(session.winner().label().to_string())
                    .or_default()
                    .push(name);
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TeamState;

    fn session(name: &str, nato: f64, russia: f64) -> GameSession {
        let mut session = GameSession::named(name);
        session.game_state.teams.nato = Some(TeamState {
            total_deterrence: Some(nato),
            ..TeamState::default()
        });
        session.game_state.teams.russia = Some(TeamState {
            total_deterrence: Some(russia),
            ..TeamState::default()
        });
        session
    }

    #[test]
    fn team_grouping_is_always_two() {
        assert_eq!(count_groups(GroupingVariable::Team, &[]), 2);
        let a = session("a", 1.0, 2.0);
        assert_eq!(count_groups(GroupingVariable::Team, &[&a]), 2);
    }

    #[test]
    fn winner_grouping_counts_distinct_outcomes() {
        let nato = session("nato", 12.0, 4.0);
        let russia = session("russia", 3.0, 9.0);
        let tie = session("tie", 10.0, 10.0);
        let nato_again = session("nato-2", 8.0, 1.0);
        assert_eq!(count_groups(GroupingVariable::Winner, &[&nato, &nato_again]), 1);
        assert_eq!(count_groups(GroupingVariable::Winner, &[&nato, &tie]), 2);
        assert_eq!(
            count_groups(GroupingVariable::Winner, &[&nato, &russia, &tie, &nato_again]),
            3
        );
    }

    #[test]
    fn session_grouping_counts_sessions() {
        let a = session("a", 0.0, 0.0);
        let b = session("b", 0.0, 0.0);
        assert_eq!(count_groups(GroupingVariable::Session, &[&a, &b]), 2);
        assert_eq!(count_groups(GroupingVariable::None, &[&a, &b]), 0);
    }

    #[test]
    fn groups_by_winner_label() {
        let nato = session("nato", 12.0, 4.0);
        let tie = session("tie", 10.0, 10.0);
        let groups = group_sessions(GroupingVariable::Winner, &[&nato, &tie]);
        assert_eq!(groups["NATO"], vec!["nato".to_string()]);
        assert_eq!(groups["Tie"], vec!["tie".to_string()]);
    }

    #[test]
    fn grouping_parses_and_serializes() {
        assert_eq!("".parse::<GroupingVariable>(), Ok(GroupingVariable::None));
        assert_eq!("Winner".parse::<GroupingVariable>(), Ok(GroupingVariable::Winner));
        assert!("region".parse::<GroupingVariable>().is_err());
        assert_eq!(serde_json::to_string(&GroupingVariable::None).unwrap(), "\"\"");
        assert_eq!(serde_json::to_string(&GroupingVariable::Team).unwrap(), "\"team\"");
        assert_eq!("within".parse::<ComparisonType>(), Ok(ComparisonType::Within));
    }
}
