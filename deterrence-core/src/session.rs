//! Recorded game sessions as exported by the session API.
//!
//! The analytics treat sessions as read-only snapshots. Only the fields the
//! research dashboard reads are typed; everything else the game engine writes
//! is carried through untouched in `extra` maps so a session can be handed on
//! to the report exporter without loss.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::lenient;

/// The two playable sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "NATO")]
    Nato,
    #[serde(rename = "Russia")]
    Russia,
}

impl Team {
    pub const ALL: [Self; 2] = [Self::Nato, Self::Russia];

    /// Label as written into session records and strategy logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nato => "NATO",
            Self::Russia => "Russia",
        }
    }

    /// Lowercase prefix used by variable ids (`nato_total`, `russia_cyber`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Nato => "nato",
            Self::Russia => "russia",
        }
    }

    /// Exact match against the record label; log entries with any other
    /// spelling are not attributed to a team.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|team| team.label() == label)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strategic domains used for both deterrence scoring and card classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Joint,
    Economy,
    Cognitive,
    Space,
    Cyber,
}

impl Domain {
    pub const ALL: [Self; 5] = [
        Self::Joint,
        Self::Economy,
        Self::Cognitive,
        Self::Space,
        Self::Cyber,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Joint => "joint",
            Self::Economy => "economy",
            Self::Cognitive => "cognitive",
            Self::Space => "space",
            Self::Cyber => "cyber",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Joint => "Joint",
            Self::Economy => "Economy",
            Self::Cognitive => "Cognitive",
            Self::Space => "Space",
            Self::Cyber => "Cyber",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown domain '{0}' (expected joint, economy, cognitive, space or cyber)")]
pub struct ParseDomainError(pub String);

impl FromStr for Domain {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|domain| domain.key().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseDomainError(s.to_string()))
    }
}

/// Outcome of a session judged by final team totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Winner {
    #[serde(rename = "NATO")]
    Nato,
    #[serde(rename = "Russia")]
    Russia,
    Tie,
}

impl Winner {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nato => "NATO",
            Self::Russia => "Russia",
            Self::Tie => "Tie",
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-team slice of the game state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    #[serde(
        rename = "totalDeterrence",
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_deterrence: Option<f64>,
    /// Domain key -> score. Non-numeric entries are dropped on load.
    #[serde(default, deserialize_with = "lenient::number_map")]
    pub deterrence: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TeamState {
    #[must_use]
    pub fn domain_score(&self, domain: Domain) -> Option<f64> {
        self.deterrence.get(domain.key()).copied()
    }
}

/// Both sides keyed the way the client writes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Teams {
    #[serde(
        rename = "NATO",
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub nato: Option<TeamState>,
    #[serde(
        rename = "Russia",
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub russia: Option<TeamState>,
}

impl Teams {
    #[must_use]
    pub const fn get(&self, team: Team) -> Option<&TeamState> {
        match team {
            Team::Nato => self.nato.as_ref(),
            Team::Russia => self.russia.as_ref(),
        }
    }
}

/// One free-text record in the strategy log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub turn: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub team: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl LogEntry {
    /// Team the entry is attributed to, if its label is an exact match.
    #[must_use]
    pub fn team(&self) -> Option<Team> {
        self.team.as_deref().and_then(Team::from_label)
    }

    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or_default()
    }
}

/// Subset of the engine's game state the analytics read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub turn: Option<f64>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub teams: Teams,
    #[serde(rename = "strategyLog", default, deserialize_with = "lenient::log_entries")]
    pub strategy_log: Vec<LogEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored playthrough, uniquely identified by `session_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    #[serde(rename = "sessionName")]
    pub session_name: String,
    #[serde(rename = "gameState", default, deserialize_with = "lenient::or_default")]
    pub game_state: GameState,
    #[serde(
        rename = "turnStatistics",
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub turn_statistics: Option<Vec<Value>>,
    #[serde(
        rename = "sessionInfo",
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_info: Option<SessionInfo>,
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl GameSession {
    /// Create an empty session (useful for tests and fixtures).
    #[must_use]
    pub fn named(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            game_state: GameState::default(),
            turn_statistics: None,
            session_info: None,
            created_at: None,
        }
    }

    /// Parse a single session record.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not an object carrying a `sessionName`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Final total deterrence for a team, 0 when absent.
    #[must_use]
    pub fn team_total(&self, team: Team) -> f64 {
        self.game_state
            .teams
            .get(team)
            .and_then(|state| state.total_deterrence)
            .unwrap_or(0.0)
    }

    /// Domain deterrence score for a team, 0 when absent.
    #[must_use]
    pub fn domain_score(&self, team: Team, domain: Domain) -> f64 {
        self.game_state
            .teams
            .get(team)
            .and_then(|state| state.domain_score(domain))
            .unwrap_or(0.0)
    }

    /// Current (or final) turn number, 0 when absent.
    #[must_use]
    pub fn turn(&self) -> f64 {
        self.game_state.turn.unwrap_or(0.0)
    }

    #[must_use]
    pub fn strategy_log(&self) -> &[LogEntry] {
        &self.game_state.strategy_log
    }

    /// Higher total deterrence wins; equal totals are a tie.
    #[must_use]
    pub fn winner(&self) -> Winner {
        let nato = self.team_total(Team::Nato);
        let russia = self.team_total(Team::Russia);
        match nato.total_cmp(&russia) {
            std::cmp::Ordering::Greater => Winner::Nato,
            std::cmp::Ordering::Less => Winner::Russia,
            std::cmp::Ordering::Equal => Winner::Tie,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "sessionName": "alpha",
        "createdAt": "2024-05-02T09:30:00Z",
        "gameState": {
            "turn": 6,
            "phase": "purchase",
            "teams": {
                "NATO": { "totalDeterrence": 42, "deterrence": { "joint": 10, "economy": 8.5 }, "budget": 120 },
                "Russia": { "totalDeterrence": "38", "deterrence": { "cyber": 12 } }
            },
            "strategyLog": [
                { "turn": 1, "team": "NATO", "action": "purchased Rapid Reaction Force (J1)", "timestamp": "2024-05-02T09:31:00Z" },
                { "turn": 1, "team": "Russia", "action": null }
            ]
        },
        "sessionInfo": { "participants": ["Ana", "Ben"] }
    }"#;

    #[test]
    fn parses_typed_fields_and_keeps_the_rest() {
        let session = GameSession::from_json(SAMPLE).unwrap();
        assert_eq!(session.session_name, "alpha");
        assert!((session.turn() - 6.0).abs() < f64::EPSILON);
        assert!((session.team_total(Team::Nato) - 42.0).abs() < f64::EPSILON);
        assert!((session.team_total(Team::Russia) - 38.0).abs() < f64::EPSILON);
        assert!((session.domain_score(Team::Nato, Domain::Economy) - 8.5).abs() < f64::EPSILON);
        assert!(session.domain_score(Team::Russia, Domain::Space).abs() < f64::EPSILON);
        assert_eq!(session.strategy_log().len(), 2);
        assert_eq!(session.strategy_log()[1].action(), "");
        assert_eq!(
            session.game_state.extra.get("phase"),
            Some(&Value::String("purchase".to_string()))
        );
        let nato = session.game_state.teams.get(Team::Nato).unwrap();
        assert_eq!(nato.extra.get("budget"), Some(&Value::from(120)));
    }

    #[test]
    fn missing_state_defaults_to_zero() {
        let session = GameSession::from_json(r#"{"sessionName":"bare"}"#).unwrap();
        assert!(session.turn().abs() < f64::EPSILON);
        assert!(session.team_total(Team::Nato).abs() < f64::EPSILON);
        assert!(session.strategy_log().is_empty());
        assert!(session.created_at.is_none());
    }

    #[test]
    fn malformed_structure_reads_as_empty() {
        let session =
            GameSession::from_json(r#"{"sessionName":"a","gameState":{"strategyLog":null}}"#)
                .unwrap();
        assert!(session.strategy_log().is_empty());

        let session =
            GameSession::from_json(r#"{"sessionName":"b","gameState":{"teams":null,"turn":3}}"#)
                .unwrap();
        assert!(session.team_total(Team::Nato).abs() < f64::EPSILON);
        assert!((session.turn() - 3.0).abs() < f64::EPSILON);

        let session = GameSession::from_json(
            r#"{"sessionName":"c","gameState":{"teams":{"NATO":5,"Russia":{"totalDeterrence":7}}}}"#,
        )
        .unwrap();
        assert!(session.game_state.teams.nato.is_none());
        assert!((session.team_total(Team::Russia) - 7.0).abs() < f64::EPSILON);

        let session = GameSession::from_json(r#"{"sessionName":"d","gameState":null}"#).unwrap();
        assert_eq!(session.game_state, GameState::default());

        let session = GameSession::from_json(
            r#"{"sessionName":"e","turnStatistics":{},"sessionInfo":"n/a","gameState":{"strategyLog":["NATO purchased X (J1)",{"team":"NATO","action":"purchased X (J1)"}]}}"#,
        )
        .unwrap();
        assert_eq!(session.strategy_log().len(), 1);
        assert_eq!(session.strategy_log()[0].team(), Some(Team::Nato));
        assert!(session.turn_statistics.is_none());
        assert!(session.session_info.is_none());
    }

    #[test]
    fn winner_compares_totals() {
        let mut session = GameSession::named("tie");
        session.game_state.teams.nato = Some(TeamState {
            total_deterrence: Some(10.0),
            ..TeamState::default()
        });
        session.game_state.teams.russia = Some(TeamState {
            total_deterrence: Some(10.0),
            ..TeamState::default()
        });
        assert_eq!(session.winner(), Winner::Tie);

        if let Some(russia) = session.game_state.teams.russia.as_mut() {
            russia.total_deterrence = Some(11.0);
        }
        assert_eq!(session.winner(), Winner::Russia);
        assert_eq!(GameSession::named("empty").winner(), Winner::Tie);
    }

    #[test]
    fn log_team_requires_exact_label() {
        let entry = LogEntry {
            team: Some("nato".to_string()),
            ..LogEntry::default()
        };
        assert_eq!(entry.team(), None);
        let entry = LogEntry {
            team: Some("Russia".to_string()),
            ..LogEntry::default()
        };
        assert_eq!(entry.team(), Some(Team::Russia));
    }

    #[test]
    fn domain_parses_case_insensitively() {
        assert_eq!("Cyber".parse::<Domain>(), Ok(Domain::Cyber));
        assert!("orbital".parse::<Domain>().is_err());
    }
}
