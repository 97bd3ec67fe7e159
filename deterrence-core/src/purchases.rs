//! Card purchase mining from strategy logs.
//!
//! Two views are offered and they use different denominators:
//! [`PurchaseAggregator::frequency`] reports the share of selected *sessions*
//! a card appears in, while [`PurchaseAggregator::rank_by_dimension`] reports
//! shares of raw *purchase counts* within a domain and overall.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

use crate::catalog::CardCatalog;
use crate::numbers::percentage;
use crate::session::{Domain, GameSession, LogEntry, Team};

fn purchase_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"purchased\s+(?P<name>.+?)\s*\((?P<id>[^()\s]+)\)")
                .map_err(|err| log::error!("purchase pattern failed to compile: {err}"))
                .ok()
        })
        .as_ref()
}

/// A purchase recognised in a strategy-log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase<'a> {
    pub team: Option<Team>,
    pub turn: Option<f64>,
    pub card_id: &'a str,
    /// Card name as written in the log.
    pub logged_name: &'a str,
}

impl<'a> Purchase<'a> {
    /// Parse `entry`, `None` unless its action reads
    /// `purchased <name> (<CARD_ID>)`.
    #[must_use]
    pub fn parse(entry: &'a LogEntry) -> Option<Self> {
        let captures = purchase_pattern()?.captures(entry.action())?;
        Some(Self {
            team: entry.team(),
            turn: entry.turn,
            card_id: captures.name("id")?.as_str(),
            logged_name: captures.name("name")?.as_str(),
        })
    }
}

/// Every purchase in a session's strategy log, in log order.
pub fn purchases(session: &GameSession) -> impl Iterator<Item = Purchase<'_>> {
    session.strategy_log().iter().filter_map(Purchase::parse)
}

/// Which side's counters the frequency view displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamFilter {
    #[default]
    #[serde(rename = "both")]
    Both,
    #[serde(rename = "NATO")]
    Nato,
    #[serde(rename = "Russia")]
    Russia,
}

impl TeamFilter {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Both => "both",
            Self::Nato => "NATO",
            Self::Russia => "Russia",
        }
    }
}

impl fmt::Display for TeamFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown team filter '{0}' (expected both, NATO or Russia)")]
pub struct ParseTeamFilterError(pub String);

impl FromStr for TeamFilter {
    type Err = ParseTeamFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" | "all" => Ok(Self::Both),
            "nato" => Ok(Self::Nato),
            "russia" => Ok(Self::Russia),
            _ => Err(ParseTeamFilterError(s.to_string())),
        }
    }
}

/// One row of the card frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFrequency {
    pub card_id: String,
    pub card_name: String,
    pub nato_count: usize,
    pub russia_count: usize,
    pub total_count: usize,
    pub display_count: usize,
    /// Share of selected sessions the card appears in, one decimal.
    pub percentage: String,
    pub sessions_appeared: usize,
}

/// A card's standing within one domain for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRanking {
    pub card_id: String,
    pub card_name: String,
    pub count: usize,
    /// Share of the team's purchases in this domain.
    pub domain_percentage: String,
    /// Share of all the team's catalogued purchases.
    pub overall_percentage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamRankings {
    pub nato: Vec<CardRanking>,
    pub russia: Vec<CardRanking>,
}

impl TeamRankings {
    #[must_use]
    pub fn for_team(&self, team: Team) -> &[CardRanking] {
        match team {
            Team::Nato => &self.nato,
            Team::Russia => &self.russia,
        }
    }

    fn for_team_mut(&mut self, team: Team) -> &mut Vec<CardRanking> {
        match team {
            Team::Nato => &mut self.nato,
            Team::Russia => &mut self.russia,
        }
    }
}

pub type DimensionRankings = BTreeMap<Domain, TeamRankings>;

#[derive(Default)]
struct Tally<'s> {
    nato: usize,
    russia: usize,
    total: usize,
    sessions: HashSet<&'s str>,
    nato_sessions: HashSet<&'s str>,
    russia_sessions: HashSet<&'s str>,
}

impl Tally<'_> {
    fn display(&self, filter: TeamFilter) -> (usize, usize) {
        match filter {
            TeamFilter::Both => (self.total, self.sessions.len()),
            TeamFilter::Nato => (self.nato, self.nato_sessions.len()),
            TeamFilter::Russia => (self.russia, self.russia_sessions.len()),
        }
    }
}

/// Aggregates purchases against an injected card catalog.
#[derive(Debug, Clone, Copy)]
pub struct PurchaseAggregator<'c> {
    catalog: &'c CardCatalog,
}

impl<'c> PurchaseAggregator<'c> {
    #[must_use]
    pub const fn new(catalog: &'c CardCatalog) -> Self {
        Self { catalog }
    }

    /// Purchase counts for the selected cards, most displayed first.
    ///
    /// Every selected card gets a row, even with no purchases. Purchases by
    /// an unrecognised team still count toward the total. Unknown card ids
    /// are shown under their id.
    #[must_use]
    pub fn frequency(
        &self,
        sessions: &[&GameSession],
        card_ids: &[String],
        team_filter: TeamFilter,
    ) -> Vec<CardFrequency> {
        let mut tallies: HashMap<&str, Tally<'_>> = card_ids
            .iter()
            .map(|id| (id.as_str(), Tally::default()))
            .collect();

        for session in sessions {
            let name = session.session_name.as_str();
            for purchase in purchases(session) {
                let Some(tally) = tallies.get_mut(purchase.card_id) else {
                    continue;
                };
                tally.total += 1;
                tally.sessions.insert(name);
                match purchase.team {
                    Some(Team::Nato) => {
                        tally.nato += 1;
                        tally.nato_sessions.insert(name);
                    }
                    Some(Team::Russia) => {
                        tally.russia += 1;
                        tally.russia_sessions.insert(name);
                    }
                    None => {}
                }
            }
        }

        let mut seen = HashSet::new();
        let mut rows: Vec<CardFrequency> = card_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| {
                let tally = tallies.get(id.as_str())?;
                let (display_count, sessions_appeared) = tally.display(team_filter);
                Some(CardFrequency {
                    card_id: id.clone(),
                    card_name: self.catalog.name_of(id).to_string(),
                    nato_count: tally.nato,
                    russia_count: tally.russia,
                    total_count: tally.total,
                    display_count,
                    percentage: percentage(sessions_appeared, sessions.len()),
                    sessions_appeared,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.display_count.cmp(&a.display_count));
        rows
    }

    /// Per-domain, per-team card rankings over every catalogued purchase.
    ///
    /// Every domain is present. Purchases of unknown cards, cards without a
    /// domain, or by an unrecognised team are left out of both rankings and
    /// denominators.
    #[must_use]
    pub fn rank_by_dimension(&self, sessions: &[&GameSession]) -> DimensionRankings {
        let mut counts: BTreeMap<(Team, Domain, &str), usize> = BTreeMap::new();
        let mut domain_totals: HashMap<(Team, Domain), usize> = HashMap::new();
        let mut team_totals: HashMap<Team, usize> = HashMap::new();

        for session in sessions {
            for purchase in purchases(session) {
                let Some(team) = purchase.team else {
                    continue;
                };
                let Some(card) = self.catalog.find(purchase.card_id) else {
                    log::debug!("card {} is not in the catalog", purchase.card_id);
                    continue;
                };
                let Some(domain) = card.domain else {
                    continue;
                };
                *counts.entry((team, domain, card.id.as_str())).or_default() += 1;
                *domain_totals.entry((team, domain)).or_default() += 1;
                *team_totals.entry(team).or_default() += 1;
            }
        }

        let mut rankings: DimensionRankings = Domain::ALL
            .into_iter()
            .map(|domain| (domain, TeamRankings::default()))
            .collect();
        for ((team, domain, card_id), count) in counts {
            let domain_total = domain_totals.get(&(team, domain)).copied().unwrap_or(0);
            let team_total = team_totals.get(&team).copied().unwrap_or(0);
            rankings
                .entry(domain)
                .or_default()
                .for_team_mut(team)
                .push(CardRanking {
                    card_id: card_id.to_string(),
                    card_name: self.catalog.name_of(card_id).to_string(),
                    count,
                    domain_percentage: percentage(count, domain_total),
                    overall_percentage: percentage(count, team_total),
                });
        }
        for team_rankings in rankings.values_mut() {
            for team in Team::ALL {
                team_rankings
                    .for_team_mut(team)
                    .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.card_id.cmp(&b.card_id)));
            }
        }
        rankings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(team: &str, action: &str) -> LogEntry {
        LogEntry {
            turn: Some(1.0),
            team: Some(team.to_string()),
            action: Some(action.to_string()),
            ..LogEntry::default()
        }
    }

    fn session(name: &str, log: Vec<LogEntry>) -> GameSession {
        let mut session = GameSession::named(name);
        session.game_state.strategy_log = log;
        session
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_string()).collect()
    }

    #[test]
    fn parses_purchase_actions() {
        let log = entry("NATO", "NATO purchased Rapid Reaction Force (J1) for 60K");
        let purchase = Purchase::parse(&log).expect("purchase");
        assert_eq!(purchase.card_id, "J1");
        assert_eq!(purchase.logged_name, "Rapid Reaction Force");
        assert_eq!(purchase.team, Some(Team::Nato));
        assert!(Purchase::parse(&entry("NATO", "advanced to turn 2")).is_none());
        assert!(Purchase::parse(&entry("NATO", "purchased nothing")).is_none());
    }

    #[test]
    fn frequency_uses_session_share() {
        let a = session("A", vec![entry("NATO", "purchased Rapid Reaction Force (J1)")]);
        let b = session("B", vec![entry("Russia", "ended turn")]);
        let catalog = CardCatalog::default_catalog();
        let rows = PurchaseAggregator::new(catalog).frequency(&[&a, &b], &ids(&["J1"]), TeamFilter::Both);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sessions_appeared, 1);
        assert_eq!(rows[0].percentage, "50.0");
        assert_eq!(rows[0].card_name, "Rapid Reaction Force");
    }

    #[test]
    fn frequency_filters_by_team() {
        let a = session(
            "A",
            vec![
                entry("NATO", "purchased Cyber Defence Team (CY1)"),
                entry("NATO", "purchased Cyber Defence Team (CY1)"),
                entry("Russia", "purchased Cyber Defence Team (CY1)"),
                entry("Observer", "purchased Cyber Defence Team (CY1)"),
                entry("Russia", "purchased Targeted Sanctions (E1)"),
            ],
        );
        let b = session("B", vec![entry("Russia", "purchased Targeted Sanctions (E1)")]);
        let aggregator = PurchaseAggregator::new(CardCatalog::default_catalog());
        let selected = ids(&["CY1", "E1", "S1"]);

        let both = aggregator.frequency(&[&a, &b], &selected, TeamFilter::Both);
        assert_eq!(both[0].card_id, "CY1");
        assert_eq!((both[0].nato_count, both[0].russia_count, both[0].total_count), (2, 1, 4));
        assert_eq!(both[1].card_id, "E1");
        assert_eq!(both[1].percentage, "100.0");
        assert_eq!(both[2].card_id, "S1");
        assert_eq!(both[2].display_count, 0);
        assert_eq!(both[2].percentage, "0.0");

        let russia = aggregator.frequency(&[&a, &b], &selected, TeamFilter::Russia);
        assert_eq!(russia[0].card_id, "E1");
        assert_eq!(russia[0].display_count, 2);
        assert_eq!(russia[1].display_count, 1);
        assert_eq!(russia[1].sessions_appeared, 1);
    }

    #[test]
    fn frequency_handles_unknown_cards_and_no_sessions() {
        let a = session("A", vec![entry("NATO", "purchased Prototype (X9)")]);
        let aggregator = PurchaseAggregator::new(CardCatalog::default_catalog());
        let rows = aggregator.frequency(&[&a], &ids(&["X9"]), TeamFilter::Both);
        assert_eq!(rows[0].card_name, "X9");
        assert_eq!(rows[0].total_count, 1);

        let rows = aggregator.frequency(&[], &ids(&["X9"]), TeamFilter::Both);
        assert_eq!(rows[0].percentage, "0.0");
        assert!(aggregator.frequency(&[&a], &[], TeamFilter::Both).is_empty());
    }

    #[test]
    fn sole_domain_purchase_ranks_at_full_share() {
        let a = session(
            "A",
            vec![
                entry("NATO", "purchased Rapid Reaction Force (J1)"),
                entry("NATO", "purchased Rapid Reaction Force (J1)"),
                entry("NATO", "purchased Rapid Reaction Force (J1)"),
                entry("NATO", "purchased Cyber Defence Team (CY1)"),
                entry("Russia", "purchased Cyber Defence Team (CY1)"),
                entry("Russia", "purchased Prototype (X9)"),
            ],
        );
        let rankings = PurchaseAggregator::new(CardCatalog::default_catalog()).rank_by_dimension(&[&a]);
        assert_eq!(rankings.len(), 5);

        let joint = &rankings[&Domain::Joint];
        assert_eq!(joint.nato.len(), 1);
        assert_eq!(joint.nato[0].count, 3);
        assert_eq!(joint.nato[0].domain_percentage, "100.0");
        assert_eq!(joint.nato[0].overall_percentage, "75.0");
        assert!(joint.russia.is_empty());

        let cyber = &rankings[&Domain::Cyber];
        assert_eq!(cyber.for_team(Team::Russia)[0].overall_percentage, "100.0");
        assert!(rankings[&Domain::Space].nato.is_empty());
    }

    #[test]
    fn domainless_cards_are_left_out_of_rankings() {
        let catalog = CardCatalog::from_json(
            r#"[
                {"id": "C1", "name": "Public Diplomacy", "domain": "cognitive"},
                {"id": "U1", "name": "Liaison Office", "domain": null},
                {"id": "U2", "name": "Exercise Observer", "domain": "logistics"}
            ]"#,
        )
        .unwrap();
        assert!(catalog.find("U1").is_some_and(|card| card.domain.is_none()));
        assert!(catalog.find("U2").is_some_and(|card| card.domain.is_none()));

        let a = session(
            "A",
            vec![
                entry("NATO", "purchased Public Diplomacy (C1)"),
                entry("NATO", "purchased Liaison Office (U1)"),
                entry("NATO", "purchased Liaison Office (U1)"),
                entry("NATO", "purchased Exercise Observer (U2)"),
            ],
        );
        let aggregator = PurchaseAggregator::new(&catalog);
        let rankings = aggregator.rank_by_dimension(&[&a]);
        for (domain, teams) in &rankings {
            for team in Team::ALL {
                assert!(
                    teams
                        .for_team(team)
                        .iter()
                        .all(|ranking| ranking.card_id == "C1"),
                    "{domain} / {team} lists a domainless card"
                );
            }
        }
        let cognitive = &rankings[&Domain::Cognitive].nato;
        assert_eq!(cognitive.len(), 1);
        assert_eq!(cognitive[0].domain_percentage, "100.0");
        assert_eq!(cognitive[0].overall_percentage, "100.0");

        let rows = aggregator.frequency(&[&a], &ids(&["U1"]), TeamFilter::Both);
        assert_eq!(rows[0].total_count, 2);
        assert_eq!(rows[0].card_name, "Liaison Office");
    }

    #[test]
    fn rankings_sort_by_count_then_id() {
        let a = session(
            "A",
            vec![
                entry("NATO", "purchased Trade Agreement (E3)"),
                entry("NATO", "purchased Targeted Sanctions (E1)"),
                entry("NATO", "purchased Strategic Reserve (E4)"),
                entry("NATO", "purchased Strategic Reserve (E4)"),
            ],
        );
        let rankings = PurchaseAggregator::new(CardCatalog::default_catalog()).rank_by_dimension(&[&a]);
        let order: Vec<&str> = rankings[&Domain::Economy]
            .nato
            .iter()
            .map(|ranking| ranking.card_id.as_str())
            .collect();
        assert_eq!(order, vec!["E4", "E1", "E3"]);
        assert_eq!(rankings[&Domain::Economy].nato[0].domain_percentage, "50.0");
    }

    #[test]
    fn team_filter_parses() {
        assert_eq!("nato".parse::<TeamFilter>(), Ok(TeamFilter::Nato));
        assert_eq!("Both".parse::<TeamFilter>(), Ok(TeamFilter::Both));
        assert!("blue".parse::<TeamFilter>().is_err());
        assert_eq!(serde_json::to_string(&TeamFilter::Nato).unwrap(), "\"NATO\"");
    }
}
