//! Variable suggestions from free text.

use crate::session::{Domain, Team};
use crate::variables::VariableId;

use super::markers::Markers;

/// Literal phrases that name a variable directly.
const KEYWORDS: &[(&str, VariableId)] = &[
    ("nato total", VariableId::NatoTotal),
    ("nato's total", VariableId::NatoTotal),
    ("russia total", VariableId::RussiaTotal),
    ("russia's total", VariableId::RussiaTotal),
    ("russian total", VariableId::RussiaTotal),
    ("turn count", VariableId::TurnCount),
    ("number of turns", VariableId::TurnCount),
    ("game length", VariableId::TurnCount),
    ("card count", VariableId::CardCount),
    ("cards purchased", VariableId::CardCount),
    ("number of cards", VariableId::CardCount),
];

fn push_unique(found: &mut Vec<VariableId>, id: VariableId) {
    if !found.contains(&id) {
        found.push(id);
    }
}

/// Variables suggested by `text`, deduplicated in order of discovery.
#[must_use]
pub fn recommend_variables(text: &str) -> Vec<VariableId> {
    recommend_from_markers(text, &Markers::detect(text))
}

pub(crate) fn recommend_from_markers(text: &str, markers: &Markers) -> Vec<VariableId> {
    let mut found = Vec::new();
    for id in domain_variables(&markers.teams, &markers.domains) {
        push_unique(&mut found, id);
    }
    if markers.overall {
        for team in &markers.teams {
            push_unique(&mut found, VariableId::team_total(*team));
        }
    }

    let lowered = text.to_lowercase();
    for (phrase, id) in KEYWORDS {
        if lowered.contains(phrase) {
            push_unique(&mut found, *id);
        }
    }

    if markers.domains.is_empty() {
        for team in &markers.teams {
            push_unique(&mut found, VariableId::team_total(*team));
        }
    }
    if found.is_empty() && markers.comparison {
        push_unique(&mut found, VariableId::team_total(Team::Nato));
        push_unique(&mut found, VariableId::team_total(Team::Russia));
    }
    log::debug!(
        "recommended {} variable(s) for {} domain mention(s)",
        found.len(),
        markers.domains.len()
    );
    found
}

/// Domain-score variables for `domains` across every mentioned team. A domain
/// named without a team yields nothing.
#[must_use]
pub fn domain_variables(teams: &[Team], domains: &[Domain]) -> Vec<VariableId> {
    teams
        .iter()
        .flat_map(|team| {
            domains
                .iter()
                .map(move |domain| VariableId::team_domain(*team, *domain))
        })
        .collect()
}
