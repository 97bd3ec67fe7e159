use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

use crate::lenient;
use crate::session::Domain;

const DEFAULT_CARD_DATA: &str = include_str!("../data/cards.json");

/// Static card reference data joined against strategy-log purchases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// `None` when the record carries no recognised domain; such cards are
    /// left out of domain rankings.
    #[serde(default, deserialize_with = "lenient::domain")]
    pub domain: Option<Domain>,
    #[serde(default, rename = "type")]
    pub card_type: String,
    #[serde(default, rename = "baseCostK", deserialize_with = "lenient::number")]
    pub base_cost_k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_mods: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expert_info: Option<Value>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("card catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("card catalog lists id '{0}' more than once")]
    DuplicateId(String),
    #[error("card catalog contains a card with an empty id")]
    EmptyId,
}

/// Read-only card catalog, loaded once and passed to the aggregators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardCatalog {
    cards: Vec<Card>,
}

impl CardCatalog {
    /// # Errors
    ///
    /// Returns an error if a card id is empty or repeated.
    pub fn new(cards: Vec<Card>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for card in &cards {
            if card.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !seen.insert(card.id.as_str()) {
                return Err(CatalogError::DuplicateId(card.id.clone()));
            }
        }
        Ok(Self { cards })
    }

    /// # Errors
    ///
    /// Returns an error if the JSON is not an array of cards or the ids are
    /// not unique.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let cards: Vec<Card> = serde_json::from_str(json)?;
        Self::new(cards)
    }

    /// The embedded catalog, empty if it fails to load.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_CARD_DATA).unwrap_or_else(|err| {
            log::error!("embedded card catalog is invalid: {err}");
            Self::default()
        })
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<CardCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// Display name for `id`, falling back to the id itself.
    #[must_use]
    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.find(id)
            .map(|card| card.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(id)
    }

    pub fn by_domain(&self, domain: Domain) -> impl Iterator<Item = &Card> {
        self.cards
            .iter()
            .filter(move |card| card.domain == Some(domain))
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_covers_every_domain() {
        let catalog = CardCatalog::default_catalog();
        assert!(!catalog.is_empty());
        for domain in Domain::ALL {
            assert!(
                catalog.by_domain(domain).count() >= 3,
                "{domain} should have cards"
            );
        }
        let card = catalog.find("J1").expect("J1 present");
        assert_eq!(card.domain, Some(Domain::Joint));
        assert!(card.base_cost_k.is_some());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"[{"id": "X1", "name": "A"}, {"id": "X1", "name": "B"}]"#;
        assert!(matches!(
            CardCatalog::from_json(json),
            Err(CatalogError::DuplicateId(id)) if id == "X1"
        ));
        assert!(matches!(
            CardCatalog::from_json(r#"[{"id": " "}]"#),
            Err(CatalogError::EmptyId)
        ));
        assert!(matches!(
            CardCatalog::from_json("{"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn unknown_domains_are_kept_without_domain() {
        let json = r#"[{"id": "Q1", "name": "Quantum", "domain": "quantum", "type": "asset", "baseCostK": "12"}]"#;
        let catalog = CardCatalog::from_json(json).unwrap();
        let card = catalog.find("Q1").unwrap();
        assert_eq!(card.domain, None);
        assert_eq!(card.base_cost_k, Some(12.0));
        assert_eq!(card.card_type, "asset");
    }

    #[test]
    fn name_falls_back_to_id() {
        let catalog = CardCatalog::from_json(r#"[{"id": "N1"}]"#).unwrap();
        assert_eq!(catalog.name_of("N1"), "N1");
        assert_eq!(catalog.name_of("ZZ9"), "ZZ9");
        assert_eq!(CardCatalog::default_catalog().name_of("J1"), "Rapid Reaction Force");
    }
}
