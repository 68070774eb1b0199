//! Page snapshot loading: the cards the server rendered, with their controls
//! laid out in a [`PageTree`].
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use listing_core::{Card, CardError, CardId, Endpoints, NodeId, PageTree, PromptType};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse page snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("card #{index}: {source}")]
    Card { index: usize, source: CardError },
}

#[derive(Debug, Deserialize)]
struct CardSnapshot {
    product: Value,
    #[serde(default)]
    processed: BTreeMap<String, bool>,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Rendered page: the cards plus the node each control hangs on.
#[derive(Debug)]
pub struct Page {
    pub cards: Vec<Card>,
    pub tree: PageTree,
    card_nodes: HashMap<CardId, NodeId>,
    field_controls: HashMap<(CardId, PromptType), NodeId>,
}

impl Page {
    pub fn load(path: &Path, endpoints: &Endpoints) -> Result<Self, PageError> {
        let content = fs::read_to_string(path).map_err(|source| PageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, endpoints)
    }

    pub fn parse(content: &str, endpoints: &Endpoints) -> Result<Self, PageError> {
        let snapshots: Vec<CardSnapshot> = serde_json::from_str(content)?;
        let mut cards = Vec::with_capacity(snapshots.len());
        for (index, snapshot) in snapshots.into_iter().enumerate() {
            let mut processed = BTreeMap::new();
            for (name, done) in snapshot.processed {
                let kind = name
                    .parse::<PromptType>()
                    .map_err(|source| PageError::Card { index, source })?;
                processed.insert(kind, done);
            }
            let card = Card::from_product(snapshot.product, endpoints.clone(), &processed)
                .map_err(|source| PageError::Card { index, source })?
                .with_keywords(&snapshot.keywords);
            cards.push(card);
        }
        Ok(Self::build(cards))
    }

    fn build(cards: Vec<Card>) -> Self {
        let mut tree = PageTree::new();
        let mut card_nodes = HashMap::new();
        let mut field_controls = HashMap::new();
        let grid = tree.add_child(tree.root());

        for card in &cards {
            let Some(card_node) = grid.and_then(|grid| tree.add_card(grid, card.id().clone()))
            else {
                continue;
            };
            let body = tree.add_child(card_node);
            for (kind, _) in card.fields() {
                let control = body
                    .and_then(|body| tree.add_field(body, kind))
                    .and_then(|group| tree.add_child(group));
                if let Some(control) = control {
                    field_controls.insert((card.id().clone(), kind), control);
                }
            }
            card_nodes.insert(card.id().clone(), card_node);
        }

        Self {
            cards,
            tree,
            card_nodes,
            field_controls,
        }
    }

    /// Node of the control group for one field of a card.
    pub fn field_control(&self, card: &str, field: PromptType) -> Option<NodeId> {
        self.field_controls
            .get(&(CardId::new(card), field))
            .copied()
    }

    /// Node of the card boundary itself, used for card-wide controls.
    pub fn card_control(&self, card: &str) -> Option<NodeId> {
        self.card_nodes.get(&CardId::new(card)).copied()
    }
}
