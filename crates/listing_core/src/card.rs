use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::keywords::KeywordSet;
use crate::workflow::FieldPhase;

/// Opaque identifier of a card; the product id as rendered by the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The editable attributes of a product, tagged the way the backend names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PromptType {
    Title,
    Description,
    SeoTitle,
    SeoDescription,
}

impl PromptType {
    pub const ALL: [PromptType; 4] = [
        PromptType::Title,
        PromptType::Description,
        PromptType::SeoTitle,
        PromptType::SeoDescription,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PromptType::Title => "title",
            PromptType::Description => "description",
            PromptType::SeoTitle => "seo_title",
            PromptType::SeoDescription => "seo_description",
        }
    }

    /// Key under which the product payload carries this field's current text.
    pub fn product_key(self) -> &'static str {
        match self {
            PromptType::Title => "name",
            PromptType::Description => "description",
            PromptType::SeoTitle => "metadata_title",
            PromptType::SeoDescription => "metadata_description",
        }
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptType {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PromptType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CardError::UnknownPromptType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("product attribute is not valid json: {0}")]
    InvalidJson(String),
    #[error("product attribute must be a json object")]
    NotAnObject,
    #[error("product has no usable id")]
    MissingId,
    #[error("unknown prompt type `{0}`")]
    UnknownPromptType(String),
}

/// Endpoint URLs a card talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub ask_suggestion: Url,
    pub submit: Url,
    pub submit_manual: Url,
    pub decline: Url,
    pub history: Url,
}

/// One editable attribute of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldState {
    /// Text currently on display. While a suggestion is pending this is the candidate.
    pub text: String,
    pub processed: bool,
    pub phase: FieldPhase,
}

impl FieldState {
    pub fn new(text: impl Into<String>, processed: bool) -> Self {
        Self {
            text: text.into(),
            processed,
            phase: FieldPhase::Idle,
        }
    }
}

/// One product being edited, with its fields, keywords and endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    id: CardId,
    name: String,
    product: Map<String, Value>,
    endpoints: Endpoints,
    pub(crate) fields: BTreeMap<PromptType, FieldState>,
    pub(crate) keywords: KeywordSet,
    pub(crate) inline_error: Option<String>,
    pub(crate) bulk_review: bool,
}

impl Card {
    /// Builds a card from the serialized product attribute rendered on the page.
    pub fn from_attributes(
        product_json: &str,
        endpoints: Endpoints,
        processed: &BTreeMap<PromptType, bool>,
    ) -> Result<Self, CardError> {
        let value: Value = serde_json::from_str(product_json)
            .map_err(|err| CardError::InvalidJson(err.to_string()))?;
        Self::from_product(value, endpoints, processed)
    }

    pub fn from_product(
        product: Value,
        endpoints: Endpoints,
        processed: &BTreeMap<PromptType, bool>,
    ) -> Result<Self, CardError> {
        let Value::Object(product) = product else {
            return Err(CardError::NotAnObject);
        };
        let id = match product.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(CardError::MissingId),
        };
        let name = text_of(&product, "name");
        let fields = PromptType::ALL
            .into_iter()
            .map(|kind| {
                let done = processed.get(&kind).copied().unwrap_or(false);
                (kind, FieldState::new(text_of(&product, kind.product_key()), done))
            })
            .collect();

        Ok(Self {
            id: CardId::new(id),
            name,
            product,
            endpoints,
            fields,
            keywords: KeywordSet::new(),
            inline_error: None,
            bulk_review: false,
        })
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in keywords {
            self.keywords.add(keyword.as_ref());
        }
        self
    }

    pub fn id(&self) -> &CardId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn product(&self) -> &Map<String, Value> {
        &self.product
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn field(&self, kind: PromptType) -> Option<&FieldState> {
        self.fields.get(&kind)
    }

    pub(crate) fn field_mut(&mut self, kind: PromptType) -> Option<&mut FieldState> {
        self.fields.get_mut(&kind)
    }

    pub fn fields(&self) -> impl Iterator<Item = (PromptType, &FieldState)> {
        self.fields.iter().map(|(kind, field)| (*kind, field))
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    pub fn bulk_review(&self) -> bool {
        self.bulk_review
    }

    /// Product payload sent with a suggestion request: the bound product data
    /// with each field's current committed text folded back in. Keys the
    /// request sets itself are left out.
    pub(crate) fn request_product(&self) -> Map<String, Value> {
        let mut product = self.product.clone();
        for key in RESERVED_REQUEST_KEYS {
            product.remove(key);
        }
        for (kind, field) in &self.fields {
            let committed = field.phase.committed_text(&field.text);
            product.insert(
                kind.product_key().to_string(),
                Value::String(committed.to_string()),
            );
        }
        product
    }
}

/// Top-level keys of the ask-suggestion body that are not product data.
const RESERVED_REQUEST_KEYS: [&str; 2] = ["keywords", "prompt_type"];

fn text_of(product: &Map<String, Value>, key: &str) -> String {
    match product.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Cards keyed by id, iterated in the order they were registered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardRegistry {
    order: Vec<CardId>,
    cards: BTreeMap<CardId, Card>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a card, replacing any previous card with the same id in place.
    pub fn insert(&mut self, card: Card) {
        let id = card.id().clone();
        if self.cards.insert(id.clone(), card).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn get_mut(&mut self, id: &CardId) -> Option<&mut Card> {
        self.cards.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.order.iter().filter_map(|id| self.cards.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn endpoints() -> Endpoints {
        let base = Url::parse("https://admin.example.com/salla/").unwrap();
        Endpoints {
            ask_suggestion: base.join("ask/").unwrap(),
            submit: base.join("submit/").unwrap(),
            submit_manual: base.join("submit-manual/").unwrap(),
            decline: base.join("decline/").unwrap(),
            history: base.join("history/").unwrap(),
        }
    }

    #[test]
    fn numeric_ids_and_missing_fields_are_accepted() {
        let card = Card::from_product(
            json!({"id": 991, "name": "Red Shoes", "metadata_title": null}),
            endpoints(),
            &BTreeMap::new(),
        )
        .unwrap();

        assert_eq!(card.id().as_str(), "991");
        assert_eq!(card.field(PromptType::Title).unwrap().text, "Red Shoes");
        assert_eq!(card.field(PromptType::SeoTitle).unwrap().text, "");
        assert_eq!(card.fields().count(), 4);
    }

    #[test]
    fn request_product_omits_keys_set_by_the_request() {
        let card = Card::from_product(
            json!({"id": 5, "name": "Lamp", "keywords": "legacy", "prompt_type": "old"}),
            endpoints(),
            &BTreeMap::new(),
        )
        .unwrap();

        let product = card.request_product();
        assert!(!product.contains_key("keywords"));
        assert!(!product.contains_key("prompt_type"));
        assert_eq!(product.get("id"), Some(&json!(5)));
        assert_eq!(product.get("name"), Some(&json!("Lamp")));
        // The stored product itself is untouched.
        assert_eq!(card.product().get("keywords"), Some(&json!("legacy")));
    }

    #[test]
    fn attributes_must_describe_an_object_with_an_id() {
        let processed = BTreeMap::new();
        assert!(matches!(
            Card::from_attributes("{not json", endpoints(), &processed),
            Err(CardError::InvalidJson(_))
        ));
        assert_eq!(
            Card::from_attributes("[1, 2]", endpoints(), &processed),
            Err(CardError::NotAnObject)
        );
        assert_eq!(
            Card::from_attributes(r#"{"name": "x", "id": "  "}"#, endpoints(), &processed),
            Err(CardError::MissingId)
        );
    }

    #[test]
    fn processed_flags_are_applied_per_field() {
        let processed = BTreeMap::from([(PromptType::Description, true)]);
        let card =
            Card::from_attributes(r#"{"id": "p-1", "name": "Lamp"}"#, endpoints(), &processed)
                .unwrap();
        assert!(card.field(PromptType::Description).unwrap().processed);
        assert!(!card.field(PromptType::Title).unwrap().processed);
    }

    #[test]
    fn prompt_types_parse_from_wire_names() {
        assert_eq!("seo_title".parse::<PromptType>(), Ok(PromptType::SeoTitle));
        assert!("summary".parse::<PromptType>().is_err());
    }

    #[test]
    fn registry_keeps_insertion_order_and_replaces_in_place() {
        let mut registry = CardRegistry::new();
        for id in ["b", "a", "c"] {
            let card = Card::from_product(json!({"id": id}), endpoints(), &BTreeMap::new())
                .unwrap();
            registry.insert(card);
        }
        let replacement =
            Card::from_product(json!({"id": "a", "name": "A2"}), endpoints(), &BTreeMap::new())
                .unwrap();
        registry.insert(replacement);

        let ids: Vec<_> = registry.iter().map(|card| card.id().as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(registry.get(&CardId::new("a")).unwrap().name(), "A2");
    }
}
