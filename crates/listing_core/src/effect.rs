use serde_json::{Map, Value};
use url::Url;

use crate::{CardId, PromptType, RequestId, SuggestionId};

/// What triggered a submit call; decides how its completion is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOrigin {
    Suggestion,
    Manual,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPayload {
    pub product_id: String,
    pub prompt_type: PromptType,
    pub new_value: String,
    pub suggestion_id: Option<SuggestionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    AskSuggestion {
        request: RequestId,
        card: CardId,
        field: PromptType,
        url: Url,
        product: Map<String, Value>,
        keywords: Vec<String>,
    },
    Submit {
        request: RequestId,
        card: CardId,
        field: PromptType,
        origin: SubmitOrigin,
        url: Url,
        payload: SubmitPayload,
    },
    Decline {
        request: RequestId,
        url: Url,
        suggestion_id: SuggestionId,
    },
    FetchHistory {
        request: RequestId,
        url: Url,
        product_id: String,
        prompt_type: PromptType,
    },
    /// Every field started by a batch has reported back.
    BatchFinished { card: CardId, fields: usize },
}
