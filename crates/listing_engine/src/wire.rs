//! JSON bodies exchanged with the backend.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend suggestion identifier; numbers and strings are both seen in the wild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionId {
    Number(u64),
    Text(String),
}

/// Product fields flattened next to the keyword context and prompt type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskSuggestionBody {
    #[serde(flatten)]
    pub product: Map<String, Value>,
    pub keywords: Vec<String>,
    pub prompt_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuggestionReply {
    pub answer: String,
    pub suggestion_id: SuggestionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitBody {
    pub product_id: String,
    pub prompt_type: String,
    pub new_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion_id: Option<SuggestionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitReply {
    pub new_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclineBody {
    pub suggestion_id: SuggestionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryBody {
    pub prompt_type: String,
    pub product_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    pub answer_text: String,
    #[serde(default)]
    pub keywords_str: Option<String>,
}
