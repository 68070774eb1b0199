use crate::{CardId, PromptType, RequestId};

/// A previously generated value for a field, offered for reuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub answer_text: String,
    pub keywords: Option<String>,
}

/// The single history popup. Rows live only while it is open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryPopup {
    #[default]
    Closed,
    Loading {
        request: RequestId,
        card: CardId,
        field: PromptType,
    },
    Open {
        card: CardId,
        field: PromptType,
        title: String,
        rows: Vec<HistoryEntry>,
        /// Row being submitted and the request carrying it.
        applying: Option<(usize, RequestId)>,
    },
}

impl HistoryPopup {
    pub fn is_closed(&self) -> bool {
        matches!(self, HistoryPopup::Closed)
    }
}
