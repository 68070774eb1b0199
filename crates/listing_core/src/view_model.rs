use crate::{CardId, FieldStatus, HistoryEntry, KeywordHandle, Notification, PromptType};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub cards: Vec<CardView>,
    pub popup: Option<HistoryPopupView>,
    pub notifications: Vec<Notification>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn card(&self, id: &CardId) -> Option<&CardView> {
        self.cards.iter().find(|card| &card.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: CardId,
    pub name: String,
    pub keywords: Vec<KeywordView>,
    /// Inline validation message shown next to the card's controls.
    pub inline_error: Option<String>,
    /// Bulk accept/decline controls are offered.
    pub bulk_review: bool,
    pub batch_running: bool,
    pub fields: Vec<FieldView>,
}

impl CardView {
    pub fn field(&self, kind: PromptType) -> Option<&FieldView> {
        self.fields.iter().find(|field| field.prompt_type == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordView {
    pub handle: KeywordHandle,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub prompt_type: PromptType,
    pub text: String,
    pub processed: bool,
    pub status: FieldStatus,
    /// Controls are disabled and show a loading indicator.
    pub busy: bool,
    /// Editor contents while editing manually.
    pub draft: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPopupView {
    pub card: CardId,
    pub field: PromptType,
    pub title: String,
    pub loading: bool,
    /// Empty once loaded means the "no history" placeholder is shown.
    pub rows: Vec<HistoryEntry>,
    pub applying_row: Option<usize>,
}
