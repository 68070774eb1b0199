use crate::{
    Card, CardId, HistoryEntry, KeywordHandle, PromptType, RequestId, ServiceFailure,
    SubmitOrigin, SuggestionId,
};

/// Successful reply of the ask-suggestion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionReply {
    pub answer: String,
    pub suggestion_id: SuggestionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Register the cards rendered on the page.
    CardsLoaded(Vec<Card>),
    /// User asked for an AI suggestion for one field.
    SuggestClicked { card: CardId, field: PromptType },
    /// User accepted the pending suggestion.
    AcceptClicked { card: CardId, field: PromptType },
    /// User declined the pending suggestion.
    DeclineClicked { card: CardId, field: PromptType },
    /// User switched the field to manual editing.
    EditClicked { card: CardId, field: PromptType },
    /// User typed into the manual editor.
    DraftChanged {
        card: CardId,
        field: PromptType,
        text: String,
    },
    /// User confirmed the manual edit.
    ConfirmEditClicked { card: CardId, field: PromptType },
    /// User cancelled the manual edit.
    CancelEditClicked { card: CardId, field: PromptType },
    /// User submitted the keyword input.
    KeywordSubmitted { card: CardId, text: String },
    /// User clicked a keyword's remove control.
    KeywordRemoveClicked { card: CardId, handle: KeywordHandle },
    /// User opened the history popup for a field.
    HistoryClicked { card: CardId, field: PromptType },
    /// User picked a row of the open history popup.
    HistoryRowChosen { row: usize },
    /// User closed the history popup.
    HistoryClosed,
    /// User asked for suggestions on every unprocessed field of a card.
    BatchClicked { card: CardId },
    /// User accepted every pending suggestion after a batch.
    AcceptAllClicked { card: CardId },
    /// User declined every pending suggestion after a batch.
    DeclineAllClicked { card: CardId },
    /// The shell displayed the queued notifications.
    NotificationsShown,
    /// Ask-suggestion call finished.
    SuggestionArrived {
        request: RequestId,
        card: CardId,
        field: PromptType,
        result: Result<SuggestionReply, ServiceFailure>,
    },
    /// Submit or submit-manual call finished; carries the persisted value.
    SubmitFinished {
        request: RequestId,
        card: CardId,
        field: PromptType,
        origin: SubmitOrigin,
        result: Result<String, ServiceFailure>,
    },
    /// Decline call finished.
    DeclineFinished {
        request: RequestId,
        result: Result<(), ServiceFailure>,
    },
    /// History call finished.
    HistoryLoaded {
        request: RequestId,
        result: Result<Vec<HistoryEntry>, ServiceFailure>,
    },
}
