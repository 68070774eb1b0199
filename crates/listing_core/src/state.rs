use std::collections::BTreeMap;

use crate::view_model::{AppViewModel, CardView, FieldView, HistoryPopupView, KeywordView};
use crate::{
    BatchRun, Card, CardId, CardRegistry, FieldState, HistoryPopup, Notification,
    NotificationLevel, PromptType, RequestId,
};

/// Behaviour switches supplied by the shell's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreSettings {
    /// Refuse suggestion requests while the card has no keywords.
    pub require_keywords: bool,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            require_keywords: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    settings: CoreSettings,
    cards: CardRegistry,
    popup: HistoryPopup,
    batches: BTreeMap<CardId, BatchRun>,
    notifications: Vec<Notification>,
    next_request: RequestId,
    next_notification: u64,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CoreSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> CoreSettings {
        self.settings
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn cards(&self) -> &CardRegistry {
        &self.cards
    }

    pub fn popup(&self) -> &HistoryPopup {
        &self.popup
    }

    pub fn batch(&self, card: &CardId) -> Option<&BatchRun> {
        self.batches.get(card)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> AppViewModel {
        let cards = self
            .cards
            .iter()
            .map(|card| CardView {
                id: card.id().clone(),
                name: card.name().to_string(),
                keywords: card
                    .keywords()
                    .iter()
                    .map(|(handle, text)| KeywordView {
                        handle,
                        text: text.to_string(),
                    })
                    .collect(),
                inline_error: card.inline_error().map(ToOwned::to_owned),
                bulk_review: card.bulk_review(),
                batch_running: self.batches.contains_key(card.id()),
                fields: card.fields().map(|(kind, field)| field_view(kind, field)).collect(),
            })
            .collect();

        let popup = match &self.popup {
            HistoryPopup::Closed => None,
            HistoryPopup::Loading { card, field, .. } => Some(HistoryPopupView {
                card: card.clone(),
                field: *field,
                title: self
                    .cards
                    .get(card)
                    .map(|c| c.name().to_string())
                    .unwrap_or_default(),
                loading: true,
                rows: Vec::new(),
                applying_row: None,
            }),
            HistoryPopup::Open {
                card,
                field,
                title,
                rows,
                applying,
            } => Some(HistoryPopupView {
                card: card.clone(),
                field: *field,
                title: title.clone(),
                loading: false,
                rows: rows.clone(),
                applying_row: applying.map(|(row, _)| row),
            }),
        };

        AppViewModel {
            cards,
            popup,
            notifications: self.notifications.clone(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        self.next_request
    }

    pub(crate) fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.next_notification += 1;
        self.notifications.push(Notification {
            seq: self.next_notification,
            level,
            message: message.into(),
        });
        self.dirty = true;
    }

    pub(crate) fn clear_notifications(&mut self) {
        if !self.notifications.is_empty() {
            self.notifications.clear();
            self.dirty = true;
        }
    }

    pub(crate) fn register_cards(&mut self, cards: Vec<Card>) {
        for card in cards {
            self.cards.insert(card);
        }
        self.dirty = true;
    }

    pub(crate) fn card_mut(&mut self, id: &CardId) -> Option<&mut Card> {
        self.cards.get_mut(id)
    }

    pub(crate) fn field_mut(&mut self, id: &CardId, field: PromptType) -> Option<&mut FieldState> {
        self.cards.get_mut(id).and_then(|card| card.field_mut(field))
    }

    pub(crate) fn popup_mut(&mut self) -> &mut HistoryPopup {
        &mut self.popup
    }

    pub(crate) fn batches_mut(&mut self) -> &mut BTreeMap<CardId, BatchRun> {
        &mut self.batches
    }
}

fn field_view(kind: PromptType, field: &FieldState) -> FieldView {
    let draft = match &field.phase {
        crate::FieldPhase::Editing { draft, .. } => Some(draft.clone()),
        _ => None,
    };
    FieldView {
        prompt_type: kind,
        text: field.text.clone(),
        processed: field.processed,
        status: field.phase.status(),
        busy: field.phase.is_busy(),
        draft,
    }
}
