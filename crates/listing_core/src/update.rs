use std::collections::BTreeMap;

use listing_logging::{listing_debug, listing_info, listing_warn};

use crate::msg::SuggestionReply;
use crate::{
    AppState, BatchRun, CardId, Effect, FieldPhase, HistoryEntry, HistoryPopup, KeywordAdd, Msg,
    NotificationLevel, PromptType, RequestId, ServiceFailure, SubmitOrigin, SubmitPayload,
    Suggestion,
};

pub(crate) const MISSING_KEYWORDS: &str =
    "Add at least one keyword before asking for a suggestion.";
pub(crate) const EMPTY_DRAFT: &str = "The edited text cannot be empty.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CardsLoaded(cards) => {
            listing_info!("Registering {} cards", cards.len());
            state.register_cards(cards);
            Vec::new()
        }
        Msg::SuggestClicked { card, field } => request_suggestion(&mut state, &card, field)
            .into_iter()
            .collect(),
        Msg::AcceptClicked { card, field } => accept(&mut state, &card, field).into_iter().collect(),
        Msg::DeclineClicked { card, field } => {
            decline(&mut state, &card, field).into_iter().collect()
        }
        Msg::EditClicked { card, field } => {
            edit_manually(&mut state, &card, field);
            Vec::new()
        }
        Msg::DraftChanged { card, field, text } => {
            change_draft(&mut state, &card, field, text);
            Vec::new()
        }
        Msg::ConfirmEditClicked { card, field } => confirm_manual_edit(&mut state, &card, field)
            .into_iter()
            .collect(),
        Msg::CancelEditClicked { card, field } => {
            cancel_manual_edit(&mut state, &card, field);
            Vec::new()
        }
        Msg::KeywordSubmitted { card, text } => {
            add_keyword(&mut state, &card, &text);
            Vec::new()
        }
        Msg::KeywordRemoveClicked { card, handle } => {
            if let Some(entry) = state.card_mut(&card) {
                if let Some(removed) = entry.keywords.remove(handle) {
                    listing_debug!("Removed keyword `{}` from card {}", removed, card);
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        Msg::HistoryClicked { card, field } => {
            open_history(&mut state, &card, field).into_iter().collect()
        }
        Msg::HistoryRowChosen { row } => use_history_row(&mut state, row).into_iter().collect(),
        Msg::HistoryClosed => {
            if !state.popup().is_closed() {
                *state.popup_mut() = HistoryPopup::Closed;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::BatchClicked { card } => run_all_unprocessed(&mut state, &card),
        Msg::AcceptAllClicked { card } => bulk_resolve(&mut state, &card, true),
        Msg::DeclineAllClicked { card } => bulk_resolve(&mut state, &card, false),
        Msg::NotificationsShown => {
            state.clear_notifications();
            Vec::new()
        }
        Msg::SuggestionArrived {
            request,
            card,
            field,
            result,
        } => apply_suggestion(&mut state, request, &card, field, result),
        Msg::SubmitFinished {
            request,
            card,
            field,
            origin,
            result,
        } => {
            match origin {
                SubmitOrigin::Suggestion => finish_accept(&mut state, request, &card, field, result),
                SubmitOrigin::Manual => finish_manual(&mut state, request, &card, field, result),
                SubmitOrigin::History => {
                    finish_history_submit(&mut state, request, &card, field, result)
                }
            }
            Vec::new()
        }
        Msg::DeclineFinished { request, result } => {
            // The original text is already back on screen; only report.
            if let Err(failure) = result {
                listing_warn!("Decline request {} failed: {}", request, failure);
                state.notify(
                    NotificationLevel::Warning,
                    format!("The backend did not record the decline: {failure}"),
                );
            }
            Vec::new()
        }
        Msg::HistoryLoaded { request, result } => {
            apply_history(&mut state, request, result);
            Vec::new()
        }
    };

    (state, effects)
}

fn request_suggestion(state: &mut AppState, card: &CardId, field: PromptType) -> Option<Effect> {
    let phase = &state.card(card)?.field(field)?.phase;
    if !matches!(phase, FieldPhase::Idle) {
        listing_debug!(
            "Ignoring suggestion request for {}/{} in {:?}",
            card,
            field,
            phase.status()
        );
        return None;
    }
    if !keywords_ready(state, card) {
        return None;
    }
    begin_suggestion(state, card, field)
}

/// Validates keyword context, surfacing the inline error when it is missing.
fn keywords_ready(state: &mut AppState, card: &CardId) -> bool {
    let require = state.settings().require_keywords;
    let Some(entry) = state.card_mut(card) else {
        return false;
    };
    if require && entry.keywords.is_empty() {
        entry.inline_error = Some(MISSING_KEYWORDS.to_string());
        state.mark_dirty();
        return false;
    }
    if entry.inline_error.take().is_some() {
        state.mark_dirty();
    }
    true
}

/// Moves an idle field to `Requesting` and builds the call. Validation is the caller's job.
fn begin_suggestion(state: &mut AppState, card: &CardId, field: PromptType) -> Option<Effect> {
    let request = state.next_request_id();
    let entry = state.card_mut(card)?;
    let url = entry.endpoints().ask_suggestion.clone();
    let product = entry.request_product();
    let keywords = entry.keywords.to_list();
    entry.field_mut(field)?.phase = FieldPhase::Requesting { request };
    state.mark_dirty();
    listing_info!("Asking suggestion for {}/{} (request {})", card, field, request);

    Some(Effect::AskSuggestion {
        request,
        card: card.clone(),
        field,
        url,
        product,
        keywords,
    })
}

fn apply_suggestion(
    state: &mut AppState,
    request: RequestId,
    card: &CardId,
    field: PromptType,
    result: Result<SuggestionReply, ServiceFailure>,
) -> Vec<Effect> {
    let Some(entry) = state.field_mut(card, field) else {
        listing_warn!("Suggestion {} arrived for unknown field {}/{}", request, card, field);
        return Vec::new();
    };
    if entry.phase != (FieldPhase::Requesting { request }) {
        listing_warn!(
            "Dropping stale suggestion {} for {}/{} ({:?})",
            request,
            card,
            field,
            entry.phase.status()
        );
        return Vec::new();
    }

    match result {
        Ok(reply) => {
            let original = std::mem::replace(&mut entry.text, reply.answer.clone());
            entry.phase = FieldPhase::Pending {
                original,
                suggestion: Suggestion {
                    text: reply.answer,
                    id: reply.suggestion_id,
                },
                accepting: None,
            };
        }
        Err(failure) => {
            entry.phase = FieldPhase::Idle;
            state.notify(
                NotificationLevel::Error,
                format!("Could not get a suggestion for {field}: {failure}"),
            );
        }
    }
    state.mark_dirty();

    batch_progress(state, card, field, request)
}

fn batch_progress(
    state: &mut AppState,
    card: &CardId,
    field: PromptType,
    request: RequestId,
) -> Vec<Effect> {
    let finished = match state.batches_mut().get_mut(card) {
        Some(run) => run.complete(field, request),
        None => return Vec::new(),
    };
    if !finished {
        return Vec::new();
    }
    let Some(run) = state.batches_mut().remove(card) else {
        return Vec::new();
    };
    finalize_batch(state, card, run.started())
}

fn finalize_batch(state: &mut AppState, card: &CardId, fields: usize) -> Vec<Effect> {
    if let Some(entry) = state.card_mut(card) {
        let any_pending = entry
            .fields
            .values()
            .any(|field| matches!(field.phase, FieldPhase::Pending { .. }));
        entry.bulk_review = any_pending;
    }
    state.mark_dirty();
    listing_info!("Batch for card {} finished ({} fields)", card, fields);
    vec![Effect::BatchFinished {
        card: card.clone(),
        fields,
    }]
}

fn accept(state: &mut AppState, card: &CardId, field: PromptType) -> Option<Effect> {
    let entry = state.card(card)?;
    let suggestion = match &entry.field(field)?.phase {
        FieldPhase::Pending {
            suggestion,
            accepting: None,
            ..
        } => suggestion.clone(),
        phase => {
            listing_debug!("Accept ignored for {}/{} ({:?})", card, field, phase.status());
            return None;
        }
    };
    let url = entry.endpoints().submit.clone();
    let product_id = entry.id().as_str().to_string();

    let request = state.next_request_id();
    if let Some(FieldPhase::Pending { accepting, .. }) =
        state.field_mut(card, field).map(|target| &mut target.phase)
    {
        *accepting = Some(request);
    }
    state.mark_dirty();

    Some(Effect::Submit {
        request,
        card: card.clone(),
        field,
        origin: SubmitOrigin::Suggestion,
        url,
        payload: SubmitPayload {
            product_id,
            prompt_type: field,
            new_value: suggestion.text,
            suggestion_id: Some(suggestion.id),
        },
    })
}

fn finish_accept(
    state: &mut AppState,
    request: RequestId,
    card: &CardId,
    field: PromptType,
    result: Result<String, ServiceFailure>,
) {
    let Some(entry) = state.field_mut(card, field) else {
        return;
    };
    let FieldPhase::Pending { accepting, .. } = &mut entry.phase else {
        listing_warn!("Dropping stale accept result {} for {}/{}", request, card, field);
        return;
    };
    if *accepting != Some(request) {
        listing_warn!("Dropping stale accept result {} for {}/{}", request, card, field);
        return;
    }

    match result {
        Ok(new_value) => {
            entry.text = new_value;
            entry.processed = true;
            entry.phase = FieldPhase::Idle;
        }
        Err(failure) => {
            // The candidate stays on display with accept/decline offered again.
            *accepting = None;
            state.notify(
                NotificationLevel::Error,
                format!("Could not save the {field} suggestion: {failure}"),
            );
        }
    }
    state.mark_dirty();
}

fn decline(state: &mut AppState, card: &CardId, field: PromptType) -> Option<Effect> {
    let entry = state.field_mut(card, field)?;
    let FieldPhase::Pending {
        accepting: None, ..
    } = &entry.phase
    else {
        listing_debug!("Decline ignored for {}/{}", card, field);
        return None;
    };
    let FieldPhase::Pending {
        original,
        suggestion,
        ..
    } = std::mem::take(&mut entry.phase)
    else {
        return None;
    };
    entry.text = original;

    let request = state.next_request_id();
    let url = state.card(card)?.endpoints().decline.clone();
    state.mark_dirty();

    Some(Effect::Decline {
        request,
        url,
        suggestion_id: suggestion.id,
    })
}

fn edit_manually(state: &mut AppState, card: &CardId, field: PromptType) {
    let Some(entry) = state.field_mut(card, field) else {
        return;
    };
    if !matches!(entry.phase, FieldPhase::Idle) {
        listing_debug!("Edit ignored for {}/{}", card, field);
        return;
    }
    entry.phase = FieldPhase::Editing {
        original: entry.text.clone(),
        draft: entry.text.clone(),
        submitting: None,
    };
    state.mark_dirty();
}

fn change_draft(state: &mut AppState, card: &CardId, field: PromptType, text: String) {
    let Some(entry) = state.field_mut(card, field) else {
        return;
    };
    if let FieldPhase::Editing {
        draft,
        submitting: None,
        ..
    } = &mut entry.phase
    {
        *draft = text;
        state.mark_dirty();
    }
}

fn confirm_manual_edit(state: &mut AppState, card: &CardId, field: PromptType) -> Option<Effect> {
    let draft = match &state.card(card)?.field(field)?.phase {
        FieldPhase::Editing {
            draft,
            submitting: None,
            ..
        } => draft.clone(),
        _ => {
            listing_debug!("Confirm ignored for {}/{}", card, field);
            return None;
        }
    };
    if draft.trim().is_empty() {
        let entry = state.card_mut(card)?;
        entry.inline_error = Some(EMPTY_DRAFT.to_string());
        state.mark_dirty();
        return None;
    }

    let request = state.next_request_id();
    let entry = state.card_mut(card)?;
    entry.inline_error = None;
    let url = entry.endpoints().submit_manual.clone();
    let product_id = entry.id().as_str().to_string();
    if let FieldPhase::Editing { submitting, .. } = &mut entry.field_mut(field)?.phase {
        *submitting = Some(request);
    }
    state.mark_dirty();

    Some(Effect::Submit {
        request,
        card: card.clone(),
        field,
        origin: SubmitOrigin::Manual,
        url,
        payload: SubmitPayload {
            product_id,
            prompt_type: field,
            new_value: draft,
            suggestion_id: None,
        },
    })
}

fn finish_manual(
    state: &mut AppState,
    request: RequestId,
    card: &CardId,
    field: PromptType,
    result: Result<String, ServiceFailure>,
) {
    let Some(entry) = state.field_mut(card, field) else {
        return;
    };
    let FieldPhase::Editing { submitting, .. } = &mut entry.phase else {
        listing_warn!("Dropping stale manual result {} for {}/{}", request, card, field);
        return;
    };
    if *submitting != Some(request) {
        listing_warn!("Dropping stale manual result {} for {}/{}", request, card, field);
        return;
    }

    match result {
        Ok(new_value) => {
            entry.text = new_value;
            entry.processed = true;
            entry.phase = FieldPhase::Idle;
        }
        Err(failure) => {
            *submitting = None;
            state.notify(
                NotificationLevel::Error,
                format!("Could not save the edited {field}: {failure}"),
            );
        }
    }
    state.mark_dirty();
}

fn cancel_manual_edit(state: &mut AppState, card: &CardId, field: PromptType) {
    let Some(entry) = state.field_mut(card, field) else {
        return;
    };
    if !matches!(
        entry.phase,
        FieldPhase::Editing {
            submitting: None,
            ..
        }
    ) {
        listing_debug!("Cancel ignored for {}/{}", card, field);
        return;
    }
    if let FieldPhase::Editing { original, .. } = std::mem::take(&mut entry.phase) {
        entry.text = original;
    }
    state.mark_dirty();
}

fn add_keyword(state: &mut AppState, card: &CardId, text: &str) {
    let Some(entry) = state.card_mut(card) else {
        return;
    };
    match entry.keywords.add(text) {
        KeywordAdd::Added(handle) => {
            listing_debug!("Added keyword {:?} to card {}", handle, card);
            entry.inline_error = None;
        }
        KeywordAdd::Duplicate => {
            listing_debug!("Keyword `{}` already on card {}", text.trim(), card);
        }
        KeywordAdd::Blank => {}
    }
    // The input is cleared whatever the outcome.
    state.mark_dirty();
}

fn open_history(state: &mut AppState, card: &CardId, field: PromptType) -> Option<Effect> {
    if !state.popup().is_closed() {
        listing_debug!("History popup already open");
        return None;
    }
    let entry = state.card(card)?;
    entry.field(field)?;
    let url = entry.endpoints().history.clone();
    let product_id = entry.id().as_str().to_string();

    let request = state.next_request_id();
    *state.popup_mut() = HistoryPopup::Loading {
        request,
        card: card.clone(),
        field,
    };
    state.mark_dirty();

    Some(Effect::FetchHistory {
        request,
        url,
        product_id,
        prompt_type: field,
    })
}

fn apply_history(
    state: &mut AppState,
    request: RequestId,
    result: Result<Vec<HistoryEntry>, ServiceFailure>,
) {
    let (card, field) = match state.popup() {
        HistoryPopup::Loading {
            request: expected,
            card,
            field,
        } if *expected == request => (card.clone(), *field),
        _ => {
            listing_warn!("Dropping stale history response {}", request);
            return;
        }
    };

    match result {
        Ok(rows) => {
            let title = state
                .card(&card)
                .map(|entry| entry.name().to_string())
                .unwrap_or_default();
            *state.popup_mut() = HistoryPopup::Open {
                card,
                field,
                title,
                rows,
                applying: None,
            };
        }
        Err(failure) => {
            *state.popup_mut() = HistoryPopup::Closed;
            state.notify(
                NotificationLevel::Error,
                format!("Could not load history for {field}: {failure}"),
            );
        }
    }
    state.mark_dirty();
}

fn use_history_row(state: &mut AppState, row: usize) -> Option<Effect> {
    let (card, field, new_value) = match state.popup() {
        HistoryPopup::Open {
            card,
            field,
            rows,
            applying: None,
            ..
        } => (card.clone(), *field, rows.get(row)?.answer_text.clone()),
        _ => return None,
    };
    let entry = state.card(&card)?;
    if !matches!(entry.field(field)?.phase, FieldPhase::Idle) {
        listing_debug!("History row ignored: {}/{} is not idle", card, field);
        return None;
    }
    let url = entry.endpoints().submit.clone();
    let product_id = entry.id().as_str().to_string();

    let request = state.next_request_id();
    if let Some(entry) = state.field_mut(&card, field) {
        entry.phase = FieldPhase::Applying { request };
    }
    if let HistoryPopup::Open { applying, .. } = state.popup_mut() {
        *applying = Some((row, request));
    }
    state.mark_dirty();

    Some(Effect::Submit {
        request,
        card,
        field,
        origin: SubmitOrigin::History,
        url,
        payload: SubmitPayload {
            product_id,
            prompt_type: field,
            new_value,
            suggestion_id: None,
        },
    })
}

fn finish_history_submit(
    state: &mut AppState,
    request: RequestId,
    card: &CardId,
    field: PromptType,
    result: Result<String, ServiceFailure>,
) {
    let Some(entry) = state.field_mut(card, field) else {
        return;
    };
    if entry.phase != (FieldPhase::Applying { request }) {
        listing_warn!("Dropping stale history submit {} for {}/{}", request, card, field);
        return;
    }
    entry.phase = FieldPhase::Idle;
    let popup_owns_request = matches!(
        state.popup(),
        HistoryPopup::Open { applying: Some((_, pending)), .. } if *pending == request
    );

    match result {
        Ok(new_value) => {
            // Committed even if the popup was closed meanwhile.
            if let Some(entry) = state.field_mut(card, field) {
                entry.text = new_value;
                entry.processed = true;
            }
            if popup_owns_request {
                *state.popup_mut() = HistoryPopup::Closed;
            }
        }
        Err(failure) => {
            if popup_owns_request {
                if let HistoryPopup::Open { applying, .. } = state.popup_mut() {
                    *applying = None;
                }
            }
            state.notify(
                NotificationLevel::Error,
                format!("Could not apply the history entry for {field}: {failure}"),
            );
        }
    }
    state.mark_dirty();
}

fn run_all_unprocessed(state: &mut AppState, card: &CardId) -> Vec<Effect> {
    if state.batch(card).is_some() {
        listing_debug!("Batch already running for card {}", card);
        return Vec::new();
    }
    if state.card(card).is_none() || !keywords_ready(state, card) {
        return Vec::new();
    }
    let snapshot: Vec<PromptType> = match state.card(card) {
        Some(entry) => entry
            .fields()
            .filter(|(_, field)| !field.processed && matches!(field.phase, FieldPhase::Idle))
            .map(|(kind, _)| kind)
            .collect(),
        None => Vec::new(),
    };

    let mut effects = Vec::with_capacity(snapshot.len());
    let mut started = BTreeMap::new();
    for field in snapshot {
        if let Some(effect) = begin_suggestion(state, card, field) {
            if let Effect::AskSuggestion { request, .. } = &effect {
                started.insert(field, *request);
            }
            effects.push(effect);
        }
    }

    if started.is_empty() {
        return finalize_batch(state, card, 0);
    }
    listing_info!("Batch for card {} started {} fields", card, started.len());
    state
        .batches_mut()
        .insert(card.clone(), BatchRun::new(started));
    effects
}

fn bulk_resolve(state: &mut AppState, card: &CardId, accept_all: bool) -> Vec<Effect> {
    let targets: Vec<PromptType> = match state.card(card) {
        Some(entry) if entry.bulk_review() => entry
            .fields()
            .filter(|(_, field)| {
                matches!(
                    field.phase,
                    FieldPhase::Pending {
                        accepting: None,
                        ..
                    }
                )
            })
            .map(|(kind, _)| kind)
            .collect(),
        _ => return Vec::new(),
    };
    if let Some(entry) = state.card_mut(card) {
        entry.bulk_review = false;
    }
    state.mark_dirty();

    targets
        .into_iter()
        .filter_map(|field| {
            if accept_all {
                accept(state, card, field)
            } else {
                decline(state, card, field)
            }
        })
        .collect()
}
