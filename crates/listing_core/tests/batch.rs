use std::collections::BTreeMap;

use listing_core::{
    update, AppState, Card, CardId, Effect, Endpoints, FailureKind, FieldStatus, Msg, PromptType,
    ServiceFailure, SuggestionId, SuggestionReply,
};
use serde_json::json;
use url::Url;

fn init_logging() {
    listing_logging::initialize_for_tests();
}

fn endpoints() -> Endpoints {
    let base = Url::parse("http://localhost:8000/salla/").unwrap();
    Endpoints {
        ask_suggestion: base.join("ask/").unwrap(),
        submit: base.join("submit/").unwrap(),
        submit_manual: base.join("submit-manual/").unwrap(),
        decline: base.join("decline/").unwrap(),
        history: base.join("history/").unwrap(),
    }
}

fn card_id() -> CardId {
    CardId::new("77")
}

fn loaded(processed: &[PromptType], keywords: &[&str]) -> AppState {
    let processed: BTreeMap<_, _> = processed.iter().map(|kind| (*kind, true)).collect();
    let card = Card::from_product(
        json!({"id": 77, "name": "Desk Lamp", "description": "A lamp"}),
        endpoints(),
        &processed,
    )
    .unwrap()
    .with_keywords(keywords.iter().copied());
    let (state, _) = update(AppState::new(), Msg::CardsLoaded(vec![card]));
    state
}

fn started_requests(effects: &[Effect]) -> Vec<(PromptType, u64)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::AskSuggestion { field, request, .. } => Some((*field, *request)),
            _ => None,
        })
        .collect()
}

fn reply(state: AppState, field: PromptType, request: u64, ok: bool) -> (AppState, Vec<Effect>) {
    let result = if ok {
        Ok(SuggestionReply {
            answer: format!("better {field}"),
            suggestion_id: SuggestionId::Text(format!("s-{request}")),
        })
    } else {
        Err(ServiceFailure::new(FailureKind::Timeout, "timed out"))
    };
    update(
        state,
        Msg::SuggestionArrived {
            request,
            card: card_id(),
            field,
            result,
        },
    )
}

#[test]
fn batch_starts_only_unprocessed_fields() {
    init_logging();
    let state = loaded(&[PromptType::Title, PromptType::SeoTitle], &["lamp"]);

    let (state, effects) = update(state, Msg::BatchClicked { card: card_id() });

    assert_eq!(
        started_requests(&effects),
        vec![(PromptType::Description, 1), (PromptType::SeoDescription, 2)]
    );
    assert!(state.view().card(&card_id()).unwrap().batch_running);
    assert_eq!(state.batch(&card_id()).unwrap().remaining(), 2);
}

#[test]
fn batch_finalizes_once_after_all_completions() {
    init_logging();
    let state = loaded(&[PromptType::Title, PromptType::SeoTitle], &["lamp"]);
    let (state, _) = update(state, Msg::BatchClicked { card: card_id() });

    let (state, effects) = reply(state, PromptType::SeoDescription, 2, false);
    assert!(effects.is_empty());
    assert!(!state.view().card(&card_id()).unwrap().bulk_review);

    let (state, effects) = reply(state, PromptType::Description, 1, true);
    assert_eq!(
        effects,
        vec![Effect::BatchFinished {
            card: card_id(),
            fields: 2
        }]
    );
    let view = state.view();
    let card = view.card(&card_id()).unwrap();
    assert!(card.bulk_review);
    assert!(!card.batch_running);
    assert!(state.batch(&card_id()).is_none());

    // Late duplicates never finalize twice.
    let (_, effects) = reply(state, PromptType::Description, 1, true);
    assert!(effects.is_empty());
}

#[test]
fn empty_batch_completes_immediately_without_tracking() {
    init_logging();
    let state = loaded(&PromptType::ALL, &["lamp"]);

    let (state, effects) = update(state, Msg::BatchClicked { card: card_id() });

    assert_eq!(
        effects,
        vec![Effect::BatchFinished {
            card: card_id(),
            fields: 0
        }]
    );
    assert!(state.batch(&card_id()).is_none());
    assert!(!state.view().card(&card_id()).unwrap().bulk_review);
}

#[test]
fn batch_without_keywords_aborts_before_starting() {
    init_logging();
    let state = loaded(&[], &[]);

    let (state, effects) = update(state, Msg::BatchClicked { card: card_id() });

    assert!(effects.is_empty());
    assert!(state.batch(&card_id()).is_none());
    let view = state.view();
    let card = view.card(&card_id()).unwrap();
    assert!(card.inline_error.is_some());
    assert!(card
        .fields
        .iter()
        .all(|field| field.status == FieldStatus::Idle));
}

#[test]
fn second_batch_while_running_is_ignored() {
    init_logging();
    let state = loaded(&[], &["lamp"]);
    let (state, effects) = update(state, Msg::BatchClicked { card: card_id() });
    assert_eq!(effects.len(), 4);

    let (_, effects) = update(state, Msg::BatchClicked { card: card_id() });
    assert!(effects.is_empty());
}

#[test]
fn bulk_accept_and_decline_after_batch() {
    init_logging();
    let state = loaded(&[PromptType::Title, PromptType::SeoTitle], &["lamp"]);
    let (state, _) = update(state, Msg::BatchClicked { card: card_id() });
    let (state, _) = reply(state, PromptType::Description, 1, true);
    let (state, _) = reply(state, PromptType::SeoDescription, 2, true);

    let (state, effects) = update(state, Msg::AcceptAllClicked { card: card_id() });
    let submitted: Vec<_> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Submit { field, .. } => Some(*field),
            _ => None,
        })
        .collect();
    assert_eq!(
        submitted,
        vec![PromptType::Description, PromptType::SeoDescription]
    );
    assert!(!state.view().card(&card_id()).unwrap().bulk_review);

    // Bulk controls are gone until the next batch finishes.
    let (_, effects) = update(state, Msg::DeclineAllClicked { card: card_id() });
    assert!(effects.is_empty());
}

#[test]
fn bulk_decline_restores_every_field() {
    init_logging();
    let state = loaded(&[PromptType::Title, PromptType::SeoTitle], &["lamp"]);
    let (state, _) = update(state, Msg::BatchClicked { card: card_id() });
    let (state, _) = reply(state, PromptType::Description, 1, true);
    let (state, _) = reply(state, PromptType::SeoDescription, 2, true);

    let (state, effects) = update(state, Msg::DeclineAllClicked { card: card_id() });

    assert_eq!(effects.len(), 2);
    assert!(effects
        .iter()
        .all(|effect| matches!(effect, Effect::Decline { .. })));
    let card = state.card(&card_id()).unwrap();
    assert_eq!(card.field(PromptType::Description).unwrap().text, "A lamp");
    assert_eq!(card.field(PromptType::SeoDescription).unwrap().text, "");
}
