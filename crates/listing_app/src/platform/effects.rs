use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use listing_core::{
    CardId, Effect, FailureKind, HistoryEntry, Msg, PromptType, ServiceFailure, SubmitOrigin,
    SuggestionId, SuggestionReply,
};
use listing_engine::{
    AskSuggestionBody, CallId, DeclineBody, EngineHandle, HistoryBody, ServiceCall, ServiceError,
    ServiceEvent, ServiceOutcome, ServiceSettings, SubmitBody,
};
use listing_logging::{listing_debug, listing_info, listing_warn};

use super::Input;

/// Where a completion must be delivered once its call returns.
#[derive(Debug, Clone)]
enum Route {
    Suggestion { card: CardId, field: PromptType },
    Submit {
        card: CardId,
        field: PromptType,
        origin: SubmitOrigin,
    },
    Decline,
    History,
}

pub struct EffectRunner {
    engine: EngineHandle,
    routes: Arc<Mutex<HashMap<CallId, Route>>>,
}

impl EffectRunner {
    pub fn new(
        settings: ServiceSettings,
        input_tx: mpsc::Sender<Input>,
    ) -> Result<Self, ServiceError> {
        let engine = EngineHandle::new(settings)?;
        let runner = Self {
            engine,
            routes: Arc::new(Mutex::new(HashMap::new())),
        };
        if let Some(events) = runner.engine.take_events() {
            runner.spawn_event_loop(events, input_tx);
        }
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let Some((call, route)) = into_call(effect) else {
                continue;
            };
            if let Ok(mut routes) = self.routes.lock() {
                routes.insert(call.id(), route);
            }
            self.engine.enqueue(call);
        }
    }

    fn spawn_event_loop(
        &self,
        events: mpsc::Receiver<ServiceEvent>,
        input_tx: mpsc::Sender<Input>,
    ) {
        let routes = self.routes.clone();
        thread::spawn(move || {
            while let Ok(ServiceEvent::Completed { id, outcome }) = events.recv() {
                if !forward(&routes, &input_tx, id, outcome) {
                    return;
                }
            }
            listing_debug!("Engine event stream closed");
        });
    }
}

/// Routes one completion back to the app loop. False once the loop is gone.
fn forward(
    routes: &Mutex<HashMap<CallId, Route>>,
    input_tx: &mpsc::Sender<Input>,
    id: CallId,
    outcome: ServiceOutcome,
) -> bool {
    let route = routes.lock().ok().and_then(|mut routes| routes.remove(&id));
    let Some(route) = route else {
        listing_warn!("Completion {} has no route", id);
        return true;
    };
    let Some(msg) = into_msg(id, route, outcome) else {
        listing_warn!("Completion {} did not match its route", id);
        return true;
    };
    input_tx.send(Input::Core(msg)).is_ok()
}

fn into_call(effect: Effect) -> Option<(ServiceCall, Route)> {
    match effect {
        Effect::AskSuggestion {
            request,
            card,
            field,
            url,
            product,
            keywords,
        } => {
            listing_info!(
                "AskSuggestion request={} card={} field={} keywords={}",
                request,
                card,
                field,
                keywords.len()
            );
            let call = ServiceCall::AskSuggestion {
                id: request,
                url,
                body: AskSuggestionBody {
                    product,
                    keywords,
                    prompt_type: field.as_str().to_string(),
                },
            };
            Some((call, Route::Suggestion { card, field }))
        }
        Effect::Submit {
            request,
            card,
            field,
            origin,
            url,
            payload,
        } => {
            listing_info!(
                "Submit request={} card={} field={} origin={:?}",
                request,
                card,
                field,
                origin
            );
            let call = ServiceCall::Submit {
                id: request,
                url,
                body: SubmitBody {
                    product_id: payload.product_id,
                    prompt_type: payload.prompt_type.as_str().to_string(),
                    new_value: payload.new_value,
                    suggestion_id: payload.suggestion_id.map(wire_suggestion_id),
                },
            };
            Some((
                call,
                Route::Submit {
                    card,
                    field,
                    origin,
                },
            ))
        }
        Effect::Decline {
            request,
            url,
            suggestion_id,
        } => {
            listing_info!("Decline request={} suggestion={}", request, suggestion_id);
            let call = ServiceCall::Decline {
                id: request,
                url,
                body: DeclineBody {
                    suggestion_id: wire_suggestion_id(suggestion_id),
                },
            };
            Some((call, Route::Decline))
        }
        Effect::FetchHistory {
            request,
            url,
            product_id,
            prompt_type,
        } => {
            listing_info!("FetchHistory request={} product={}", request, product_id);
            let call = ServiceCall::History {
                id: request,
                url,
                body: HistoryBody {
                    prompt_type: prompt_type.as_str().to_string(),
                    product_id,
                },
            };
            Some((call, Route::History))
        }
        Effect::BatchFinished { card, fields } => {
            listing_debug!("Batch finished for card {} ({} fields)", card, fields);
            None
        }
    }
}

fn into_msg(request: CallId, route: Route, outcome: ServiceOutcome) -> Option<Msg> {
    let msg = match (route, outcome) {
        (Route::Suggestion { card, field }, ServiceOutcome::Suggestion(result)) => {
            Msg::SuggestionArrived {
                request,
                card,
                field,
                result: result
                    .map(|reply| SuggestionReply {
                        answer: reply.answer,
                        suggestion_id: core_suggestion_id(reply.suggestion_id),
                    })
                    .map_err(map_error),
            }
        }
        (
            Route::Submit {
                card,
                field,
                origin,
            },
            ServiceOutcome::Submitted(result),
        ) => Msg::SubmitFinished {
            request,
            card,
            field,
            origin,
            result: result.map(|reply| reply.new_value).map_err(map_error),
        },
        (Route::Decline, ServiceOutcome::Declined(result)) => Msg::DeclineFinished {
            request,
            result: result.map_err(map_error),
        },
        (Route::History, ServiceOutcome::History(result)) => Msg::HistoryLoaded {
            request,
            result: result
                .map(|entries| {
                    entries
                        .into_iter()
                        .map(|entry| HistoryEntry {
                            answer_text: entry.answer_text,
                            keywords: entry.keywords_str.filter(|k| !k.trim().is_empty()),
                        })
                        .collect()
                })
                .map_err(map_error),
        },
        _ => return None,
    };
    Some(msg)
}

fn wire_suggestion_id(id: SuggestionId) -> listing_engine::SuggestionId {
    match id {
        SuggestionId::Number(id) => listing_engine::SuggestionId::Number(id),
        SuggestionId::Text(id) => listing_engine::SuggestionId::Text(id),
    }
}

fn core_suggestion_id(id: listing_engine::SuggestionId) -> SuggestionId {
    match id {
        listing_engine::SuggestionId::Number(id) => SuggestionId::Number(id),
        listing_engine::SuggestionId::Text(id) => SuggestionId::Text(id),
    }
}

fn map_error(err: ServiceError) -> ServiceFailure {
    let kind = match err.kind {
        listing_engine::FailureKind::InvalidUrl => FailureKind::InvalidUrl,
        listing_engine::FailureKind::HttpStatus(code) => FailureKind::HttpStatus(code),
        listing_engine::FailureKind::Timeout => FailureKind::Timeout,
        listing_engine::FailureKind::Network => FailureKind::Network,
        listing_engine::FailureKind::MalformedResponse => FailureKind::MalformedResponse,
    };
    ServiceFailure::new(kind, err.message)
}
