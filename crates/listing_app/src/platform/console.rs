//! Console input: each line is a user action on a page control.
//!
//! Actions are not bound per control. Every line is parsed into a
//! [`ControlEvent`] naming the node it targets, and [`delegate`] resolves the
//! card and field by walking the page tree from that node.
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use listing_core::{CardId, KeywordHandle, Msg, NodeId, PageTree, PromptType};

use super::page::Page;
use super::Input;

pub const USAGE: &str = "\
commands:
  suggest|accept|decline|edit|confirm|cancel|history <card> <field>
  draft <card> <field> <text...>
  keyword add <card> <text...> | keyword rm <card> <handle>
  batch|accept-all|decline-all <card>
  use <row> | close | show | help | quit
fields: title, description, seo_title, seo_description";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    Suggest,
    Accept,
    Decline,
    Edit,
    Draft(String),
    Confirm,
    Cancel,
    History,
    KeywordAdd(String),
    KeywordRemove(u32),
    Batch,
    AcceptAll,
    DeclineAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Control {
        card: String,
        field: Option<PromptType>,
        action: ControlAction,
    },
    UseHistoryRow(usize),
    CloseHistory,
    Show,
    Help,
    Quit,
}

/// An action aimed at one node of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEvent {
    pub target: NodeId,
    pub action: ControlAction,
}

pub fn parse_line(line: &str) -> Result<ConsoleCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".to_string());
    };
    let rest: Vec<&str> = words.collect();

    let field_action = |action: ControlAction| -> Result<ConsoleCommand, String> {
        let [card, field, ..] = rest.as_slice() else {
            return Err(format!("`{verb}` needs <card> <field>"));
        };
        Ok(ConsoleCommand::Control {
            card: card.to_string(),
            field: Some(parse_field(field)?),
            action,
        })
    };
    let card_action = |action: ControlAction| -> Result<ConsoleCommand, String> {
        let [card, ..] = rest.as_slice() else {
            return Err(format!("`{verb}` needs <card>"));
        };
        Ok(ConsoleCommand::Control {
            card: card.to_string(),
            field: None,
            action,
        })
    };

    match verb {
        "suggest" => field_action(ControlAction::Suggest),
        "accept" => field_action(ControlAction::Accept),
        "decline" => field_action(ControlAction::Decline),
        "edit" => field_action(ControlAction::Edit),
        "confirm" => field_action(ControlAction::Confirm),
        "cancel" => field_action(ControlAction::Cancel),
        "history" => field_action(ControlAction::History),
        "draft" => {
            let text = text_after_words(line, 3).to_string();
            field_action(ControlAction::Draft(text))
        }
        "batch" => card_action(ControlAction::Batch),
        "accept-all" => card_action(ControlAction::AcceptAll),
        "decline-all" => card_action(ControlAction::DeclineAll),
        "keyword" => match rest.as_slice() {
            ["add", card, text @ ..] if !text.is_empty() => Ok(ConsoleCommand::Control {
                card: card.to_string(),
                field: None,
                action: ControlAction::KeywordAdd(text.join(" ")),
            }),
            ["rm", card, handle] => {
                let handle = handle
                    .parse()
                    .map_err(|_| format!("`{handle}` is not a keyword handle"))?;
                Ok(ConsoleCommand::Control {
                    card: card.to_string(),
                    field: None,
                    action: ControlAction::KeywordRemove(handle),
                })
            }
            _ => Err("usage: keyword add <card> <text...> | keyword rm <card> <handle>".into()),
        },
        "use" => match rest.as_slice() {
            [row] => row
                .parse()
                .map(ConsoleCommand::UseHistoryRow)
                .map_err(|_| format!("`{row}` is not a row number")),
            _ => Err("usage: use <row>".into()),
        },
        "close" => Ok(ConsoleCommand::CloseHistory),
        "show" => Ok(ConsoleCommand::Show),
        "help" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(format!("unknown command `{other}`")),
    }
}

/// The raw remainder of `line` after its first `count` words, inner
/// whitespace kept as typed.
fn text_after_words(line: &str, count: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..count {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest
}

fn parse_field(raw: &str) -> Result<PromptType, String> {
    raw.parse::<PromptType>().map_err(|err| err.to_string())
}

/// Finds the node a control command targets on the rendered page.
pub fn locate(
    page: &Page,
    card: &str,
    field: Option<PromptType>,
    action: ControlAction,
) -> Option<ControlEvent> {
    let target = match field {
        Some(field) => page.field_control(card, field)?,
        None => page.card_control(card)?,
    };
    Some(ControlEvent { target, action })
}

/// Single delegated handler: resolves the event's card and field from the
/// tree and turns the action into a core message.
pub fn delegate(tree: &PageTree, event: ControlEvent) -> Option<Msg> {
    let card: CardId = tree.resolve_card(event.target)?.clone();
    let field = tree.resolve_field(event.target);

    let msg = match (event.action, field) {
        (ControlAction::Suggest, Some(field)) => Msg::SuggestClicked { card, field },
        (ControlAction::Accept, Some(field)) => Msg::AcceptClicked { card, field },
        (ControlAction::Decline, Some(field)) => Msg::DeclineClicked { card, field },
        (ControlAction::Edit, Some(field)) => Msg::EditClicked { card, field },
        (ControlAction::Draft(text), Some(field)) => Msg::DraftChanged { card, field, text },
        (ControlAction::Confirm, Some(field)) => Msg::ConfirmEditClicked { card, field },
        (ControlAction::Cancel, Some(field)) => Msg::CancelEditClicked { card, field },
        (ControlAction::History, Some(field)) => Msg::HistoryClicked { card, field },
        (ControlAction::KeywordAdd(text), _) => Msg::KeywordSubmitted { card, text },
        (ControlAction::KeywordRemove(raw), _) => Msg::KeywordRemoveClicked {
            card,
            handle: KeywordHandle::new(raw),
        },
        (ControlAction::Batch, _) => Msg::BatchClicked { card },
        (ControlAction::AcceptAll, _) => Msg::AcceptAllClicked { card },
        (ControlAction::DeclineAll, _) => Msg::DeclineAllClicked { card },
        (_, None) => return None,
    };
    Some(msg)
}

/// Reads stdin on a background thread, forwarding parsed lines to the app loop.
pub fn spawn_reader(tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let input = match parse_line(&line) {
                Ok(command) => Input::Console(command),
                Err(message) => Input::Invalid(message),
            };
            if tx.send(input).is_err() {
                return;
            }
        }
        // End of input behaves like quit.
        let _ = tx.send(Input::Console(ConsoleCommand::Quit));
    });
}
