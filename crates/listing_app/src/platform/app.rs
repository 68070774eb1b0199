use std::mem;
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::Context;
use listing_core::{update, AppState, CoreSettings, Msg};
use listing_logging::{listing_debug, listing_info, listing_warn, set_dispatch_seq};

use super::config::AppConfig;
use super::console::{self, ConsoleCommand};
use super::effects::EffectRunner;
use super::logging;
use super::page::Page;
use super::render::render;
use super::Input;

pub struct AppOptions {
    pub config: PathBuf,
    pub page: PathBuf,
    pub verbose: bool,
}

pub fn run_app(options: AppOptions) -> anyhow::Result<()> {
    let config = AppConfig::load(&options.config)?;
    logging::initialize(config.log_destination, options.verbose);
    listing_info!("Starting listing_app with config {:?}", options.config);

    let endpoints = config.endpoints()?;
    let page = Page::load(&options.page, &endpoints)
        .with_context(|| format!("loading page {:?}", options.page))?;

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(config.service_settings(), input_tx.clone())
        .context("starting the service engine")?;
    console::spawn_reader(input_tx);

    let mut shell = Shell {
        state: AppState::with_settings(CoreSettings {
            require_keywords: config.require_keywords,
        }),
        runner,
        seq: 0,
    };
    println!("{}", console::USAGE);
    shell.dispatch(Msg::CardsLoaded(page.cards.clone()));

    while let Ok(input) = input_rx.recv() {
        match input {
            Input::Console(ConsoleCommand::Quit) => break,
            Input::Console(ConsoleCommand::Show) => shell.show(),
            Input::Console(ConsoleCommand::Help) => println!("{}", console::USAGE),
            Input::Console(ConsoleCommand::UseHistoryRow(row)) => {
                shell.dispatch(Msg::HistoryRowChosen { row })
            }
            Input::Console(ConsoleCommand::CloseHistory) => shell.dispatch(Msg::HistoryClosed),
            Input::Console(ConsoleCommand::Control {
                card,
                field,
                action,
            }) => {
                let msg = console::locate(&page, &card, field, action)
                    .and_then(|event| console::delegate(&page.tree, event));
                match msg {
                    Some(msg) => shell.dispatch(msg),
                    None => println!("no such card/control: {card}"),
                }
            }
            Input::Invalid(message) => println!("{message}"),
            Input::Core(msg) => shell.dispatch(msg),
        }
    }

    listing_info!("listing_app shutting down");
    Ok(())
}

struct Shell {
    state: AppState,
    runner: EffectRunner,
    seq: u64,
}

impl Shell {
    fn dispatch(&mut self, msg: Msg) {
        self.seq += 1;
        set_dispatch_seq(self.seq);
        listing_debug!("dispatch {:?}", msg);

        let state = mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);

        if !self.state.consume_dirty() {
            return;
        }
        self.show();
        if !self.state.notifications().is_empty() {
            let state = mem::take(&mut self.state);
            let (state, effects) = update(state, Msg::NotificationsShown);
            if !effects.is_empty() {
                listing_warn!("NotificationsShown produced {} effects", effects.len());
            }
            self.state = state;
            self.state.consume_dirty();
        }
    }

    fn show(&self) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        print!("[{stamp}]\n{}", render(&self.state.view()));
    }
}
