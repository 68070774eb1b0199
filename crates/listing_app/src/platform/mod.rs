mod app;
mod config;
mod console;
mod effects;
mod logging;
mod page;
mod render;

use listing_core::Msg;

use console::ConsoleCommand;

pub use app::{run_app, AppOptions};

/// Everything the app loop reacts to, from stdin or from completed calls.
#[derive(Debug)]
pub enum Input {
    Console(ConsoleCommand),
    Invalid(String),
    Core(Msg),
}
