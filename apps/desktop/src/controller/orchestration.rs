//! Routes terminal commands to the movie list controller.

use std::io::Write;

use client_core::{ControllerState, MovieListController};
use tracing::debug;

use crate::{
    controller::events::{UiCommand, HELP},
    ui::TerminalSurface,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub async fn dispatch<W: Write>(
    controller: &mut MovieListController<TerminalSurface<W>>,
    command: UiCommand,
) -> Flow {
    match command {
        UiCommand::List => controller.render_all(),
        UiCommand::Search(term) => controller.filter(&term),
        UiCommand::Add(form) => {
            // Rejections are already shown inline by the controller.
            let _ = controller.add(&form);
        }
        UiCommand::Edit(id) => {
            let outcome = controller.edit(id).await;
            debug!(movie_id = %id, ?outcome, "edit finished");
        }
        UiCommand::Delete(id) => {
            controller.delete(id);
        }
        UiCommand::State => {
            let text = match controller.state() {
                ControllerState::Loading => "loading".to_string(),
                ControllerState::Ready => format!("ready, {} movies", controller.movies().len()),
                ControllerState::Error(message) => format!("error: {message}"),
            };
            controller.surface_mut().notice(&text);
        }
        UiCommand::Help => controller.surface_mut().notice(HELP),
        UiCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

#[cfg(test)]
#[path = "../tests/orchestration_tests.rs"]
mod tests;
