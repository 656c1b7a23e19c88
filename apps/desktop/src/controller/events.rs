//! Commands typed at the terminal.

use client_core::MovieForm;
use shared::domain::MovieId;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  list                              show every movie
  search <term>                     filter by title or genre
  add <title> | <genre> | <year>    add a movie (genre may be empty)
  edit <id>                         edit a movie; Enter keeps a value, '.' cancels
  delete <id>                       remove a movie
  state                             show loading state
  help                              show this text
  quit                              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    List,
    Search(String),
    Add(MovieForm),
    Edit(MovieId),
    Delete(MovieId),
    State,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("'{command}' needs a movie id")]
    MissingId { command: &'static str },
    #[error("'{0}' is not a movie id")]
    InvalidId(String),
}

pub fn parse_command(line: &str) -> Result<Option<UiCommand>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => UiCommand::List,
        "search" | "filter" => UiCommand::Search(rest.to_string()),
        "add" => UiCommand::Add(parse_form(rest)),
        "edit" => UiCommand::Edit(parse_id("edit", rest)?),
        "delete" | "rm" => UiCommand::Delete(parse_id("delete", rest)?),
        "state" => UiCommand::State,
        "help" | "?" => UiCommand::Help,
        "quit" | "exit" | "q" => UiCommand::Quit,
        _ => return Err(CommandError::Unknown(verb.to_string())),
    };
    Ok(Some(command))
}

/// `title | genre | year`; missing fields are left empty for validation to
/// reject.
fn parse_form(rest: &str) -> MovieForm {
    let mut fields = rest.splitn(3, '|').map(str::to_string);
    MovieForm {
        title: fields.next().unwrap_or_default(),
        genre: fields.next().unwrap_or_default(),
        year: fields.next().unwrap_or_default(),
    }
}

fn parse_id(command: &'static str, rest: &str) -> Result<MovieId, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingId { command });
    }
    rest.parse()
        .map(MovieId)
        .map_err(|_| CommandError::InvalidId(rest.to_string()))
}
