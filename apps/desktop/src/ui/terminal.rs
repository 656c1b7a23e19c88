use std::{fmt, io::Write, sync::Arc};

use async_trait::async_trait;
use client_core::{EditDialog, EditField, ListSurface, ListView};
use shared::error::ApiError;
use tokio::{
    io::{AsyncBufRead, Lines},
    sync::Mutex,
};
use tracing::warn;

/// Input shared between the command loop and the edit dialog. Whoever holds
/// the lock owns the next line.
pub type SharedLines<R> = Arc<Mutex<Lines<R>>>;

/// Answer that cancels a prompt.
const CANCEL: &str = ".";

pub struct TerminalSurface<W: Write> {
    out: W,
    error_visible: bool,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            error_visible: false,
        }
    }

    pub fn error_visible(&self) -> bool {
        self.error_visible
    }

    pub fn notice(&mut self, text: &str) {
        self.emit(format_args!("{text}\n"));
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        write_flushed(&mut self.out, args);
    }
}

/// Writes and flushes, logging instead of failing. Returns whether it worked.
fn write_flushed<W: Write>(out: &mut W, args: fmt::Arguments<'_>) -> bool {
    match out.write_fmt(args).and_then(|()| out.flush()) {
        Ok(()) => true,
        Err(err) => {
            warn!("failed to write to terminal: {err}");
            false
        }
    }
}

impl<W: Write> ListSurface for TerminalSurface<W> {
    fn render(&mut self, view: &ListView) {
        match view {
            ListView::Placeholder(text) => self.emit(format_args!("{text}\n")),
            ListView::Rows(rows) => {
                for row in rows {
                    self.emit(format_args!(
                        "[{}] {}\n      {}\n",
                        row.id, row.heading, row.genre
                    ));
                }
            }
        }
    }

    fn show_error(&mut self, error: &ApiError) {
        self.error_visible = true;
        self.emit(format_args!("error: {error}\n"));
    }

    fn hide_error(&mut self) {
        self.error_visible = false;
    }

    fn reset_form(&mut self) {}
}

pub struct LineDialog<R> {
    lines: SharedLines<R>,
    echo: bool,
}

impl<R> LineDialog<R> {
    pub fn new(lines: SharedLines<R>) -> Self {
        Self { lines, echo: true }
    }

    /// Reads answers without printing prompts.
    pub fn quiet(lines: SharedLines<R>) -> Self {
        Self { lines, echo: false }
    }
}

#[async_trait]
impl<R> EditDialog for LineDialog<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn ask(&self, field: EditField, current: &str) -> Option<String> {
        if self.echo {
            write_flushed(
                &mut std::io::stdout().lock(),
                format_args!("{} [{current}] ", field.label()),
            );
        }

        let line = match self.lines.lock().await.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return None,
            Err(err) => {
                warn!("failed to read answer: {err}");
                return None;
            }
        };

        match line.trim() {
            "" => Some(current.to_string()),
            CANCEL => None,
            _ => Some(line),
        }
    }
}

#[cfg(test)]
#[path = "../tests/terminal_tests.rs"]
mod tests;
