use std::{path::PathBuf, sync::Arc};

mod config;
mod controller;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    resolve_api_base, FileMovieSource, FilePreferenceStore, HttpMovieSource, MovieListController,
    MovieSource,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::Mutex,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::{
    config::{load_settings, Settings},
    controller::{
        events::{parse_command, HELP},
        orchestration::{dispatch, Flow},
    },
    ui::{LineDialog, TerminalSurface},
};

/// Browse and edit a movie list loaded from a JSON document.
#[derive(Parser, Debug)]
#[command(name = "movies")]
struct Args {
    /// Page URL; an `api` query parameter overrides the API base.
    #[arg(long)]
    page_url: Option<String>,
    /// Path of the movie document relative to the API base.
    #[arg(long)]
    data_path: Option<String>,
    /// Read the movie document from a local file instead.
    #[arg(long)]
    data_file: Option<PathBuf>,
    /// Config file (defaults to ./movies.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where the API base preference is stored.
    #[arg(long)]
    preferences: Option<PathBuf>,
}

impl Args {
    fn apply(self, settings: &mut Settings) {
        if let Some(v) = self.page_url {
            settings.page_url = v;
        }
        if let Some(v) = self.data_path {
            settings.data_path = v;
        }
        if let Some(v) = self.data_file {
            settings.data_file = Some(v);
        }
        if let Some(v) = self.preferences {
            settings.preferences_path = Some(v);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    args.apply(&mut settings);

    let page_url = Url::parse(&settings.page_url)
        .with_context(|| format!("invalid page url '{}'", settings.page_url))?;
    let mut preferences = FilePreferenceStore::open(settings.preferences_path());
    let base = resolve_api_base(&page_url, &mut preferences);
    info!(api_base = base.as_str(), source = ?base.source(), "resolved api base");

    let source: Arc<dyn MovieSource> = match &settings.data_file {
        Some(path) => Arc::new(FileMovieSource::new(path)),
        None => Arc::new(
            HttpMovieSource::from_base(&base, &settings.data_path)
                .context("failed to build movie source url")?,
        ),
    };

    let lines = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let dialog = Arc::new(LineDialog::new(Arc::clone(&lines)));
    let mut controller =
        MovieListController::new(source, dialog, TerminalSurface::new(std::io::stdout()));

    if let Err(err) = controller.load().await {
        debug!("continuing without movies: {err}");
    }
    controller.surface_mut().notice("type 'help' for commands");

    loop {
        let next = lines.lock().await.next_line().await;
        let Some(line) = next.context("failed to read stdin")? else {
            break;
        };

        match parse_command(&line) {
            Ok(Some(command)) => {
                if dispatch(&mut controller, command).await == Flow::Quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(err) => controller.surface_mut().notice(&format!("{err}\n{HELP}")),
        }
    }

    Ok(())
}
